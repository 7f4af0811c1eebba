use crate::frame::{Frame, FrameSource};
use anyhow::{anyhow, Context, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Frames handed from a reader thread to the pump through a single slot
///
/// At most one frame waits for the pump. With a pacing period, frames that
/// arrive while the slot is occupied are dropped rather than queued; without
/// one, the reader waits for the slot so every frame is delivered.
pub struct FrameFeed {
    receiver: Receiver<Frame>,
    dropped: Arc<AtomicU64>,
    handle: JoinHandle<Result<()>>,
}

impl FrameFeed {
    /// Block until the next frame; `None` once the reader has finished
    pub fn recv(&self) -> Option<Frame> {
        self.receiver.recv().ok()
    }

    /// Disconnect from the reader and wait for it to exit
    pub fn finish(self) -> Result<u64> {
        let FrameFeed {
            receiver,
            dropped,
            handle,
        } = self;
        drop(receiver);

        handle
            .join()
            .map_err(|_| anyhow!("Frame reader thread panicked"))??;
        Ok(dropped.load(Ordering::Relaxed))
    }
}

/// Start reading `source` on its own thread
///
/// `pacing` is the minimum interval between frames, as when replaying a
/// recording at its original rate.
pub fn spawn_reader<F>(source: F, pacing: Option<Duration>) -> Result<FrameFeed>
where
    F: FrameSource + Send + 'static,
{
    let (sender, receiver) = mpsc::sync_channel(1);
    let dropped = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&dropped);

    let handle = thread::Builder::new()
        .name("frame-reader".to_string())
        .spawn(move || read_frames(source, sender, pacing, &counter))
        .context("Failed to spawn frame reader")?;

    Ok(FrameFeed {
        receiver,
        dropped,
        handle,
    })
}

fn read_frames<F: FrameSource>(
    mut source: F,
    sender: SyncSender<Frame>,
    pacing: Option<Duration>,
    dropped: &AtomicU64,
) -> Result<()> {
    loop {
        let started = Instant::now();
        let Some(frame) = source.next_frame()? else {
            tracing::info!("Frame stream ended");
            return Ok(());
        };

        let Some(period) = pacing else {
            if sender.send(frame).is_err() {
                tracing::debug!("Pump disconnected, stopping reader");
                return Ok(());
            }
            continue;
        };

        match sender.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Pump busy, dropping frame");
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::debug!("Pump disconnected, stopping reader");
                return Ok(());
            }
        }

        let elapsed = started.elapsed();
        if elapsed < period {
            thread::sleep(period - elapsed);
        }
    }
}
