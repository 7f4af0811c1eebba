use crate::error::FailureKind;
use crate::frame::{decode_data_uri, Frame};
use crate::layout::{draw_size_for, Viewport};
use crate::network::NetworkSelection;
use crate::notify::Notifier;
use crate::render::{RenderOptions, Renderer};
use crate::settings::Threshold;
use crate::surface::Surface;
use image::RgbaImage;
use std::collections::HashSet;
use std::fmt::Display;
use std::rc::Rc;
use std::time::{Duration, Instant};

const FPS_SAMPLE_PERIOD: Duration = Duration::from_secs(1);

/// Frames-per-second over wall-clock sample windows of at least one second
#[derive(Debug)]
pub struct FpsCounter {
    frames: u32,
    last_sample: Instant,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            last_sample: now,
        }
    }

    /// Count one frame; returns a new rate once a sample window has elapsed
    pub fn tick(&mut self, now: Instant) -> Option<u32> {
        self.frames += 1;

        let elapsed = now.saturating_duration_since(self.last_sample);
        if elapsed < FPS_SAMPLE_PERIOD {
            return None;
        }

        let fps = (f64::from(self.frames) / elapsed.as_secs_f64()).round() as u32;
        self.frames = 0;
        self.last_sample = now;
        Some(fps)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Idle,
    Streaming,
}

/// What became of one delivered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Delivered while idle; not processed at all
    Ignored,
    /// Source image and overlay painted
    Painted,
    /// No renderer for the active post-processor; surface untouched
    NoRenderer,
    /// The frame reported no pixels to draw
    NoDrawArea,
    /// Overlay (and possibly the image) skipped after a failure
    Skipped(FailureKind),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    pub received: u64,
    pub painted: u64,
    pub skipped: u64,
}

/// Turns each delivered frame into one paint of the surface plus FPS bookkeeping
pub struct FramePump<S> {
    surface: S,
    viewport: Rc<dyn Viewport>,
    notifier: Box<dyn Notifier>,
    threshold: Threshold,

    renderer: Option<Renderer>,
    labels: Option<Vec<String>>,
    input_image: bool,

    state: PumpState,
    fps_counter: Option<FpsCounter>,
    fps: u32,
    reported: HashSet<FailureKind>,
    stats: PumpStats,
}

impl<S: Surface> FramePump<S> {
    pub fn new(
        surface: S,
        viewport: Rc<dyn Viewport>,
        notifier: Box<dyn Notifier>,
        threshold: Threshold,
    ) -> Self {
        Self {
            surface,
            viewport,
            notifier,
            threshold,
            renderer: None,
            labels: None,
            input_image: true,
            state: PumpState::Idle,
            fps_counter: None,
            fps: 0,
            reported: HashSet::new(),
            stats: PumpStats::default(),
        }
    }

    /// Pick the renderer and label table for a newly selected network
    pub fn select_network(&mut self, selection: &NetworkSelection) {
        self.set_renderer(selection.renderer());
        self.labels = selection.labels.clone();
    }

    pub fn set_renderer(&mut self, renderer: Option<Renderer>) {
        match renderer {
            Some(renderer) => tracing::info!("Using {} overlay", renderer),
            None => tracing::info!("No overlay for the selected network"),
        }
        self.renderer = renderer;
        self.reported.clear();
    }

    /// Whether to paint each frame's image under the overlay
    pub fn set_input_image(&mut self, input_image: bool) {
        self.input_image = input_image;
    }

    pub fn renderer(&self) -> Option<Renderer> {
        self.renderer
    }

    pub fn threshold(&self) -> &Threshold {
        &self.threshold
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    /// Most recently published frame rate
    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn stats(&self) -> PumpStats {
        self.stats
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub fn start_at(&mut self, now: Instant) {
        if self.state == PumpState::Streaming {
            return;
        }
        tracing::info!("Frame pump streaming");
        self.state = PumpState::Streaming;
        self.fps_counter = Some(FpsCounter::new(now));
        self.reported.clear();
    }

    /// Stop processing frames; anything delivered afterwards is ignored
    pub fn stop(&mut self) {
        if self.state == PumpState::Idle {
            return;
        }
        tracing::info!("Frame pump idle");
        self.state = PumpState::Idle;
        self.fps_counter = None;
    }

    pub fn on_frame(&mut self, frame: &Frame) -> FrameOutcome {
        self.on_frame_at(frame, Instant::now())
    }

    pub fn on_frame_at(&mut self, frame: &Frame, now: Instant) -> FrameOutcome {
        if self.state == PumpState::Idle {
            return FrameOutcome::Ignored;
        }
        self.stats.received += 1;

        let outcome = self.paint(frame);
        match outcome {
            FrameOutcome::Painted => self.stats.painted += 1,
            FrameOutcome::Skipped(_) => self.stats.skipped += 1,
            _ => {}
        }

        if let Some(fps) = self.fps_counter.as_mut().and_then(|counter| counter.tick(now)) {
            self.fps = fps;
            tracing::info!("FPS: {}", fps);
        }

        outcome
    }

    fn paint(&mut self, frame: &Frame) -> FrameOutcome {
        // Viewport and fullscreen state may change between any two frames
        let size = draw_size_for(self.viewport.as_ref(), frame.width, frame.height);

        let Some(renderer) = self.renderer else {
            return FrameOutcome::NoRenderer;
        };
        if size.is_empty() {
            tracing::debug!("Frame reports {}x{}, nothing to draw", frame.width, frame.height);
            return FrameOutcome::NoDrawArea;
        }

        let source = if self.input_image {
            match decode_data_uri(&frame.image) {
                Ok(image) => image,
                Err(err) => {
                    let kind = err.kind();
                    self.report(kind, &err);
                    return FrameOutcome::Skipped(kind);
                }
            }
        } else {
            RgbaImage::new(0, 0)
        };

        let options = RenderOptions {
            input_image: self.input_image,
            labels: self.labels.as_deref(),
            threshold: (renderer == Renderer::Detection).then(|| self.threshold.get()),
        };

        self.surface.resize(size.width, size.height);
        let result = renderer.render(
            &mut self.surface,
            &source,
            size.width,
            size.height,
            &frame.detections,
            &options,
        );

        match result {
            Ok(()) => FrameOutcome::Painted,
            Err(err) => {
                let kind = err.kind();
                self.report(kind, &err);
                FrameOutcome::Skipped(kind)
            }
        }
    }

    /// Surface a failure once per kind; repeats only reach the debug log
    fn report(&mut self, kind: FailureKind, err: &dyn Display) {
        if self.reported.insert(kind) {
            tracing::warn!("Skipping overlay: {}", err);
            self.notifier.error(&format!("Failed to render frame: {err}"));
        } else {
            tracing::debug!("Skipping overlay: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(start: Instant, millis: u64) -> Instant {
        start + Duration::from_millis(millis)
    }

    #[test]
    fn fps_waits_for_a_full_second() {
        let start = Instant::now();
        let mut counter = FpsCounter::new(start);
        for i in 1..30 {
            assert_eq!(counter.tick(at(start, i * 30)), None);
        }
        assert_eq!(counter.tick(at(start, 1000)), Some(30));
    }

    #[test]
    fn fps_divides_by_actual_elapsed_time() {
        let start = Instant::now();
        let mut counter = FpsCounter::new(start);
        for i in 1..15 {
            counter.tick(at(start, i * 100));
        }
        // 15 frames over 1.5 s
        assert_eq!(counter.tick(at(start, 1500)), Some(10));
    }

    #[test]
    fn fps_resets_after_each_sample() {
        let start = Instant::now();
        let mut counter = FpsCounter::new(start);
        assert_eq!(counter.tick(at(start, 1000)), Some(1));
        assert_eq!(counter.tick(at(start, 1500)), None);
        assert_eq!(counter.tick(at(start, 2000)), Some(2));
    }
}
