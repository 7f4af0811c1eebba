use anyhow::{bail, Context, Result};
use clap::Parser;
use overlay_fx::frame::JsonLinesSource;
use overlay_fx::network::{read_labels, NetworkSelection};
use overlay_fx::notify::LogNotifier;
use overlay_fx::output::{LoopbackOutput, OutputSink};
use overlay_fx::surface::Surface;
use overlay_fx::transport::{self, FrameFeed};
use overlay_fx::{FrameOutcome, FramePump, RasterSurface, Threshold, ViewportState};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Recorded frame events, one JSON object per line ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    frames: String,

    /// Selected network description (JSON with model_post_processor, labels)
    #[arg(short, long, conflicts_with = "post_processor")]
    network: Option<PathBuf>,

    /// Post-processor identifier, when no network file is given
    #[arg(long)]
    post_processor: Option<String>,

    /// Class names, one per line; used with --post-processor
    #[arg(long, requires = "post_processor")]
    labels: Option<PathBuf>,

    /// Initial detection confidence threshold
    #[arg(long, default_value_t = overlay_fx::settings::INITIAL_THRESHOLD)]
    threshold: f64,

    /// Lay frames out for the full viewport instead of their own size
    #[arg(long)]
    fullscreen: bool,

    /// Viewport width used in fullscreen layout
    #[arg(long, default_value_t = 1920)]
    viewport_width: u32,

    /// Viewport height used in fullscreen layout
    #[arg(long, default_value_t = 1080)]
    viewport_height: u32,

    /// Paint only the overlay, leaving previous surface content in place
    #[arg(long)]
    no_input_image: bool,

    /// Write painted frames to a v4l2loopback device
    #[arg(long)]
    output_device: Option<String>,

    /// Output device width
    #[arg(long, default_value_t = 1280)]
    output_width: u32,

    /// Output device height
    #[arg(long, default_value_t = 720)]
    output_height: u32,

    /// Replay rate in frames per second; 0 delivers every frame as fast as possible
    #[arg(long, default_value_t = 0)]
    fps: u32,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("overlay-fx starting");

    let selection = match (&args.network, &args.post_processor) {
        (Some(path), _) => NetworkSelection::load(path).context("Failed to load selected network")?,
        (None, Some(post_processor)) => {
            let mut selection = NetworkSelection::new(post_processor.clone());
            if let Some(path) = &args.labels {
                selection.labels = Some(read_labels(path)?);
            }
            selection
        }
        (None, None) => bail!("Either --network or --post-processor is required"),
    };

    let mut output: Option<Box<dyn OutputSink>> = match &args.output_device {
        Some(device) => Some(Box::new(
            LoopbackOutput::open(device, args.output_width, args.output_height)
                .context("Failed to initialize v4l2loopback output")?,
        )),
        None => {
            tracing::info!("No output device configured, frames are painted but not presented");
            None
        }
    };

    let viewport = Rc::new(ViewportState::new(args.viewport_width, args.viewport_height));
    viewport.set_fullscreen(args.fullscreen);

    let threshold = Threshold::new(args.threshold);
    let mut pump = FramePump::new(
        RasterSurface::new(640, 640),
        viewport,
        Box::new(LogNotifier),
        threshold,
    );
    pump.select_network(&selection);
    pump.set_input_image(!args.no_input_image);

    let pacing = (args.fps > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(args.fps)));
    let feed = if args.frames == "-" {
        transport::spawn_reader(JsonLinesSource::stdin(), pacing)?
    } else {
        transport::spawn_reader(JsonLinesSource::open(&args.frames)?, pacing)?
    };

    run_pipeline(&feed, &mut pump, &mut output)?;

    pump.stop();
    let dropped = feed.finish()?;
    let stats = pump.stats();
    tracing::info!(
        "Done: {} frames received, {} painted, {} skipped, {} dropped while busy",
        stats.received,
        stats.painted,
        stats.skipped,
        dropped
    );

    Ok(())
}

fn run_pipeline<S: Surface>(
    feed: &FrameFeed,
    pump: &mut FramePump<S>,
    output: &mut Option<Box<dyn OutputSink>>,
) -> Result<()> {
    pump.start();
    tracing::info!("Starting frame pump");

    while let Some(frame) = feed.recv() {
        let outcome = pump.on_frame(&frame);
        tracing::trace!("Frame {}x{}: {:?}", frame.width, frame.height, outcome);

        if matches!(outcome, FrameOutcome::Ignored | FrameOutcome::NoDrawArea) {
            continue;
        }
        if let Some(output) = output.as_mut() {
            output
                .write_frame(pump.surface().pixels())
                .context("Failed to write frame")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presents_only_on_a_loopback_device() {
        let args = Args::try_parse_from([
            "overlay-fx",
            "--post-processor",
            "pp_od_bscn",
            "--output-device",
            "/dev/video10",
        ])
        .unwrap();
        assert_eq!(args.output_device.as_deref(), Some("/dev/video10"));

        let persisted =
            Args::try_parse_from(["overlay-fx", "--post-processor", "pp_cls", "--output-dir", "frames"]);
        assert!(persisted.is_err());
    }

    #[test]
    fn threshold_defaults_to_live_control_value() {
        let args = Args::try_parse_from(["overlay-fx", "--post-processor", "pp_cls"]).unwrap();
        assert_eq!(args.threshold, overlay_fx::settings::INITIAL_THRESHOLD);
    }
}
