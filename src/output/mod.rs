mod loopback;

pub use loopback::LoopbackOutput;

use anyhow::Result;
use image::RgbaImage;

/// Trait for destinations of painted frames
pub trait OutputSink {
    /// Present one painted surface
    fn write_frame(&mut self, frame: &RgbaImage) -> Result<()>;
}
