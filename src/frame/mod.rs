mod data_uri;
mod json_lines;
pub mod payload;

pub use data_uri::decode_data_uri;
pub use json_lines::JsonLinesSource;
pub use payload::{Classifications, Detections, Payload, Poses, Segments};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One streamed unit from the device: an encoded still plus the inference
/// results computed for it
///
/// `detections` stays untyped until a renderer is selected, because its shape
/// depends on the active post-processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// Data URI (or bare base64) of the encoded image
    pub image: String,

    #[serde(default)]
    pub detections: serde_json::Value,

    /// Native size of the source image in pixels
    pub width: u32,
    pub height: u32,
}

/// Trait for frame event sources
pub trait FrameSource {
    /// Wait for the next frame event; `None` once the stream has ended
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}
