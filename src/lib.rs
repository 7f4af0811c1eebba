//! Live overlay of on-device inference results on a streamed camera feed.
//!
//! Frames arrive with an encoded image and the detections a post-processor
//! produced for it. The [`pump::FramePump`] sizes each frame for the display,
//! paints it with the [`render::Renderer`] matching the selected network and
//! keeps a running frame rate.

pub mod error;
pub mod frame;
pub mod layout;
pub mod mask;
pub mod network;
pub mod notify;
pub mod output;
pub mod pump;
pub mod render;
pub mod settings;
pub mod surface;
pub mod transport;

pub use error::{DecodeError, FailureKind, RenderError, SettingsError};
pub use frame::{Frame, FrameSource};
pub use layout::{compute_draw_size, DrawSize, Viewport, ViewportState};
pub use pump::{FrameOutcome, FramePump, PumpState};
pub use render::{RenderOptions, Renderer};
pub use settings::Threshold;
pub use surface::{RasterSurface, Surface};
