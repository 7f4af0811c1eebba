mod classification;
mod detection;
mod pose;
mod segmentation;

pub use classification::TOP_PREDICTIONS;
pub use detection::{label_color, DEFAULT_THRESHOLD};
pub use pose::{KEYPOINT_COUNT, SKELETON};
pub use segmentation::{OVERLAY_ALPHA, PALETTE};

use crate::error::RenderError;
use crate::frame::payload::{self, Payload};
use crate::surface::Surface;
use image::RgbaImage;
use serde_json::Value;
use std::fmt;

/// The overlay drawn for a post-processor's output
///
/// Selection is by exact, case-sensitive post-processor identifier. Anything
/// not listed has no renderer and frames are shown without an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Renderer {
    Classification,
    Detection,
    Segmentation,
    Pose,
}

/// Per-invocation knobs shared by all renderers
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    /// Paint the source image before the overlay
    pub input_image: bool,

    /// Class names indexed by class id
    pub labels: Option<&'a [String]>,

    /// Minimum confidence; only read by the detection renderer
    pub threshold: Option<f64>,
}

impl Default for RenderOptions<'_> {
    fn default() -> Self {
        Self {
            input_image: true,
            labels: None,
            threshold: None,
        }
    }
}

impl Renderer {
    pub fn select(post_processor: &str) -> Option<Self> {
        match post_processor {
            "pp_cls" | "pp_cls_softmax" => Some(Renderer::Classification),
            "pp_od_bscn" | "pp_od_bcsn" | "pp_od_efficientdet_lite0" => Some(Renderer::Detection),
            "pp_segment" => Some(Renderer::Segmentation),
            "pp_posenet" => Some(Renderer::Pose),
            _ => None,
        }
    }

    /// Interpret a frame's raw `detections` in this renderer's task shape
    pub fn parse(self, detections: &Value) -> Result<Payload, serde_json::Error> {
        Ok(match self {
            Renderer::Classification => Payload::Classifications(payload::from_value(detections)?),
            Renderer::Detection => Payload::Detections(payload::from_value(detections)?),
            Renderer::Segmentation => Payload::Segments(payload::from_value(detections)?),
            Renderer::Pose => Payload::Poses(payload::from_value(detections)?),
        })
    }

    /// Paint one frame: the source image (if requested) and this task's overlay
    pub fn render<S: Surface + ?Sized>(
        self,
        surface: &mut S,
        source: &RgbaImage,
        width: u32,
        height: u32,
        detections: &Value,
        options: &RenderOptions<'_>,
    ) -> Result<(), RenderError> {
        let _span = tracing::debug_span!("render", renderer = %self).entered();

        match self.parse(detections)? {
            Payload::Classifications(classifications) => {
                classification::render(surface, source, width, height, &classifications, options)
            }
            Payload::Detections(detections) => {
                detection::render(surface, source, width, height, &detections, options)
            }
            Payload::Segments(segments) => {
                segmentation::render(surface, source, width, height, &segments, options)?
            }
            Payload::Poses(poses) => pose::render(surface, source, width, height, &poses, options),
        }
        Ok(())
    }
}

impl fmt::Display for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Renderer::Classification => "classification",
            Renderer::Detection => "detection",
            Renderer::Segmentation => "segmentation",
            Renderer::Pose => "pose",
        };
        f.write_str(name)
    }
}

/// Class name for `class_id`, or the id itself when there is no usable label
pub(crate) fn label_text(labels: Option<&[String]>, class_id: i64) -> String {
    labels
        .filter(|labels| !labels.is_empty())
        .and_then(|labels| usize::try_from(class_id).ok().and_then(|i| labels.get(i)))
        .cloned()
        .unwrap_or_else(|| class_id.to_string())
}

/// Round to the nearest pixel, halves rounding up
pub(crate) fn round_px(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Hold a pixel coordinate to a band one `extent` either side of the surface
///
/// Payload coordinates are only nominally normalized; anything further out
/// would not be visible and could overflow the integer drawing maths.
pub(crate) fn clamp_to_band(px: f64, extent: u32) -> f64 {
    let extent = f64::from(extent);
    px.clamp(-extent, 2.0 * extent)
}

/// Scale a normalized, finite coordinate onto an axis of `extent` pixels
pub(crate) fn to_px(value: f64, extent: u32) -> i32 {
    round_px(clamp_to_band(value * f64::from(extent), extent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_by_post_processor() {
        assert_eq!(Renderer::select("pp_cls"), Some(Renderer::Classification));
        assert_eq!(Renderer::select("pp_cls_softmax"), Some(Renderer::Classification));
        assert_eq!(Renderer::select("pp_od_bscn"), Some(Renderer::Detection));
        assert_eq!(Renderer::select("pp_od_bcsn"), Some(Renderer::Detection));
        assert_eq!(Renderer::select("pp_od_efficientdet_lite0"), Some(Renderer::Detection));
        assert_eq!(Renderer::select("pp_segment"), Some(Renderer::Segmentation));
        assert_eq!(Renderer::select("pp_posenet"), Some(Renderer::Pose));
    }

    #[test]
    fn unknown_or_miscased_ids_have_no_renderer() {
        assert_eq!(Renderer::select("pp_unknown"), None);
        assert_eq!(Renderer::select("PP_CLS"), None);
        assert_eq!(Renderer::select(""), None);
    }

    #[test]
    fn labels_fall_back_to_ids() {
        let labels = vec!["cat".to_string(), "dog".to_string()];
        assert_eq!(label_text(Some(labels.as_slice()), 1), "dog");
        assert_eq!(label_text(Some(labels.as_slice()), 7), "7");
        assert_eq!(label_text(Some(labels.as_slice()), -1), "-1");
        assert_eq!(label_text(Some(&[][..]), 0), "0");
        assert_eq!(label_text(None, 3), "3");
    }

    #[test]
    fn rounds_halves_up() {
        assert_eq!(round_px(2.5), 3);
        assert_eq!(round_px(2.49), 2);
        assert_eq!(round_px(-0.5), 0);
    }

    #[test]
    fn far_coordinates_stay_near_the_surface() {
        assert_eq!(to_px(0.5, 200), 100);
        assert_eq!(to_px(-1e10, 200), -200);
        assert_eq!(to_px(1e300, 200), 400);
        assert_eq!(to_px(f64::INFINITY, 200), 400);
        assert_eq!(clamp_to_band(-3.0, 0), 0.0);
    }

    #[test]
    fn payload_with_wrong_shape_is_an_error() {
        let err = Renderer::Detection
            .parse(&serde_json::json!({ "confidence": "high" }))
            .unwrap_err();
        assert!(err.is_data());
    }
}
