//! Task-specific shapes of a frame's `detections` field.
//!
//! Every field defaults when missing so that a short or partial payload renders
//! whatever it does carry instead of failing the frame.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Detections payload, tagged by the task that produced it
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Classifications(Classifications),
    Detections(Detections),
    Segments(Segments),
    Poses(Poses),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Classifications {
    pub confidence: Vec<f64>,
    pub class_id: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Detections {
    /// `[x1, y1, x2, y2]` per box, normalized
    pub bbox: Vec<Vec<f64>>,
    pub confidence: Vec<f64>,
    pub class_id: Vec<i64>,
    pub tracker_id: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Segments {
    pub n_segments: usize,
    #[serde(alias = "indeces")]
    pub indices: Vec<i64>,
    /// Base64 of the zlib-compressed 320x320 label map
    pub mask: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Poses {
    pub n_detections: usize,
    pub scores: Vec<f64>,
    /// 17 `(y, x)` pairs per pose, normalized
    pub keypoints: Vec<Vec<f64>>,
    /// 17 scores per pose
    pub keypoint_scores: Vec<Vec<f64>>,
}

impl Detections {
    /// Number of boxes every parallel sequence can account for
    pub fn len(&self) -> usize {
        self.bbox.len().min(self.confidence.len()).min(self.class_id.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Classifications {
    pub fn len(&self) -> usize {
        self.confidence.len().min(self.class_id.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Poses {
    /// Declared pose count, limited to what the parallel sequences hold
    pub fn len(&self) -> usize {
        self.n_detections
            .min(self.scores.len())
            .min(self.keypoints.len())
            .min(self.keypoint_scores.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Deserialize one task shape, treating an absent payload as an empty one
pub(crate) fn from_value<T>(value: &Value) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    if value.is_null() {
        return Ok(T::default());
    }
    T::deserialize(value)
}
