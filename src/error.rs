use thiserror::Error;

/// Failure to turn a transported payload (mask blob or frame image) into pixels
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("failed to inflate mask: {0}")]
    Inflate(#[from] std::io::Error),

    #[error("mask has {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("malformed data URI: {0}")]
    DataUri(String),

    #[error("failed to decode frame image: {0}")]
    Image(#[from] image::ImageError),
}

impl DecodeError {
    /// Coarse grouping used to report each kind of failure only once
    pub fn kind(&self) -> FailureKind {
        match self {
            DecodeError::Base64(_) | DecodeError::Inflate(_) | DecodeError::SizeMismatch { .. } => {
                FailureKind::Mask
            }
            DecodeError::DataUri(_) | DecodeError::Image(_) => FailureKind::Image,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("detections payload has the wrong shape: {0}")]
    Payload(#[from] serde_json::Error),
}

impl RenderError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RenderError::Decode(err) => err.kind(),
            RenderError::Payload(_) => FailureKind::Payload,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("threshold {0:?} is not a number")]
    NotANumber(String),

    #[error("threshold {0} is outside [0, 1]")]
    OutOfRange(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Image,
    Mask,
    Payload,
}
