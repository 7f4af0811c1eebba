use crate::error::DecodeError;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use image::RgbaImage;

/// Decode a frame's `image` field into RGBA pixels
///
/// Accepts `data:image/<fmt>;base64,<payload>` URIs as sent by the device, or
/// the bare base64 payload.
pub fn decode_data_uri(uri: &str) -> Result<RgbaImage, DecodeError> {
    let _span = tracing::debug_span!("decode_image").entered();

    let payload = match uri.strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest
                .split_once(',')
                .ok_or_else(|| DecodeError::DataUri("missing ',' separator".to_string()))?;
            if !meta.ends_with(";base64") {
                return Err(DecodeError::DataUri(format!(
                    "unsupported encoding {meta:?}"
                )));
            }
            data
        }
        None => uri,
    };

    let bytes = BASE64_STANDARD
        .decode(payload.trim())
        .map_err(|err| DecodeError::DataUri(format!("invalid base64 payload: {err}")))?;
    let decoded = image::load_from_memory(&bytes)?;
    Ok(decoded.into_rgba8())
}
