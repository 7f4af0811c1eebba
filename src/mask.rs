use crate::error::DecodeError;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use flate2::read::ZlibDecoder;
use std::io::Read;

/// Label maps are always produced at this resolution, independent of the frame size
pub const MASK_WIDTH: u32 = 320;
pub const MASK_HEIGHT: u32 = 320;
pub const MASK_LEN: usize = (MASK_WIDTH * MASK_HEIGHT) as usize;

/// Decode a base64, zlib-compressed label map into one palette index per pixel
///
/// The result is row-major and exactly `MASK_WIDTH * MASK_HEIGHT` bytes long.
pub fn decode(compressed_base64: &str) -> Result<Vec<u8>, DecodeError> {
    let _span = tracing::debug_span!("mask_decode").entered();

    let cleaned: String = compressed_base64
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let compressed = BASE64_STANDARD.decode(cleaned.as_bytes())?;

    // Read one byte past the expected size so oversized masks are caught
    // without inflating an arbitrarily large stream.
    let mut mask = Vec::with_capacity(MASK_LEN);
    ZlibDecoder::new(compressed.as_slice())
        .take(MASK_LEN as u64 + 1)
        .read_to_end(&mut mask)?;

    if mask.len() != MASK_LEN {
        return Err(DecodeError::SizeMismatch {
            expected: MASK_LEN,
            actual: mask.len(),
        });
    }

    tracing::trace!("decoded {} byte mask", mask.len());
    Ok(mask)
}
