use super::RenderOptions;
use crate::error::DecodeError;
use crate::frame::Segments;
use crate::mask::{self, MASK_HEIGHT, MASK_WIDTH};
use crate::surface::Surface;
use image::RgbaImage;

/// Colour per label index; index 0 is background and never painted
pub const PALETTE: [[u8; 3]; 21] = [
    [0, 0, 0],
    [128, 0, 0],
    [0, 128, 0],
    [128, 128, 0],
    [0, 0, 128],
    [128, 0, 128],
    [0, 128, 128],
    [128, 128, 128],
    [64, 0, 0],
    [192, 0, 0],
    [64, 128, 0],
    [192, 128, 0],
    [64, 0, 128],
    [192, 0, 128],
    [64, 128, 128],
    [192, 128, 128],
    [0, 64, 0],
    [128, 64, 0],
    [0, 192, 0],
    [128, 192, 0],
    [0, 64, 128],
];

/// Opacity of the label colours over the frame, out of 255
pub const OVERLAY_ALPHA: u8 = 150;

/// Tint every labelled pixel with its palette colour
///
/// The mask is sampled nearest-neighbour from its fixed 320x320 grid onto the
/// `width x height` draw area, then blended over the current surface content in
/// one pass over the pixel buffer. If the mask cannot be decoded nothing beyond
/// the source image is painted.
pub fn render<S: Surface + ?Sized>(
    surface: &mut S,
    source: &RgbaImage,
    width: u32,
    height: u32,
    segments: &Segments,
    options: &RenderOptions<'_>,
) -> Result<(), DecodeError> {
    if options.input_image {
        surface.draw_image(source, width, height);
    }

    let labels = mask::decode(&segments.mask)?;

    let _span = tracing::debug_span!("segment_blend").entered();

    let pixels = surface.pixels_mut();
    let width = width.min(pixels.width());
    let height = height.min(pixels.height());
    let alpha = f32::from(OVERLAY_ALPHA) / 255.0;

    for y in 0..height {
        let row = (y * MASK_HEIGHT / height) * MASK_WIDTH;
        for x in 0..width {
            let index = labels[(row + x * MASK_WIDTH / width) as usize] as usize;
            if index == 0 {
                continue;
            }
            // Indices past the palette carry no colour
            let Some(color) = PALETTE.get(index) else {
                continue;
            };

            let pixel = pixels.get_pixel_mut(x, y);
            for (dst, &src) in pixel.0.iter_mut().zip(color) {
                *dst = blend(*dst, src, alpha);
            }
        }
    }

    Ok(())
}

fn blend(dst: u8, src: u8, alpha: f32) -> u8 {
    (f32::from(dst) * (1.0 - alpha) + f32::from(src) * alpha)
        .round()
        .clamp(0.0, 255.0) as u8
}
