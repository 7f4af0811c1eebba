mod font;
mod raster;
mod recording;

pub use font::{FONT_SIZE, GLYPH_ADVANCE};
pub use raster::RasterSurface;
pub use recording::{DrawCommand, RecordingSurface};

use image::{Rgba, RgbaImage};

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Trait for 2D drawing targets the renderers paint onto
///
/// Mirrors the small subset of a canvas context the overlays need. Coordinates
/// are in surface pixels with the origin at the top-left corner; text is
/// positioned by its top edge.
pub trait Surface {
    /// Current size as (width, height)
    fn dimensions(&self) -> (u32, u32);

    /// Change the surface size; content is cleared only if the size changes
    fn resize(&mut self, width: u32, height: u32);

    /// Draw `image` scaled to exactly `width x height` at the origin
    fn draw_image(&mut self, image: &RgbaImage, width: u32, height: u32);

    fn stroke_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba<u8>, line_width: u32);

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba<u8>);

    fn fill_text(&mut self, text: &str, x: i32, y: i32, color: Rgba<u8>);

    /// Advance width of `text` in pixels
    fn measure_text(&self, text: &str) -> u32;

    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba<u8>);

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba<u8>, line_width: u32);

    /// Backing pixel buffer for batch read-modify-write passes
    fn pixels_mut(&mut self) -> &mut RgbaImage;

    fn pixels(&self) -> &RgbaImage;
}
