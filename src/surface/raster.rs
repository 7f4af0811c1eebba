use super::{font, Surface};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut,
};
use imageproc::rect::Rect;

/// In-memory RGBA canvas
pub struct RasterSurface {
    buffer: RgbaImage,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: RgbaImage::new(width, height),
        }
    }

    pub fn into_image(self) -> RgbaImage {
        self.buffer
    }
}

impl Surface for RasterSurface {
    fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.buffer.dimensions() != (width, height) {
            tracing::debug!("Resizing surface to {}x{}", width, height);
            self.buffer = RgbaImage::new(width, height);
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if image.dimensions() == (width, height) {
            imageops::overlay(&mut self.buffer, image, 0, 0);
        } else {
            let scaled = imageops::resize(image, width, height, FilterType::Triangle);
            imageops::overlay(&mut self.buffer, &scaled, 0, 0);
        }
    }

    fn stroke_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba<u8>, line_width: u32) {
        // Normalize so the rectangle always grows right and down
        let (x, width) = if width < 0 { (x + width, -width) } else { (x, width) };
        let (y, height) = if height < 0 { (y + height, -height) } else { (y, height) };

        // The stroke is centred on the path, so a 2px line covers one pixel
        // on each side of it.
        let half = line_width as i32 / 2;
        for t in 0..line_width as i32 {
            let inset = t - half;
            let w = width - 2 * inset;
            let h = height - 2 * inset;
            if w <= 0 || h <= 0 {
                continue;
            }
            let rect = Rect::at(x + inset, y + inset).of_size(w as u32, h as u32);
            draw_hollow_rect_mut(&mut self.buffer, rect, color);
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba<u8>) {
        if width == 0 || height == 0 {
            return;
        }
        draw_filled_rect_mut(&mut self.buffer, Rect::at(x, y).of_size(width, height), color);
    }

    fn fill_text(&mut self, text: &str, x: i32, y: i32, color: Rgba<u8>) {
        font::draw_text(&mut self.buffer, text, x, y, color);
    }

    fn measure_text(&self, text: &str) -> u32 {
        font::text_width(text)
    }

    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba<u8>) {
        let center = (center.0.round() as i32, center.1.round() as i32);
        draw_filled_circle_mut(&mut self.buffer, center, radius.round() as i32, color);
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba<u8>, line_width: u32) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let length = (dx * dx + dy * dy).sqrt();
        if length == 0.0 || line_width <= 1 {
            draw_line_segment_mut(&mut self.buffer, from, to, color);
            return;
        }

        // Offset parallel segments along the unit normal to build up width
        let (nx, ny) = (-dy / length, dx / length);
        let center = (line_width - 1) as f32 / 2.0;
        for t in 0..line_width {
            let offset = t as f32 - center;
            let shift = (nx * offset, ny * offset);
            draw_line_segment_mut(
                &mut self.buffer,
                (from.0 + shift.0, from.1 + shift.1),
                (to.0 + shift.0, to.1 + shift.1),
                color,
            );
        }
    }

    fn pixels_mut(&mut self) -> &mut RgbaImage {
        &mut self.buffer
    }

    fn pixels(&self) -> &RgbaImage {
        &self.buffer
    }
}
