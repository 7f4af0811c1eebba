use super::{RasterSurface, Surface};
use image::{Rgba, RgbaImage};

/// One call made against a [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Image { width: u32, height: u32 },
    StrokeRect { x: i32, y: i32, width: i32, height: i32, color: Rgba<u8>, line_width: u32 },
    FillRect { x: i32, y: i32, width: u32, height: u32, color: Rgba<u8> },
    Text { text: String, x: i32, y: i32, color: Rgba<u8> },
    Circle { center: (f32, f32), radius: f32, color: Rgba<u8> },
    Line { from: (f32, f32), to: (f32, f32), color: Rgba<u8>, line_width: u32 },
    PixelWrite,
}

/// Surface that paints like [`RasterSurface`] and also keeps a log of every
/// draw call, for inspecting what a renderer did
pub struct RecordingSurface {
    inner: RasterSurface,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            inner: RasterSurface::new(width, height),
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|cmd| matches(cmd)).count()
    }
}

impl Surface for RecordingSurface {
    fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.inner.resize(width, height);
    }

    fn draw_image(&mut self, image: &RgbaImage, width: u32, height: u32) {
        self.commands.push(DrawCommand::Image { width, height });
        self.inner.draw_image(image, width, height);
    }

    fn stroke_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba<u8>, line_width: u32) {
        self.commands.push(DrawCommand::StrokeRect { x, y, width, height, color, line_width });
        self.inner.stroke_rect(x, y, width, height, color, line_width);
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba<u8>) {
        self.commands.push(DrawCommand::FillRect { x, y, width, height, color });
        self.inner.fill_rect(x, y, width, height, color);
    }

    fn fill_text(&mut self, text: &str, x: i32, y: i32, color: Rgba<u8>) {
        self.commands.push(DrawCommand::Text { text: text.to_string(), x, y, color });
        self.inner.fill_text(text, x, y, color);
    }

    fn measure_text(&self, text: &str) -> u32 {
        self.inner.measure_text(text)
    }

    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba<u8>) {
        self.commands.push(DrawCommand::Circle { center, radius, color });
        self.inner.fill_circle(center, radius, color);
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba<u8>, line_width: u32) {
        self.commands.push(DrawCommand::Line { from, to, color, line_width });
        self.inner.stroke_line(from, to, color, line_width);
    }

    fn pixels_mut(&mut self) -> &mut RgbaImage {
        self.commands.push(DrawCommand::PixelWrite);
        self.inner.pixels_mut()
    }

    fn pixels(&self) -> &RgbaImage {
        self.inner.pixels()
    }
}
