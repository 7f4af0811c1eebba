use super::{label_text, RenderOptions};
use crate::frame::Classifications;
use crate::surface::{Surface, FONT_SIZE, WHITE};
use image::RgbaImage;

/// Only the leading predictions are listed
pub const TOP_PREDICTIONS: usize = 5;

const MARGIN: i32 = 4;

/// List the top predictions as `"<label>: <score>%"` lines in the top-left corner
pub fn render<S: Surface + ?Sized>(
    surface: &mut S,
    source: &RgbaImage,
    width: u32,
    height: u32,
    classifications: &Classifications,
    options: &RenderOptions<'_>,
) {
    if options.input_image {
        surface.draw_image(source, width, height);
    }

    let shown = classifications.len().min(TOP_PREDICTIONS);
    for i in 0..shown {
        let label = label_text(options.labels, classifications.class_id[i]);
        let score = 100.0 * classifications.confidence[i];
        let text = format!("{label}: {score:.2}%");

        surface.fill_text(&text, MARGIN, i as i32 * FONT_SIZE as i32 + MARGIN, WHITE);
    }
}
