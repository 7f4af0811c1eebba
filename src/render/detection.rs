use super::{label_text, to_px, RenderOptions};
use crate::frame::Detections;
use crate::surface::{Surface, FONT_SIZE, WHITE};
use image::{Rgba, RgbaImage};

/// Confidence cut-off used when the caller does not supply one
pub const DEFAULT_THRESHOLD: f64 = 0.5;

const LINE_WIDTH: u32 = 2;
const LABEL_PADDING: u32 = 4;

/// Outline every box at or above the threshold and tag it with its label
pub fn render<S: Surface + ?Sized>(
    surface: &mut S,
    source: &RgbaImage,
    width: u32,
    height: u32,
    detections: &Detections,
    options: &RenderOptions<'_>,
) {
    let threshold = options.threshold.unwrap_or(DEFAULT_THRESHOLD);

    if options.input_image {
        surface.draw_image(source, width, height);
    }

    let mut drawn = 0usize;
    for i in 0..detections.len() {
        let confidence = detections.confidence[i];
        if !(confidence >= threshold) {
            continue;
        }
        let Some(&[x1, y1, x2, y2]) = detections.bbox[i].get(..4) else {
            continue;
        };
        let corners = [x1, y1, x2, y2];
        if !corners.iter().all(|coord| coord.is_finite()) {
            continue;
        }

        let [x1, y1, x2, y2] = corners.map(|coord| coord.min(1.0));
        let (x1, x2) = (to_px(x1, width), to_px(x2, width));
        let (y1, y2) = (to_px(y1, height), to_px(y2, height));

        let label = label_text(options.labels, detections.class_id[i]);
        let color = label_color(&label);

        surface.stroke_rect(x1, y1, x2.saturating_sub(x1), y2.saturating_sub(y1), color, LINE_WIDTH);

        let text = format!("{label}: {:.2}%", 100.0 * confidence);
        let text_width = surface.measure_text(&text);
        surface.fill_rect(
            x1,
            y1,
            text_width + LABEL_PADDING,
            FONT_SIZE + LABEL_PADDING,
            color,
        );
        surface.fill_text(&text, x1, y1, WHITE);
        drawn += 1;
    }

    tracing::trace!("drew {} of {} boxes at threshold {}", drawn, detections.len(), threshold);
}

/// Stable colour for a label: the same text always maps to the same colour
///
/// Uses the 31-multiplier string hash over UTF-16 code units, taking the low
/// three bytes as red, green and blue.
pub fn label_color(label: &str) -> Rgba<u8> {
    let hash = label.encode_utf16().fold(0i32, |hash, unit| {
        i32::from(unit).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    });
    let channel = |i: u32| ((hash >> (i * 8)) & 0xff) as u8;
    Rgba([channel(0), channel(1), channel(2), 255])
}
