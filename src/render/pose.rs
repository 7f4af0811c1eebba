use super::{clamp_to_band, RenderOptions};
use crate::frame::Poses;
use crate::surface::Surface;
use image::{Rgba, RgbaImage};

pub const KEYPOINT_COUNT: usize = 17;

/// Keypoint index pairs joined into the body outline: shoulders, hips, then
/// the left and right arm and leg chains
pub const SKELETON: [(usize, usize); 12] = [
    (5, 6),
    (11, 12),
    (5, 7),
    (7, 9),
    (5, 11),
    (11, 13),
    (13, 15),
    (6, 8),
    (8, 10),
    (6, 12),
    (12, 14),
    (14, 16),
];

const SCORE_THRESHOLD: f64 = 0.5;
const KEYPOINT_RADIUS: f32 = 3.0;
const KEYPOINT_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);
const EDGE_COLOR: Rgba<u8> = Rgba([0, 255, 255, 255]);
const EDGE_WIDTH: u32 = 2;

/// Draw keypoints and skeleton edges for every confident pose
pub fn render<S: Surface + ?Sized>(
    surface: &mut S,
    source: &RgbaImage,
    width: u32,
    height: u32,
    poses: &Poses,
    options: &RenderOptions<'_>,
) {
    if options.input_image {
        surface.draw_image(source, width, height);
    }

    // Keypoints arrive as (y, x). The x component is scaled by the height and
    // the y component by the width; keep it that way, devices depend on it.
    let scale_x = f64::from(height);
    let scale_y = f64::from(width);

    for i in 0..poses.len() {
        if !(poses.scores[i] > SCORE_THRESHOLD) {
            continue;
        }
        let keypoints = &poses.keypoints[i];
        let scores = &poses.keypoint_scores[i];

        let position = |k: usize| -> Option<(f32, f32)> {
            let score = *scores.get(k)?;
            if !(score >= SCORE_THRESHOLD) {
                return None;
            }
            let y = *keypoints.get(2 * k)?;
            let x = *keypoints.get(2 * k + 1)?;
            if !(x.is_finite() && y.is_finite()) {
                return None;
            }
            Some((
                clamp_to_band(x * scale_x, width) as f32,
                clamp_to_band(y * scale_y, height) as f32,
            ))
        };

        for k in 0..KEYPOINT_COUNT {
            if let Some(center) = position(k) {
                surface.fill_circle(center, KEYPOINT_RADIUS, KEYPOINT_COLOR);
            }
        }

        for &(a, b) in SKELETON.iter() {
            if let (Some(from), Some(to)) = (position(a), position(b)) {
                surface.stroke_line(from, to, EDGE_COLOR, EDGE_WIDTH);
            }
        }
    }
}
