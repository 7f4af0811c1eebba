use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use image::{ImageFormat, Rgba, RgbaImage};
use overlay_fx::notify::Notifier;
use overlay_fx::surface::{DrawCommand, RecordingSurface, Surface};
use overlay_fx::{FailureKind, Frame, FrameOutcome, FramePump, PumpState, Renderer, Threshold, ViewportState};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Clone, Default)]
struct CollectingNotifier {
    errors: Rc<RefCell<Vec<String>>>,
}

impl Notifier for CollectingNotifier {
    fn error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }
}

fn png_data_uri(width: u32, height: u32, color: [u8; 4]) -> String {
    let image = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png).unwrap();
    format!("data:image/png;base64,{}", BASE64_STANDARD.encode(bytes.into_inner()))
}

fn frame(width: u32, height: u32, detections: Value) -> Frame {
    Frame {
        image: png_data_uri(width, height, [10, 20, 30, 255]),
        detections,
        width,
        height,
    }
}

fn one_box(confidence: f64) -> Value {
    json!({
        "bbox": [[0.1, 0.2, 0.9, 0.95]],
        "confidence": [confidence],
        "class_id": [0],
    })
}

struct Harness {
    pump: FramePump<RecordingSurface>,
    viewport: Rc<ViewportState>,
    threshold: Threshold,
    errors: Rc<RefCell<Vec<String>>>,
}

fn harness(renderer: Option<Renderer>) -> Harness {
    let viewport = Rc::new(ViewportState::new(1920, 1080));
    let threshold = Threshold::new(0.6);
    let notifier = CollectingNotifier::default();
    let errors = notifier.errors.clone();

    let mut pump = FramePump::new(
        RecordingSurface::new(1, 1),
        viewport.clone(),
        Box::new(notifier),
        threshold.clone(),
    );
    pump.set_renderer(renderer);

    Harness {
        pump,
        viewport,
        threshold,
        errors,
    }
}

fn boxes_drawn(surface: &RecordingSurface) -> usize {
    surface.count(|cmd| matches!(cmd, DrawCommand::StrokeRect { .. }))
}

#[test]
fn idle_pump_ignores_frames() {
    let mut h = harness(Some(Renderer::Detection));
    assert_eq!(h.pump.state(), PumpState::Idle);

    let outcome = h.pump.on_frame(&frame(64, 48, one_box(0.9)));

    assert_eq!(outcome, FrameOutcome::Ignored);
    assert!(h.pump.surface().commands().is_empty());
    assert_eq!(h.pump.stats().received, 0);
}

#[test]
fn stop_returns_to_idle() {
    let mut h = harness(Some(Renderer::Detection));
    h.pump.start();
    assert_eq!(h.pump.on_frame(&frame(64, 48, one_box(0.9))), FrameOutcome::Painted);

    h.pump.stop();
    assert_eq!(h.pump.state(), PumpState::Idle);
    assert_eq!(h.pump.on_frame(&frame(64, 48, one_box(0.9))), FrameOutcome::Ignored);
    assert_eq!(h.pump.stats().painted, 1);
}

#[test]
fn threshold_change_applies_to_next_frame() {
    let mut h = harness(Some(Renderer::Detection));
    h.pump.start();

    h.pump.on_frame(&frame(640, 480, one_box(0.4)));
    assert_eq!(boxes_drawn(h.pump.surface()), 0);

    h.threshold.set_from_slider(0.3);
    h.pump.surface_mut().clear_commands();
    h.pump.on_frame(&frame(640, 480, one_box(0.4)));
    assert_eq!(boxes_drawn(h.pump.surface()), 1);
}

#[test]
fn threshold_ignored_outside_detection() {
    let mut h = harness(Some(Renderer::Classification));
    h.pump.start();
    h.threshold.set_from_slider(1.0);

    let detections = json!({ "confidence": [0.2], "class_id": [7] });
    h.pump.on_frame(&frame(64, 64, detections));

    assert_eq!(h.pump.surface().texts(), vec!["7: 20.00%"]);
}

#[test]
fn unknown_network_leaves_surface_untouched_but_counts_fps() {
    let mut h = harness(Renderer::select("pp_unknown"));
    let start = Instant::now();
    h.pump.start_at(start);

    for i in 0..=10u64 {
        let outcome = h
            .pump
            .on_frame_at(&frame(64, 48, json!({})), start + Duration::from_millis(i * 100));
        assert_eq!(outcome, FrameOutcome::NoRenderer);
    }

    assert!(h.pump.surface().commands().is_empty());
    assert_eq!(h.pump.surface().dimensions(), (1, 1));
    assert_eq!(h.pump.fps(), 11);
}

#[test]
fn fps_published_once_per_second() {
    let mut h = harness(Some(Renderer::Detection));
    let start = Instant::now();
    h.pump.start_at(start);

    for i in 1..=20u64 {
        h.pump
            .on_frame_at(&frame(32, 32, one_box(0.9)), start + Duration::from_millis(i * 50));
    }
    assert_eq!(h.pump.fps(), 20);

    for i in 1..=5u64 {
        h.pump
            .on_frame_at(&frame(32, 32, one_box(0.9)), start + Duration::from_millis(1000 + i * 100));
    }
    // Second window still open
    assert_eq!(h.pump.fps(), 20);
}

#[test]
fn broken_image_reported_once() {
    let mut h = harness(Some(Renderer::Detection));
    h.pump.start();

    let mut broken = frame(64, 48, one_box(0.9));
    broken.image = "data:image/png;base64,bm90IGEgcG5n".to_string();

    for _ in 0..3 {
        assert_eq!(h.pump.on_frame(&broken), FrameOutcome::Skipped(FailureKind::Image));
    }

    assert_eq!(h.errors.borrow().len(), 1);
    assert_eq!(h.pump.stats().skipped, 3);

    // Pipeline keeps going once frames are good again
    assert_eq!(h.pump.on_frame(&frame(64, 48, one_box(0.9))), FrameOutcome::Painted);
}

#[test]
fn bad_mask_reported_once_and_frame_still_shown() {
    let mut h = harness(Some(Renderer::Segmentation));
    h.pump.start();

    let detections = json!({ "n_segments": 1, "indices": [1], "mask": "%%%" });
    for _ in 0..2 {
        let outcome = h.pump.on_frame(&frame(64, 64, detections.clone()));
        assert_eq!(outcome, FrameOutcome::Skipped(FailureKind::Mask));
    }

    assert_eq!(h.errors.borrow().len(), 1);
    assert_eq!(h.pump.surface().pixels().get_pixel(320, 320).0, [10, 20, 30, 255]);
}

#[test]
fn zero_sized_frame_is_not_painted() {
    let mut h = harness(Some(Renderer::Detection));
    h.pump.start();

    let outcome = h.pump.on_frame(&frame(0, 0, one_box(0.9)));

    assert_eq!(outcome, FrameOutcome::NoDrawArea);
    assert!(h.pump.surface().commands().is_empty());
}

#[test]
fn fullscreen_toggle_changes_draw_size() {
    let mut h = harness(Some(Renderer::Detection));
    h.pump.start();

    h.pump.on_frame(&frame(300, 300, one_box(0.9)));
    assert_eq!(h.pump.surface().dimensions(), (640, 640));

    assert!(h.viewport.toggle_fullscreen());
    h.pump.on_frame(&frame(300, 300, one_box(0.9)));
    assert_eq!(h.pump.surface().dimensions(), (640, 360));

    h.viewport.set_size(1000, 2000);
    h.pump.on_frame(&frame(300, 300, one_box(0.9)));
    assert_eq!(h.pump.surface().dimensions(), (320, 640));
}

#[test]
fn overlay_only_keeps_previous_content() {
    let mut h = harness(Some(Renderer::Detection));
    h.pump.start();
    h.pump.on_frame(&frame(64, 64, json!({})));
    assert_eq!(h.pump.surface().pixels().get_pixel(5, 5).0, [10, 20, 30, 255]);

    h.pump.set_input_image(false);
    h.pump.surface_mut().clear_commands();
    let mut next = frame(64, 64, json!({}));
    next.image = String::new();
    assert_eq!(h.pump.on_frame(&next), FrameOutcome::Painted);

    assert!(h
        .pump
        .surface()
        .commands()
        .iter()
        .all(|cmd| !matches!(cmd, DrawCommand::Image { .. })));
    assert_eq!(h.pump.surface().pixels().get_pixel(5, 5).0, [10, 20, 30, 255]);
}

#[test]
fn switching_renderer_rearms_error_reporting() {
    let mut h = harness(Some(Renderer::Detection));
    h.pump.start();

    let mut broken = frame(64, 48, one_box(0.9));
    broken.image = "not base64 at all!".to_string();
    h.pump.on_frame(&broken);
    h.pump.on_frame(&broken);
    assert_eq!(h.errors.borrow().len(), 1);

    h.pump.set_renderer(Some(Renderer::Pose));
    h.pump.on_frame(&broken);
    assert_eq!(h.errors.borrow().len(), 2);
}
