use crate::error::SettingsError;
use crate::render::Renderer;
use std::cell::Cell;
use std::rc::Rc;

/// Initial value of the live threshold control
pub const INITIAL_THRESHOLD: f64 = 0.6;

/// Granularity of the slider form of the control
pub const SLIDER_STEP: f64 = 0.01;

/// Detection confidence threshold shared between the settings panel and the
/// frame pump
///
/// Clones share one cell. The pump reads it each time it invokes the renderer,
/// so a change applies from the next frame on.
#[derive(Debug, Clone)]
pub struct Threshold(Rc<Cell<f64>>);

impl Threshold {
    pub fn new(value: f64) -> Self {
        Self(Rc::new(Cell::new(value.clamp(0.0, 1.0))))
    }

    pub fn get(&self) -> f64 {
        self.0.get()
    }

    /// Set from the slider: clamped to [0, 1] and snapped to the slider step
    pub fn set_from_slider(&self, value: f64) {
        let steps = (value.clamp(0.0, 1.0) / SLIDER_STEP).round();
        self.0.set((steps * SLIDER_STEP).clamp(0.0, 1.0));
    }

    /// Set from free-form text entry; invalid input leaves the value unchanged
    pub fn set_from_text(&self, text: &str) -> Result<f64, SettingsError> {
        let value: f64 = text
            .trim()
            .parse()
            .map_err(|_| SettingsError::NotANumber(text.to_string()))?;
        if !(0.0..=1.0).contains(&value) {
            return Err(SettingsError::OutOfRange(value));
        }
        self.0.set(value);
        Ok(value)
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::new(INITIAL_THRESHOLD)
    }
}

/// The collapsible "advanced" panel under the stream
#[derive(Debug, Clone, Default)]
pub struct AdvancedSettings {
    expanded: bool,
    threshold: Threshold,
}

impl AdvancedSettings {
    pub fn new(threshold: Threshold) -> Self {
        Self {
            expanded: false,
            threshold,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle(&mut self) -> bool {
        self.expanded = !self.expanded;
        self.expanded
    }

    /// The threshold control, offered only while the detection overlay is active
    pub fn threshold_control(&self, renderer: Option<Renderer>) -> Option<&Threshold> {
        (renderer == Some(Renderer::Detection)).then_some(&self.threshold)
    }

    pub fn threshold(&self) -> &Threshold {
        &self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_initial_value() {
        assert_eq!(Threshold::default().get(), INITIAL_THRESHOLD);
    }

    #[test]
    fn clones_share_the_value() {
        let panel = Threshold::default();
        let pump = panel.clone();
        panel.set_from_slider(0.3);
        assert!((pump.get() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn slider_snaps_and_clamps() {
        let threshold = Threshold::default();
        threshold.set_from_slider(0.456);
        assert!((threshold.get() - 0.46).abs() < 1e-6);
        threshold.set_from_slider(1.7);
        assert_eq!(threshold.get(), 1.0);
        threshold.set_from_slider(-0.2);
        assert_eq!(threshold.get(), 0.0);
    }

    #[test]
    fn text_entry_accepts_free_form_decimals() {
        let threshold = Threshold::default();
        assert_eq!(threshold.set_from_text(" 0.125 "), Ok(0.125));
        assert_eq!(threshold.get(), 0.125);
    }

    #[test]
    fn text_entry_rejects_bad_input() {
        let threshold = Threshold::default();
        assert_eq!(
            threshold.set_from_text("high"),
            Err(SettingsError::NotANumber("high".to_string()))
        );
        assert_eq!(threshold.set_from_text("1.5"), Err(SettingsError::OutOfRange(1.5)));
        assert_eq!(threshold.get(), INITIAL_THRESHOLD);
    }

    #[test]
    fn control_only_offered_for_detection() {
        let mut panel = AdvancedSettings::default();
        assert!(panel.toggle());
        assert!(panel.threshold_control(Some(Renderer::Detection)).is_some());
        assert!(panel.threshold_control(Some(Renderer::Pose)).is_none());
        assert!(panel.threshold_control(None).is_none());
    }
}
