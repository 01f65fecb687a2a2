//! Configuration options for vhsdepth.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::params::EffectParameters;
use crate::scheduler::DEFAULT_TIME_STEP;
use crate::view_mode::ViewMode;
use crate::Result;

/// How the 2D effect is split into shader passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompositorLayout {
    /// Contour, analog distortion and composite as three chained passes.
    #[default]
    MultiPass,
    /// One program that folds all stages together.
    SinglePass,
}

/// Global configuration options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Pass layout of the 2D compositor.
    pub compositor_layout: CompositorLayout,

    /// Seconds added to the animation clock per frame.
    pub time_step: f32,

    /// Largest surface the host will show, in pixels.
    pub max_surface_size: (u32, u32),

    /// Images larger than this in either dimension get a resized copy for estimation.
    pub max_image_dimension: u32,

    /// Mode shown once an image is loaded.
    pub initial_view_mode: ViewMode,

    /// Effect parameters.
    pub params: EffectParameters,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            compositor_layout: CompositorLayout::MultiPass,
            time_step: DEFAULT_TIME_STEP,
            max_surface_size: (1280, 720),
            max_image_dimension: 1024,
            initial_view_mode: ViewMode::Effect,
            params: EffectParameters::default(),
        }
    }
}

impl Options {
    /// Parses options from JSON. Missing fields take their defaults and
    /// parameters are clamped into range.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut options: Options = serde_json::from_str(json)?;
        options.params = options.params.clamped();
        Ok(options)
    }

    /// Loads options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Largest size with the image's aspect ratio that fits in `max`.
///
/// Never scales beyond the image's own size and never returns a zero dimension.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn fit_surface_size(image: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    let (w, h) = (image.0.max(1) as f64, image.1.max(1) as f64);
    let (max_w, max_h) = (max.0.max(1) as f64, max.1.max(1) as f64);
    let scale = (max_w / w).min(max_h / h).min(1.0);
    let fit_w = (w * scale).round().max(1.0) as u32;
    let fit_h = (h * scale).round().max(1.0) as u32;
    (fit_w.min(max.0.max(1)), fit_h.min(max.1.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_keeps_small_images() {
        assert_eq!(fit_surface_size((640, 480), (1280, 720)), (640, 480));
    }

    #[test]
    fn test_fit_preserves_aspect() {
        assert_eq!(fit_surface_size((4000, 2000), (1280, 720)), (1280, 640));
        assert_eq!(fit_surface_size((1000, 2000), (1280, 720)), (360, 720));
    }

    #[test]
    fn test_fit_degenerate_inputs() {
        assert_eq!(fit_surface_size((0, 0), (100, 100)), (1, 1));
        let (w, h) = fit_surface_size((10_000, 1), (100, 100));
        assert_eq!((w, h), (100, 1));
    }

    #[test]
    fn test_options_json_defaults_and_clamp() {
        let options =
            Options::from_json(r#"{"compositor_layout": "single_pass", "params": {"contourCount": 1000}}"#)
                .unwrap();
        assert_eq!(options.compositor_layout, CompositorLayout::SinglePass);
        assert_eq!(options.params.contour_count, 100.0);
        assert_eq!(options.time_step, DEFAULT_TIME_STEP);
        assert_eq!(options.initial_view_mode, ViewMode::Effect);
    }

    #[test]
    fn test_options_round_trip() {
        let mut options = Options::default();
        options.initial_view_mode = ViewMode::Splat;
        let json = options.to_json().unwrap();
        assert_eq!(Options::from_json(&json).unwrap(), options);
    }
}
