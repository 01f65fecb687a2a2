//! Live effect parameters shared by every shader pass.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::uniform::UniformValue;

/// Inclusive numeric range and default of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ParamRange {
    const fn new(min: f32, max: f32, default: f32) -> Self {
        Self { min, max, default }
    }

    /// Clamps `value` into the range. NaN maps to the default.
    #[must_use]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        }
    }
}

/// Identifies one scalar of [`EffectParameters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamId {
    ContourCount,
    LineThickness,
    WaveAmplitude,
    WaveFrequency,
    WaveSpeed,
    GlowIntensity,
    GlowSize,
    GlowColorR,
    GlowColorG,
    GlowColorB,
    LineBrightness,
    GrainAmount,
    ScanlineIntensity,
    JitterAmount,
    VignetteIntensity,
    PointSize,
    DepthScale,
}

impl ParamId {
    /// Every parameter, in declaration order.
    pub const ALL: [ParamId; 17] = [
        ParamId::ContourCount,
        ParamId::LineThickness,
        ParamId::WaveAmplitude,
        ParamId::WaveFrequency,
        ParamId::WaveSpeed,
        ParamId::GlowIntensity,
        ParamId::GlowSize,
        ParamId::GlowColorR,
        ParamId::GlowColorG,
        ParamId::GlowColorB,
        ParamId::LineBrightness,
        ParamId::GrainAmount,
        ParamId::ScanlineIntensity,
        ParamId::JitterAmount,
        ParamId::VignetteIntensity,
        ParamId::PointSize,
        ParamId::DepthScale,
    ];

    #[must_use]
    pub fn range(self) -> ParamRange {
        match self {
            ParamId::ContourCount => ParamRange::new(1.0, 100.0, 30.0),
            ParamId::LineThickness => ParamRange::new(0.1, 5.0, 1.8),
            ParamId::WaveAmplitude => ParamRange::new(0.0, 0.05, 0.006),
            ParamId::WaveFrequency => ParamRange::new(0.0, 200.0, 60.0),
            ParamId::WaveSpeed => ParamRange::new(0.0, 10.0, 2.0),
            ParamId::GlowIntensity => ParamRange::new(0.0, 2.0, 0.6),
            ParamId::GlowSize => ParamRange::new(0.0, 5.0, 1.0),
            ParamId::GlowColorR => ParamRange::new(0.0, 1.0, 0.1),
            ParamId::GlowColorG => ParamRange::new(0.0, 1.0, 0.3),
            ParamId::GlowColorB => ParamRange::new(0.0, 1.0, 0.9),
            ParamId::LineBrightness => ParamRange::new(0.0, 2.0, 0.9),
            ParamId::GrainAmount => ParamRange::new(0.0, 1.0, 0.08),
            ParamId::ScanlineIntensity => ParamRange::new(0.0, 1.0, 0.12),
            ParamId::JitterAmount => ParamRange::new(0.0, 0.05, 0.008),
            ParamId::VignetteIntensity => ParamRange::new(0.0, 2.0, 0.5),
            ParamId::PointSize => ParamRange::new(1.0, 50.0, 15.0),
            ParamId::DepthScale => ParamRange::new(0.0, 5.0, 1.5),
        }
    }

    /// Name of the shader uniform this parameter feeds.
    ///
    /// The three glow color channels share `u_glowColor`.
    #[must_use]
    pub fn uniform_name(self) -> &'static str {
        match self {
            ParamId::ContourCount => "u_contourCount",
            ParamId::LineThickness => "u_lineThickness",
            ParamId::WaveAmplitude => "u_waveAmplitude",
            ParamId::WaveFrequency => "u_waveFrequency",
            ParamId::WaveSpeed => "u_waveSpeed",
            ParamId::GlowIntensity => "u_glowIntensity",
            ParamId::GlowSize => "u_glowSize",
            ParamId::GlowColorR | ParamId::GlowColorG | ParamId::GlowColorB => "u_glowColor",
            ParamId::LineBrightness => "u_lineBrightness",
            ParamId::GrainAmount => "u_grainAmount",
            ParamId::ScanlineIntensity => "u_scanlineIntensity",
            ParamId::JitterAmount => "u_jitterAmount",
            ParamId::VignetteIntensity => "u_vignetteIntensity",
            ParamId::PointSize => "u_pointSize",
            ParamId::DepthScale => "u_depthScale",
        }
    }
}

/// The flat set of effect parameters.
///
/// Fields are independent; there are no cross-field invariants beyond each
/// value's own range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EffectParameters {
    pub contour_count: f32,
    pub line_thickness: f32,
    pub wave_amplitude: f32,
    pub wave_frequency: f32,
    pub wave_speed: f32,
    pub glow_intensity: f32,
    pub glow_size: f32,
    pub glow_color: Vec3,
    pub line_brightness: f32,
    pub grain_amount: f32,
    pub scanline_intensity: f32,
    pub jitter_amount: f32,
    pub vignette_intensity: f32,
    pub point_size: f32,
    pub depth_scale: f32,
}

impl Default for EffectParameters {
    fn default() -> Self {
        let d = |id: ParamId| id.range().default;
        Self {
            contour_count: d(ParamId::ContourCount),
            line_thickness: d(ParamId::LineThickness),
            wave_amplitude: d(ParamId::WaveAmplitude),
            wave_frequency: d(ParamId::WaveFrequency),
            wave_speed: d(ParamId::WaveSpeed),
            glow_intensity: d(ParamId::GlowIntensity),
            glow_size: d(ParamId::GlowSize),
            glow_color: Vec3::new(
                d(ParamId::GlowColorR),
                d(ParamId::GlowColorG),
                d(ParamId::GlowColorB),
            ),
            line_brightness: d(ParamId::LineBrightness),
            grain_amount: d(ParamId::GrainAmount),
            scanline_intensity: d(ParamId::ScanlineIntensity),
            jitter_amount: d(ParamId::JitterAmount),
            vignette_intensity: d(ParamId::VignetteIntensity),
            point_size: d(ParamId::PointSize),
            depth_scale: d(ParamId::DepthScale),
        }
    }
}

impl EffectParameters {
    #[must_use]
    pub fn get(&self, id: ParamId) -> f32 {
        match id {
            ParamId::ContourCount => self.contour_count,
            ParamId::LineThickness => self.line_thickness,
            ParamId::WaveAmplitude => self.wave_amplitude,
            ParamId::WaveFrequency => self.wave_frequency,
            ParamId::WaveSpeed => self.wave_speed,
            ParamId::GlowIntensity => self.glow_intensity,
            ParamId::GlowSize => self.glow_size,
            ParamId::GlowColorR => self.glow_color.x,
            ParamId::GlowColorG => self.glow_color.y,
            ParamId::GlowColorB => self.glow_color.z,
            ParamId::LineBrightness => self.line_brightness,
            ParamId::GrainAmount => self.grain_amount,
            ParamId::ScanlineIntensity => self.scanline_intensity,
            ParamId::JitterAmount => self.jitter_amount,
            ParamId::VignetteIntensity => self.vignette_intensity,
            ParamId::PointSize => self.point_size,
            ParamId::DepthScale => self.depth_scale,
        }
    }

    /// Sets one parameter, clamped into its range. Returns the stored value.
    pub fn set(&mut self, id: ParamId, value: f32) -> f32 {
        let value = id.range().clamp(value);
        let slot = match id {
            ParamId::ContourCount => &mut self.contour_count,
            ParamId::LineThickness => &mut self.line_thickness,
            ParamId::WaveAmplitude => &mut self.wave_amplitude,
            ParamId::WaveFrequency => &mut self.wave_frequency,
            ParamId::WaveSpeed => &mut self.wave_speed,
            ParamId::GlowIntensity => &mut self.glow_intensity,
            ParamId::GlowSize => &mut self.glow_size,
            ParamId::GlowColorR => &mut self.glow_color.x,
            ParamId::GlowColorG => &mut self.glow_color.y,
            ParamId::GlowColorB => &mut self.glow_color.z,
            ParamId::LineBrightness => &mut self.line_brightness,
            ParamId::GrainAmount => &mut self.grain_amount,
            ParamId::ScanlineIntensity => &mut self.scanline_intensity,
            ParamId::JitterAmount => &mut self.jitter_amount,
            ParamId::VignetteIntensity => &mut self.vignette_intensity,
            ParamId::PointSize => &mut self.point_size,
            ParamId::DepthScale => &mut self.depth_scale,
        };
        *slot = value;
        value
    }

    /// Returns a copy with every field clamped into its range.
    #[must_use]
    pub fn clamped(&self) -> Self {
        let mut out = *self;
        for id in ParamId::ALL {
            out.set(id, self.get(id));
        }
        out
    }

    /// Background tint used when the splat view clears the frame.
    #[must_use]
    pub fn background_tint(&self) -> Vec3 {
        self.glow_color * 0.05
    }

    /// The full uniform set every pass receives.
    ///
    /// Passes consume only the fields they declare; the rest are ignored.
    #[must_use]
    pub fn uniform_values(&self) -> Vec<(&'static str, UniformValue)> {
        let mut values: Vec<(&'static str, UniformValue)> = ParamId::ALL
            .iter()
            .filter(|id| {
                !matches!(
                    id,
                    ParamId::GlowColorR | ParamId::GlowColorG | ParamId::GlowColorB
                )
            })
            .map(|&id| (id.uniform_name(), UniformValue::Float(self.get(id))))
            .collect();
        values.push(("u_glowColor", UniformValue::from(self.glow_color)));
        values
    }
}
