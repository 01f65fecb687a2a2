//! The active presentation mode.

use serde::{Deserialize, Serialize};

/// Which visualization the render loop draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Contour + analog distortion composite.
    #[default]
    Effect,
    /// Raw depth as grayscale.
    #[serde(alias = "depth")]
    DepthMap,
    /// Interactive 3D point splats.
    Splat,
    /// The original image, untouched.
    Source,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [
        ViewMode::Effect,
        ViewMode::DepthMap,
        ViewMode::Splat,
        ViewMode::Source,
    ];

    /// Value of `u_viewMode` for modes drawn by the effect program.
    #[must_use]
    pub fn shader_flag(self) -> Option<f32> {
        match self {
            ViewMode::Effect => Some(0.0),
            ViewMode::DepthMap => Some(1.0),
            ViewMode::Splat | ViewMode::Source => None,
        }
    }

    /// Whether pointer input drives the orbit camera in this mode.
    #[must_use]
    pub fn routes_pointer(self) -> bool {
        self == ViewMode::Splat
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Effect => "effect",
            ViewMode::DepthMap => "depth",
            ViewMode::Splat => "splat",
            ViewMode::Source => "source",
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "effect" => Ok(ViewMode::Effect),
            "depth" | "depthmap" => Ok(ViewMode::DepthMap),
            "splat" | "3d" => Ok(ViewMode::Splat),
            "source" | "original" => Ok(ViewMode::Source),
            other => Err(format!("unknown view mode '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_flags() {
        assert_eq!(ViewMode::Effect.shader_flag(), Some(0.0));
        assert_eq!(ViewMode::DepthMap.shader_flag(), Some(1.0));
        assert_eq!(ViewMode::Splat.shader_flag(), None);
        assert_eq!(ViewMode::Source.shader_flag(), None);
    }

    #[test]
    fn test_parse_round_trip() {
        for mode in ViewMode::ALL {
            assert_eq!(mode.label().parse::<ViewMode>(), Ok(mode));
        }
        assert!("hologram".parse::<ViewMode>().is_err());
    }

    #[test]
    fn test_only_splat_routes_pointer() {
        let routed: Vec<_> = ViewMode::ALL
            .into_iter()
            .filter(|m| m.routes_pointer())
            .collect();
        assert_eq!(routed, vec![ViewMode::Splat]);
    }
}
