//! Shader sources by logical pass name.

use crate::error::ShaderError;
use crate::shader::ShaderBuilder;

/// Logical name of a shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassName {
    /// Iso-depth contour lines with glow.
    Contour,
    /// Analog tape distortion.
    Vhs,
    /// Depth-aware vignette, written to the screen.
    Composite,
    /// Contour, distortion and vignette folded into one pass.
    Effect,
    /// Source image copy.
    Blit,
    /// Instanced point splats.
    Splat,
}

impl PassName {
    pub const ALL: [PassName; 6] = [
        PassName::Contour,
        PassName::Vhs,
        PassName::Composite,
        PassName::Effect,
        PassName::Blit,
        PassName::Splat,
    ];

    /// Stem of the fragment source file, also the program label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PassName::Contour => "contour",
            PassName::Vhs => "vhs",
            PassName::Composite => "composite",
            PassName::Effect => "effect",
            PassName::Blit => "blit",
            PassName::Splat => "splat",
        }
    }

    /// Stem of the vertex source file. 2D passes share the quad shader.
    #[must_use]
    pub fn vertex_stem(self) -> &'static str {
        match self {
            PassName::Splat => "splat",
            _ => "quad",
        }
    }
}

impl std::fmt::Display for PassName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vertex and fragment WGSL of one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSource {
    pub vertex: String,
    pub fragment: String,
}

impl ProgramSource {
    /// A builder labelled after `pass`, holding both stages.
    #[must_use]
    pub fn builder(&self, pass: PassName) -> ShaderBuilder {
        ShaderBuilder::new()
            .with_label(pass.as_str())
            .with_vertex(self.vertex.clone())
            .with_fragment(self.fragment.clone())
    }
}

/// Yields the source text for a pass.
pub trait ShaderSource {
    fn load(&self, pass: PassName) -> Result<ProgramSource, ShaderError>;
}

/// Shaders compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedShaders;

impl EmbeddedShaders {
    fn vertex(pass: PassName) -> &'static str {
        match pass {
            PassName::Splat => include_str!("shaders/splat.vert.wgsl"),
            _ => include_str!("shaders/quad.vert.wgsl"),
        }
    }

    fn fragment(pass: PassName) -> &'static str {
        match pass {
            PassName::Contour => include_str!("shaders/contour.frag.wgsl"),
            PassName::Vhs => include_str!("shaders/vhs.frag.wgsl"),
            PassName::Composite => include_str!("shaders/composite.frag.wgsl"),
            PassName::Effect => include_str!("shaders/effect.frag.wgsl"),
            PassName::Blit => include_str!("shaders/blit.frag.wgsl"),
            PassName::Splat => include_str!("shaders/splat.frag.wgsl"),
        }
    }
}

impl ShaderSource for EmbeddedShaders {
    fn load(&self, pass: PassName) -> Result<ProgramSource, ShaderError> {
        Ok(ProgramSource {
            vertex: Self::vertex(pass).to_string(),
            fragment: Self::fragment(pass).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::BindingReflection;

    fn reflect(pass: PassName) -> BindingReflection {
        let source = EmbeddedShaders.load(pass).unwrap();
        match source.builder(pass).check() {
            Ok((_, reflection)) => reflection,
            Err(e) => panic!("{e}"),
        }
    }

    #[test]
    fn test_embedded_shaders_validate() {
        for pass in PassName::ALL {
            reflect(pass);
        }
    }

    #[test]
    fn test_pass_samplers() {
        assert_eq!(reflect(PassName::Contour).texture_binding("u_depthMap"), Some(2));
        assert_eq!(
            reflect(PassName::Vhs).texture_binding("u_contourTexture"),
            Some(2)
        );
        let composite = reflect(PassName::Composite);
        assert_eq!(composite.texture_binding("u_vhsTexture"), Some(2));
        assert_eq!(composite.texture_binding("u_depthMap"), Some(3));
        assert_eq!(reflect(PassName::Blit).texture_binding("u_image"), Some(2));
        let splat = reflect(PassName::Splat);
        assert_eq!(splat.texture_binding("u_depthMap"), Some(1));
        assert_eq!(splat.sampler, None);
    }

    #[test]
    fn test_uniform_contract() {
        let effect = reflect(PassName::Effect);
        for name in [
            "u_time",
            "u_resolution",
            "u_contourCount",
            "u_lineThickness",
            "u_waveAmplitude",
            "u_waveFrequency",
            "u_waveSpeed",
            "u_glowIntensity",
            "u_glowSize",
            "u_glowColor",
            "u_lineBrightness",
            "u_grainAmount",
            "u_scanlineIntensity",
            "u_jitterAmount",
            "u_vignetteIntensity",
            "u_viewMode",
        ] {
            assert!(effect.uniform(name).is_some(), "effect lacks {name}");
        }

        let splat = reflect(PassName::Splat);
        for name in [
            "u_viewMatrix",
            "u_projMatrix",
            "u_imageSize",
            "u_pointSize",
            "u_depthScale",
        ] {
            assert!(splat.uniform(name).is_some(), "splat lacks {name}");
        }
    }

    #[test]
    fn test_stems() {
        assert_eq!(PassName::Vhs.vertex_stem(), "quad");
        assert_eq!(PassName::Splat.vertex_stem(), "splat");
        assert_eq!(PassName::Composite.to_string(), "composite");
    }
}
