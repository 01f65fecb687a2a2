//! 2D multi-pass compositor.
//!
//! A [`PassChain`] is an ordered list of full-screen passes. Each pass samples
//! the depth map, the source image or the target of an earlier pass, and writes
//! either its own render target or, for the last pass, the screen. All passes of
//! a frame are recorded into one encoder in order, so every target is fully
//! written before the next pass samples it.

use std::collections::HashMap;

use vhsdepth_core::{CompositorLayout, EffectParameters, UniformValue, Vec2, ViewMode};

use crate::engine::{GpuTexture, OutputTarget, RenderEngine};
use crate::error::{RenderError, RenderResult};
use crate::session::ImageSession;
use crate::shader::ShaderProgram;
use crate::shaders::PassName;

/// First binding used for textures; 0 and 1 hold the uniform block and sampler.
pub const FIRST_TEXTURE_UNIT: u32 = 2;

/// What a pass samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassInput {
    DepthMap,
    SourceImage,
    /// The render target of an earlier pass.
    Pass(usize),
}

/// Where a pass writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutput {
    /// Its own render target, sampled by later passes.
    Target,
    /// The frame being presented.
    Screen,
}

/// One step of a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct PassSpec {
    pub name: String,
    pub program: PassName,
    /// Sampler name in the program, and what it reads.
    pub inputs: Vec<(String, PassInput)>,
    pub output: PassOutput,
}

impl PassSpec {
    pub fn new(program: PassName, output: PassOutput) -> Self {
        Self {
            name: program.as_str().to_string(),
            program,
            inputs: Vec::new(),
            output,
        }
    }

    #[must_use]
    pub fn with_input(mut self, sampler: impl Into<String>, input: PassInput) -> Self {
        self.inputs.push((sampler.into(), input));
        self
    }
}

/// A validated, ordered list of passes.
#[derive(Debug, Clone, PartialEq)]
pub struct PassChain {
    passes: Vec<PassSpec>,
}

impl PassChain {
    /// Builds a chain, rejecting orderings that would sample unwritten targets.
    pub fn new(passes: Vec<PassSpec>) -> RenderResult<Self> {
        let chain = Self { passes };
        chain.validate()?;
        Ok(chain)
    }

    /// Checks that every pass samples only earlier passes and that exactly
    /// the last pass writes the screen.
    pub fn validate(&self) -> RenderResult<()> {
        let invalid = |msg: String| Err(RenderError::InvalidPassChain(msg));
        let Some(last) = self.passes.len().checked_sub(1) else {
            return invalid("chain has no passes".to_string());
        };

        for (index, pass) in self.passes.iter().enumerate() {
            for (sampler, input) in &pass.inputs {
                if let PassInput::Pass(source) = *input {
                    if source >= index {
                        return invalid(format!(
                            "pass '{}' samples '{sampler}' from pass {source}, which has not run yet",
                            pass.name
                        ));
                    }
                }
            }
            match (pass.output, index == last) {
                (PassOutput::Screen, false) => {
                    return invalid(format!(
                        "intermediate pass '{}' writes the screen",
                        pass.name
                    ))
                }
                (PassOutput::Target, true) => {
                    return invalid(format!("last pass '{}' does not write the screen", pass.name))
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Contour, then tape distortion, then a depth-aware vignette on screen.
    #[must_use]
    pub fn multi_pass() -> Self {
        Self {
            passes: vec![
                PassSpec::new(PassName::Contour, PassOutput::Target)
                    .with_input("u_depthMap", PassInput::DepthMap),
                PassSpec::new(PassName::Vhs, PassOutput::Target)
                    .with_input("u_contourTexture", PassInput::Pass(0)),
                PassSpec::new(PassName::Composite, PassOutput::Screen)
                    .with_input("u_vhsTexture", PassInput::Pass(1))
                    .with_input("u_depthMap", PassInput::DepthMap),
            ],
        }
    }

    /// The whole effect in one program, straight to the screen.
    #[must_use]
    pub fn single_pass() -> Self {
        Self {
            passes: vec![PassSpec::new(PassName::Effect, PassOutput::Screen)
                .with_input("u_depthMap", PassInput::DepthMap)],
        }
    }

    /// The source image copied to the screen.
    #[must_use]
    pub fn blit() -> Self {
        Self {
            passes: vec![PassSpec::new(PassName::Blit, PassOutput::Screen)
                .with_input("u_image", PassInput::SourceImage)],
        }
    }

    #[must_use]
    pub fn for_layout(layout: CompositorLayout) -> Self {
        match layout {
            CompositorLayout::MultiPass => Self::multi_pass(),
            CompositorLayout::SinglePass => Self::single_pass(),
        }
    }

    #[must_use]
    pub fn passes(&self) -> &[PassSpec] {
        &self.passes
    }

    /// Programs the chain needs, in pass order.
    pub fn programs(&self) -> impl Iterator<Item = PassName> + '_ {
        self.passes.iter().map(|p| p.program)
    }
}

/// Per-frame values every pass receives besides the parameter set.
#[derive(Debug, Clone, Copy)]
pub struct FrameUniforms<'a> {
    pub time: f32,
    pub mode: ViewMode,
    pub params: &'a EffectParameters,
}

/// Runs a [`PassChain`] against an [`ImageSession`].
pub struct Compositor {
    chain: PassChain,
}

impl Compositor {
    #[must_use]
    pub fn new(chain: PassChain) -> Self {
        Self { chain }
    }

    #[must_use]
    pub fn chain(&self) -> &PassChain {
        &self.chain
    }

    /// Records and submits every pass of the chain.
    ///
    /// Each pass binds all of its inputs and uniforms afresh; nothing is
    /// assumed to carry over from the previous pass.
    #[allow(clippy::cast_precision_loss)]
    pub fn render(
        &self,
        engine: &RenderEngine,
        programs: &mut HashMap<PassName, ShaderProgram>,
        session: &ImageSession,
        frame: FrameUniforms<'_>,
        output: OutputTarget<'_>,
    ) -> RenderResult<()> {
        let shared = frame.params.uniform_values();
        let view_flag = frame.mode.shader_flag().unwrap_or(0.0);
        let mut encoder = engine.encoder("compositor encoder");

        for (index, spec) in self.chain.passes.iter().enumerate() {
            let program = programs
                .get_mut(&spec.program)
                .ok_or(RenderError::ModeUnavailable(frame.mode))?;

            let destination = match spec.output {
                PassOutput::Screen => output,
                PassOutput::Target => {
                    let target = session.target(index).ok_or_else(|| {
                        RenderError::InvalidPassChain(format!(
                            "session has no render target for pass '{}'",
                            spec.name
                        ))
                    })?;
                    OutputTarget {
                        view: target.view(),
                        format: target.format(),
                        width: target.width(),
                        height: target.height(),
                    }
                }
            };

            program.clear_textures();
            for (unit, (sampler, input)) in (FIRST_TEXTURE_UNIT..).zip(&spec.inputs) {
                let texture = resolve_input(session, *input, &spec.name)?;
                program.set_texture_uniform(sampler, texture, unit);
            }
            for (name, value) in &shared {
                program.set_uniform(name, *value);
            }
            program.set_uniform("u_time", frame.time);
            program.set_uniform(
                "u_resolution",
                Vec2::new(destination.width as f32, destination.height as f32),
            );
            program.set_uniform("u_viewMode", UniformValue::Float(view_flag));

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(&spec.name),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: destination.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
            program.bind(engine, &mut render_pass, destination.format)?;
            engine.quad.draw(&mut render_pass);
        }

        engine.submit(encoder);
        Ok(())
    }
}

fn resolve_input<'s>(
    session: &'s ImageSession,
    input: PassInput,
    pass: &str,
) -> RenderResult<&'s GpuTexture> {
    match input {
        PassInput::DepthMap => Ok(session.depth_texture()),
        PassInput::SourceImage => Ok(session.image_texture()),
        PassInput::Pass(index) => session
            .target(index)
            .map(|target| &target.texture)
            .ok_or_else(|| {
                RenderError::InvalidPassChain(format!(
                    "pass '{pass}' samples pass {index}, which has no render target"
                ))
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_chains_validate() {
        for chain in [
            PassChain::multi_pass(),
            PassChain::single_pass(),
            PassChain::blit(),
        ] {
            chain.validate().unwrap();
        }
    }

    #[test]
    fn test_multi_pass_order() {
        let chain = PassChain::multi_pass();
        let programs: Vec<_> = chain.programs().collect();
        assert_eq!(
            programs,
            vec![PassName::Contour, PassName::Vhs, PassName::Composite]
        );
        let composite = &chain.passes()[2];
        assert!(composite
            .inputs
            .contains(&("u_depthMap".to_string(), PassInput::DepthMap)));
        assert!(composite
            .inputs
            .contains(&("u_vhsTexture".to_string(), PassInput::Pass(1))));
    }

    #[test]
    fn test_rejects_forward_reference() {
        let err = PassChain::new(vec![
            PassSpec::new(PassName::Contour, PassOutput::Target)
                .with_input("u_depthMap", PassInput::Pass(1)),
            PassSpec::new(PassName::Composite, PassOutput::Screen),
        ])
        .unwrap_err();
        assert!(matches!(err, RenderError::InvalidPassChain(_)));
    }

    #[test]
    fn test_rejects_self_reference() {
        let err = PassChain::new(vec![PassSpec::new(PassName::Blit, PassOutput::Screen)
            .with_input("u_image", PassInput::Pass(0))])
        .unwrap_err();
        assert!(matches!(err, RenderError::InvalidPassChain(_)));
    }

    #[test]
    fn test_screen_only_at_end() {
        assert!(PassChain::new(vec![
            PassSpec::new(PassName::Contour, PassOutput::Screen),
            PassSpec::new(PassName::Composite, PassOutput::Screen),
        ])
        .is_err());
        assert!(PassChain::new(vec![PassSpec::new(PassName::Contour, PassOutput::Target)]).is_err());
        assert!(PassChain::new(Vec::new()).is_err());
    }

    #[test]
    fn test_layout_selection() {
        assert_eq!(
            PassChain::for_layout(CompositorLayout::SinglePass),
            PassChain::single_pass()
        );
        assert_eq!(
            PassChain::for_layout(CompositorLayout::MultiPass).passes().len(),
            3
        );
    }
}
