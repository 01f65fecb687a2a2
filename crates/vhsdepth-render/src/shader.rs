//! Shader programs.
//!
//! A [`ShaderProgram`] is a compiled WGSL module together with everything needed
//! to draw with it: the reflected bind group layout, staged uniform values, the
//! textures bound for the next draw and one pipeline per color format.

use std::collections::HashMap;

use pollster::FutureExt;
use vhsdepth_core::UniformValue;
use wgpu::util::DeviceExt;

use crate::engine::{GpuTexture, RenderEngine};
use crate::error::{ShaderError, ShaderStage};
use crate::quad::quad_vertex_layout;
use crate::uniforms::{reflect, BindingReflection, UniformBlock};

/// Vertex stage entry point every program exports.
pub const VERTEX_ENTRY: &str = "vs_main";
/// Fragment stage entry point every program exports.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Where a program's vertices come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexInput {
    /// The shared full-screen quad buffer.
    Quad,
    /// No buffers; the vertex shader derives positions from its indices.
    Generated,
}

/// Fixed-function state of a program's pipelines.
#[derive(Debug, Clone, Copy)]
pub struct ProgramDescriptor {
    pub vertex_input: VertexInput,
    pub blend: Option<wgpu::BlendState>,
    /// Depth attachment format; depth tests use `LessEqual` with writes on.
    pub depth_format: Option<wgpu::TextureFormat>,
}

impl ProgramDescriptor {
    /// An opaque full-screen pass.
    #[must_use]
    pub fn fullscreen() -> Self {
        Self {
            vertex_input: VertexInput::Quad,
            blend: None,
            depth_format: None,
        }
    }

    /// Alpha-blended, depth-tested sprites generated in the vertex shader.
    #[must_use]
    pub fn sprites(depth_format: wgpu::TextureFormat) -> Self {
        Self {
            vertex_input: VertexInput::Generated,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            depth_format: Some(depth_format),
        }
    }
}

/// Builder for creating shader programs.
pub struct ShaderBuilder {
    vertex_source: Option<String>,
    fragment_source: Option<String>,
    label: Option<String>,
}

impl ShaderBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            vertex_source: None,
            fragment_source: None,
            label: None,
        }
    }

    /// Sets the vertex shader source (WGSL).
    #[must_use]
    pub fn with_vertex(mut self, source: impl Into<String>) -> Self {
        self.vertex_source = Some(source.into());
        self
    }

    /// Sets the fragment shader source (WGSL).
    #[must_use]
    pub fn with_fragment(mut self, source: impl Into<String>) -> Self {
        self.fragment_source = Some(source.into());
        self
    }

    /// Sets the program label used in diagnostics and wgpu debug labels.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("unnamed program")
    }

    /// Joins both stages into one WGSL module source.
    pub fn combined_source(&self) -> Result<String, ShaderError> {
        let missing = |stage: &str| {
            ShaderError::new(self.label(), ShaderStage::Parse, format!("missing {stage} shader"))
        };
        let vertex = self.vertex_source.as_ref().ok_or_else(|| missing("vertex"))?;
        let fragment = self
            .fragment_source
            .as_ref()
            .ok_or_else(|| missing("fragment"))?;

        // If sources are the same file, just return one
        if vertex == fragment {
            return Ok(vertex.clone());
        }
        Ok(format!("{vertex}\n\n{fragment}"))
    }

    /// Parses, validates and reflects the program without touching a device.
    pub fn check(&self) -> Result<(String, BindingReflection), ShaderError> {
        let source = self.combined_source()?;
        let reflection = validate_source(self.label(), &source)?;
        Ok((source, reflection))
    }

    /// Compiles the program and creates its pipeline for the engine's surface format.
    pub fn build(
        self,
        engine: &RenderEngine,
        descriptor: ProgramDescriptor,
    ) -> Result<ShaderProgram, ShaderError> {
        let (source, reflection) = self.check()?;
        let label = self.label().to_string();
        ShaderProgram::create(engine, label, &source, reflection, descriptor)
    }
}

impl Default for ShaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses and validates WGSL with naga, then reflects its bindings.
pub fn validate_source(label: &str, source: &str) -> Result<BindingReflection, ShaderError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| ShaderError::new(label, ShaderStage::Parse, e.emit_to_string(source)))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| ShaderError::new(label, ShaderStage::Validate, e.emit_to_string(source)))?;

    for (entry, stage) in [
        (VERTEX_ENTRY, naga::ShaderStage::Vertex),
        (FRAGMENT_ENTRY, naga::ShaderStage::Fragment),
    ] {
        if !module
            .entry_points
            .iter()
            .any(|ep| ep.name == entry && ep.stage == stage)
        {
            return Err(ShaderError::new(
                label,
                ShaderStage::Validate,
                format!("missing {stage:?} entry point '{entry}'"),
            ));
        }
    }

    reflect(label, &module)
}

/// A compiled program ready to draw.
pub struct ShaderProgram {
    label: String,
    module: wgpu::ShaderModule,
    descriptor: ProgramDescriptor,
    reflection: BindingReflection,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,
    uniforms: UniformBlock,
    textures: HashMap<u32, wgpu::TextureView>,
}

impl ShaderProgram {
    fn create(
        engine: &RenderEngine,
        label: String,
        source: &str,
        reflection: BindingReflection,
        descriptor: ProgramDescriptor,
    ) -> Result<Self, ShaderError> {
        let device = &engine.device;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{label} bind group layout")),
            entries: &layout_entries(&reflection),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} pipeline layout")),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        if let Some(error) = device.pop_error_scope().block_on() {
            return Err(ShaderError::new(label, ShaderStage::Create, error.to_string()));
        }

        let uniforms = UniformBlock::new(reflection.uniforms.clone());
        let mut program = Self {
            label,
            module,
            descriptor,
            reflection,
            bind_group_layout,
            pipeline_layout,
            pipelines: HashMap::new(),
            uniforms,
            textures: HashMap::new(),
        };
        program.ensure_pipeline(device, engine.surface_format())?;
        log::debug!(
            "compiled program '{}' ({} textures)",
            program.label,
            program.reflection.textures.len()
        );
        Ok(program)
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn reflection(&self) -> &BindingReflection {
        &self.reflection
    }

    /// Whether the program declares a writable uniform named `name`.
    #[must_use]
    pub fn has_uniform(&self, name: &str) -> bool {
        self.reflection
            .uniform(name)
            .is_some_and(|member| member.kind.arity().is_some())
    }

    /// Stages a uniform for the next draw. Undeclared names and shape
    /// mismatches are ignored; returns whether the value was written.
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) -> bool {
        self.uniforms.set(name, value.into())
    }

    /// Binds `texture` to the sampler named `name` for the next draw.
    ///
    /// `unit` is the caller's slot for the texture; the binding itself comes
    /// from the program, and a unit that disagrees with it is only traced.
    pub fn set_texture_uniform(&mut self, name: &str, texture: &GpuTexture, unit: u32) -> bool {
        self.bind_view(name, &texture.view, unit)
    }

    pub(crate) fn bind_view(&mut self, name: &str, view: &wgpu::TextureView, unit: u32) -> bool {
        let Some(binding) = self.reflection.texture_binding(name) else {
            log::trace!("program '{}' has no texture '{name}', ignored", self.label);
            return false;
        };
        if binding != unit {
            log::trace!(
                "program '{}' binds '{name}' at {binding}, caller used unit {unit}",
                self.label
            );
        }
        self.textures.insert(binding, view.clone());
        true
    }

    /// Forgets every texture bound so far.
    pub fn clear_textures(&mut self) {
        self.textures.clear();
    }

    /// Returns the pipeline for `format`, creating it on first use.
    pub fn ensure_pipeline(
        &mut self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> Result<&wgpu::RenderPipeline, ShaderError> {
        if !self.pipelines.contains_key(&format) {
            let pipeline = self.create_pipeline(device, format)?;
            self.pipelines.insert(format, pipeline);
        }
        self.pipelines.get(&format).ok_or_else(|| {
            ShaderError::new(&self.label, ShaderStage::Create, "pipeline cache miss")
        })
    }

    fn create_pipeline(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> Result<wgpu::RenderPipeline, ShaderError> {
        let quad_layout = [quad_vertex_layout()];
        let buffers: &[wgpu::VertexBufferLayout<'_>] = match self.descriptor.vertex_input {
            VertexInput::Quad => &quad_layout,
            VertexInput::Generated => &[],
        };

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{} pipeline ({format:?})", self.label)),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.module,
                entry_point: Some(VERTEX_ENTRY),
                buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.module,
                entry_point: Some(FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: self.descriptor.blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: self
                .descriptor
                .depth_format
                .map(|format| wgpu::DepthStencilState {
                    format,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        if let Some(error) = device.pop_error_scope().block_on() {
            return Err(ShaderError::new(
                &self.label,
                ShaderStage::Create,
                error.to_string(),
            ));
        }
        Ok(pipeline)
    }

    /// Uploads the staged uniforms and binds them with the bound textures.
    ///
    /// Texture slots nobody filled get the engine's placeholder.
    pub(crate) fn create_bind_group(&self, engine: &RenderEngine) -> wgpu::BindGroup {
        let uniform_buffer = self.uniforms.binding().map(|binding| {
            let buffer = engine
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} uniforms", self.label)),
                    contents: self.uniforms.bytes(),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
            (binding, buffer)
        });

        let mut entries = Vec::new();
        if let Some((binding, buffer)) = &uniform_buffer {
            entries.push(wgpu::BindGroupEntry {
                binding: *binding,
                resource: buffer.as_entire_binding(),
            });
        }
        if let Some(binding) = self.reflection.sampler {
            entries.push(wgpu::BindGroupEntry {
                binding,
                resource: wgpu::BindingResource::Sampler(&engine.sampler),
            });
        }
        for slot in &self.reflection.textures {
            let view = self.textures.get(&slot.binding).unwrap_or_else(|| {
                log::warn!(
                    "program '{}' draws without '{}', using placeholder",
                    self.label,
                    slot.name
                );
                &engine.placeholder.view
            });
            entries.push(wgpu::BindGroupEntry {
                binding: slot.binding,
                resource: wgpu::BindingResource::TextureView(view),
            });
        }

        engine.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} bind group", self.label)),
            layout: &self.bind_group_layout,
            entries: &entries,
        })
    }

    /// Sets pipeline and bindings on `pass`. Vertex buffers and draws are the caller's.
    pub(crate) fn bind(
        &mut self,
        engine: &RenderEngine,
        pass: &mut wgpu::RenderPass<'_>,
        format: wgpu::TextureFormat,
    ) -> Result<(), ShaderError> {
        let bind_group = self.create_bind_group(engine);
        let pipeline = self.ensure_pipeline(&engine.device, format)?;
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        Ok(())
    }
}

fn layout_entries(reflection: &BindingReflection) -> Vec<wgpu::BindGroupLayoutEntry> {
    let visibility = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
    let mut entries = Vec::new();
    if let Some(block) = &reflection.uniforms {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: block.binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(u64::from(block.size)),
            },
            count: None,
        });
    }
    if let Some(binding) = reflection.sampler {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
    }
    for slot in &reflection.textures {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: slot.binding,
            visibility,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = r"
struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(@location(0) position: vec2<f32>, @location(1) uv: vec2<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4<f32>(position, 0.0, 1.0);
    out.uv = uv;
    return out;
}
";

    const FRAGMENT: &str = r"
struct Params { u_time: f32 }
@group(0) @binding(0) var<uniform> params: Params;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.uv, params.u_time, 1.0);
}
";

    #[test]
    fn test_combines_stages() {
        let (source, reflection) = ShaderBuilder::new()
            .with_label("combined")
            .with_vertex(VERTEX)
            .with_fragment(FRAGMENT)
            .check()
            .unwrap();
        assert!(source.contains("vs_main") && source.contains("fs_main"));
        assert!(reflection.uniform("u_time").is_some());
    }

    #[test]
    fn test_identical_sources_used_once() {
        let single = format!("{VERTEX}\n{FRAGMENT}");
        let source = ShaderBuilder::new()
            .with_vertex(single.clone())
            .with_fragment(single.clone())
            .combined_source()
            .unwrap();
        assert_eq!(source, single);
    }

    #[test]
    fn test_missing_stage() {
        let err = ShaderBuilder::new()
            .with_label("half")
            .with_vertex(VERTEX)
            .combined_source()
            .unwrap_err();
        assert_eq!(err.program, "half");
        assert!(err.diagnostic.contains("fragment"));
    }

    #[test]
    fn test_parse_error_carries_diagnostic() {
        let err = ShaderBuilder::new()
            .with_label("broken")
            .with_vertex(VERTEX)
            .with_fragment("fn fs_main( -> {")
            .check()
            .unwrap_err();
        assert_eq!(err.stage, ShaderStage::Parse);
        assert!(!err.diagnostic.is_empty());
    }

    #[test]
    fn test_validation_error() {
        let bad = r"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let x: f32 = in.uv;
    return vec4<f32>(x);
}
";
        let err = ShaderBuilder::new()
            .with_vertex(VERTEX)
            .with_fragment(bad)
            .check()
            .unwrap_err();
        assert!(matches!(err.stage, ShaderStage::Parse | ShaderStage::Validate));
    }

    #[test]
    fn test_missing_entry_point() {
        let err = validate_source(
            "novs",
            "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }",
        )
        .unwrap_err();
        assert_eq!(err.stage, ShaderStage::Validate);
        assert!(err.diagnostic.contains("vs_main"));
    }
}
