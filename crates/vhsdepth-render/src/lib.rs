//! Rendering backend for vhsdepth.
//!
//! This crate provides the wgpu-based rendering engine, including:
//! - GPU resource management (textures, render targets with format fallback, readback)
//! - WGSL programs validated and reflected with naga, and the uniform bridge
//! - The 2D pass compositor and the 3D point-splat renderer
//! - [`DepthEffectRenderer`], which owns the per-image session and dispatches by view mode

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod compositor;
pub mod engine;
pub mod error;
pub mod quad;
pub mod renderer;
pub mod session;
pub mod shader;
pub mod shaders;
pub mod splat;
pub mod uniforms;

pub use compositor::{Compositor, FrameUniforms, PassChain, PassInput, PassOutput, PassSpec};
pub use engine::{
    select_target_format, GpuTexture, OffscreenTarget, OutputTarget, RenderEngine, RenderTarget,
    DEPTH_TEXTURE_FORMAT, IMAGE_TEXTURE_FORMAT, TARGET_FORMAT_CANDIDATES,
};
pub use error::{RenderError, RenderResult, ResourceError, ShaderError, ShaderStage};
pub use quad::{FullscreenQuad, QuadVertex};
pub use renderer::DepthEffectRenderer;
pub use session::ImageSession;
pub use shader::{ProgramDescriptor, ShaderBuilder, ShaderProgram, VertexInput};
pub use shaders::{EmbeddedShaders, PassName, ProgramSource, ShaderSource};
pub use splat::{SplatRenderer, SPLAT_DEPTH_FORMAT};
pub use uniforms::{BindingReflection, UniformBlock, UniformKind};
