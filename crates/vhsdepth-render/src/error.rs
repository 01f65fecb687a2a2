//! Rendering error types.

use thiserror::Error;
use vhsdepth_core::ViewMode;

/// Where in program construction a [`ShaderError`] arose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// Fetching the source text.
    Load,
    /// WGSL parsing.
    Parse,
    /// Module validation (types, bindings, entry points).
    Validate,
    /// Device-side module or pipeline creation.
    Create,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ShaderStage::Load => "load",
            ShaderStage::Parse => "parse",
            ShaderStage::Validate => "validation",
            ShaderStage::Create => "creation",
        })
    }
}

/// A program failed to compile; fatal for that program only.
#[derive(Error, Debug, Clone)]
#[error("shader '{program}' failed at {stage}: {diagnostic}")]
pub struct ShaderError {
    /// Program label.
    pub program: String,
    pub stage: ShaderStage,
    /// Compiler diagnostic text.
    pub diagnostic: String,
}

impl ShaderError {
    pub fn new(program: impl Into<String>, stage: ShaderStage, diagnostic: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            stage,
            diagnostic: diagnostic.into(),
        }
    }
}

/// A GPU resource could not be created.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// No candidate color format produced a usable render target.
    #[error("render target {width}x{height} incomplete: {reason}")]
    IncompleteTarget {
        width: u32,
        height: u32,
        reason: String,
    },

    /// A dimension is zero.
    #[error("texture '{label}' has zero size")]
    ZeroSize { label: String },

    /// A dimension exceeds the device limit.
    #[error("texture '{label}' is {width}x{height}, device limit is {limit}")]
    TooLarge {
        label: String,
        width: u32,
        height: u32,
        limit: u32,
    },
}

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create surface.
    #[error("failed to create surface: {0}")]
    SurfaceCreationFailed(#[from] wgpu::CreateSurfaceError),

    /// The surface reports no usable format.
    #[error("surface configuration failed")]
    SurfaceConfigurationFailed,

    /// Shader compilation failed.
    #[error(transparent)]
    Shader(#[from] ShaderError),

    /// Resource creation failed.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// A frame was requested before any depth map was loaded.
    #[error("no depth map loaded; load an image before rendering")]
    NoDepthMap,

    /// The program a mode needs did not compile.
    #[error("view mode '{0}' is unavailable: its shader program failed to compile")]
    ModeUnavailable(ViewMode),

    /// A pass chain reads from a pass that has not run yet.
    #[error("invalid pass chain: {0}")]
    InvalidPassChain(String),

    /// Reading pixels back from the GPU failed.
    #[error("pixel readback failed: {0}")]
    ReadbackFailed(String),

    /// Out of memory.
    #[error("out of memory")]
    OutOfMemory,
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
