//! Core model for vhsdepth.
//!
//! This crate holds everything about the depth effect that does not touch the GPU:
//! - [`DepthMap`] normalization and its 8-bit texture encoding
//! - [`EffectParameters`] with documented ranges, and typed [`UniformValue`]s
//! - The [`OrbitCamera`] and pointer-driven [`OrbitControls`] of the splat view
//! - The render-loop [`Scheduler`] and the [`FramePacer`] hosts implement
//! - Collaborator traits for depth estimation and image acquisition
//! - Configuration [`Options`]

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod camera;
pub mod collaborator;
pub mod contour;
pub mod controls;
pub mod depth_map;
pub mod error;
pub mod image;
pub mod options;
pub mod params;
pub mod scheduler;
pub mod splat;
pub mod uniform;
pub mod view_mode;

pub use camera::OrbitCamera;
pub use collaborator::{
    AcquiredImage, DepthEstimator, EstimatorContext, ImageSource, Progress, ProgressFn,
    ProgressStage,
};
pub use controls::{OrbitControls, PointerButton, PointerEvent};
pub use depth_map::{dequantize, normalize, quantize, DepthMap};
pub use error::{AcquisitionError, DepthMapError, EstimationError, Result, VhsDepthError};
pub use image::SourceImage;
pub use options::{fit_surface_size, CompositorLayout, Options};
pub use params::{EffectParameters, ParamId, ParamRange};
pub use scheduler::{FramePacer, FrameTick, FrameToken, Scheduler};
pub use uniform::UniformValue;
pub use view_mode::ViewMode;

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
