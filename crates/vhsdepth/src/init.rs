//! Initialization and lifecycle for the vhsdepth viewer.

use std::path::Path;

use vhsdepth_core::{EstimatorContext, Options, Result};
use vhsdepth_render::ShaderSource;

use crate::estimator::LuminanceDepthEstimator;
use crate::image_source::FileImageSource;
use crate::loader::{prepare_image, report_status, Status};

/// Initializes `env_logger` with an `info` default, overridable through `RUST_LOG`.
///
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// The estimators tried in order when none is configured.
#[must_use]
pub fn default_estimators() -> EstimatorContext {
    EstimatorContext::new(vec![Box::new(LuminanceDepthEstimator)])
}

/// Loads `image_path`, estimates its depth and shows the viewer.
///
/// Blocks until the window is closed.
pub fn run(
    image_path: &Path,
    options: Options,
    shaders: Box<dyn ShaderSource>,
    estimators: &mut EstimatorContext,
) -> Result<()> {
    report_status(&Status::Initializing);
    let prepared = prepare_image(
        &FileImageSource::new(image_path),
        estimators,
        options.max_image_dimension,
    )
    .inspect_err(|e| report_status(&Status::Error(e.to_string())))?;
    crate::app::run_app(options, prepared, shaders)
}
