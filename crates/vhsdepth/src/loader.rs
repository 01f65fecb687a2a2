//! Per-image preparation: acquire, estimate depth, report status.

use std::fmt;

use vhsdepth_core::{
    DepthMap, EstimatorContext, ImageSource, Progress, ProgressStage, Result, SourceImage,
};

/// Application status, reported through the log as it changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Initializing,
    LoadingImage,
    GeneratingDepth,
    Rendering,
    Error(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Initializing => f.write_str("Initializing"),
            Status::LoadingImage => f.write_str("Loading image"),
            Status::GeneratingDepth => f.write_str("Generating depth map"),
            Status::Rendering => f.write_str("Rendering"),
            Status::Error(msg) => write!(f, "Error: {msg}"),
        }
    }
}

/// Logs a status transition.
pub fn report_status(status: &Status) {
    match status {
        Status::Error(_) => log::error!("{status}"),
        _ => log::info!("{status}"),
    }
}

/// An image with its depth map, ready to upload.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub image: SourceImage,
    pub depth_map: DepthMap,
}

fn log_progress(progress: Progress) {
    let stage = match progress.stage {
        ProgressStage::Download => "model download",
        ProgressStage::Inference => "inference",
    };
    log::debug!("{stage}: {}%", progress.percent);
}

/// Acquires an image and estimates its depth.
///
/// Depth is estimated on the resized variant when acquisition produced one;
/// the full-resolution image is kept for display.
pub fn prepare_image(
    source: &dyn ImageSource,
    estimators: &mut EstimatorContext,
    max_dimension: u32,
) -> Result<PreparedImage> {
    report_status(&Status::LoadingImage);
    let acquired = source.acquire(max_dimension)?;
    if let Some(origin) = &acquired.origin {
        log::info!(
            "loaded {} ({}x{})",
            origin.display(),
            acquired.image.width(),
            acquired.image.height()
        );
    }

    report_status(&Status::GeneratingDepth);
    let depth_map = estimators.estimate(acquired.for_estimation(), &mut log_progress)?;
    log::info!(
        "depth map {}x{} from '{}'",
        depth_map.width(),
        depth_map.height(),
        estimators.active_name().unwrap_or("unknown")
    );

    Ok(PreparedImage {
        image: acquired.image,
        depth_map,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(Status::GeneratingDepth.to_string(), "Generating depth map");
        assert_eq!(
            Status::Error("no adapter".into()).to_string(),
            "Error: no adapter"
        );
    }
}
