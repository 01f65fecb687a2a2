//! Interfaces to the collaborators that feed the renderer.
//!
//! Depth estimation and image acquisition live outside the rendering core.
//! They are consumed through the traits here and driven from an explicit,
//! caller-owned [`EstimatorContext`] rather than process-wide state.

use std::path::PathBuf;

use crate::depth_map::DepthMap;
use crate::error::{AcquisitionError, EstimationError};
use crate::image::SourceImage;

/// Which phase a progress report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    /// Fetching model weights.
    Download,
    /// Running inference on one image.
    Inference,
}

/// An observer notification; has no effect on results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub stage: ProgressStage,
    /// Percentage in `0..=100`.
    pub percent: u8,
}

impl Progress {
    #[must_use]
    pub fn new(stage: ProgressStage, percent: u8) -> Self {
        Self {
            stage,
            percent: percent.min(100),
        }
    }

    /// Builds a report from a byte count, as model downloads report it.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn from_bytes(stage: ProgressStage, loaded: u64, total: u64) -> Self {
        let percent = if total == 0 {
            0
        } else {
            ((loaded as f64 / total as f64) * 100.0).round().clamp(0.0, 100.0) as u8
        };
        Self::new(stage, percent)
    }
}

/// Observer callback for progress reports.
pub type ProgressFn<'a> = &'a mut dyn FnMut(Progress);

/// Produces a normalized depth map for an image.
pub trait DepthEstimator {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// One-time setup (model download, backend selection).
    fn initialize(&mut self, progress: ProgressFn<'_>) -> Result<(), EstimationError>;

    /// Estimates depth for `image`. The result is normalized to `[0, 1]`.
    fn estimate(
        &mut self,
        image: &SourceImage,
        progress: ProgressFn<'_>,
    ) -> Result<DepthMap, EstimationError>;
}

/// An acquired image plus an optional downscaled copy for estimation.
#[derive(Debug, Clone)]
pub struct AcquiredImage {
    pub image: SourceImage,
    /// Present when either dimension exceeded the requested maximum.
    pub resized: Option<SourceImage>,
    /// Where the image came from, if it was a file.
    pub origin: Option<PathBuf>,
}

impl AcquiredImage {
    /// The image to hand to the estimator: the resized copy when there is one.
    #[must_use]
    pub fn for_estimation(&self) -> &SourceImage {
        self.resized.as_ref().unwrap_or(&self.image)
    }
}

/// Yields an image and its dimensions.
pub trait ImageSource {
    fn acquire(&self, max_dimension: u32) -> Result<AcquiredImage, AcquisitionError>;
}

/// Caller-owned estimator state with a fallback chain.
///
/// Estimators are tried in order; the first that initializes is cached and
/// used for every later image.
pub struct EstimatorContext {
    candidates: Vec<Box<dyn DepthEstimator>>,
    active: Option<usize>,
}

impl EstimatorContext {
    #[must_use]
    pub fn new(candidates: Vec<Box<dyn DepthEstimator>>) -> Self {
        Self {
            candidates,
            active: None,
        }
    }

    /// Name of the initialized estimator, if any.
    #[must_use]
    pub fn active_name(&self) -> Option<&str> {
        self.active
            .and_then(|i| self.candidates.get(i))
            .map(|e| e.name())
    }

    /// Initializes the first estimator that succeeds. Cached after success.
    pub fn ensure_initialized(&mut self, progress: ProgressFn<'_>) -> Result<(), EstimationError> {
        if self.active.is_some() {
            return Ok(());
        }
        let mut failures = Vec::new();
        for (index, estimator) in self.candidates.iter_mut().enumerate() {
            match estimator.initialize(progress) {
                Ok(()) => {
                    log::info!("depth estimator '{}' ready", estimator.name());
                    self.active = Some(index);
                    return Ok(());
                }
                Err(e) => {
                    log::warn!(
                        "depth estimator '{}' unavailable, trying next: {e}",
                        estimator.name()
                    );
                    failures.push(format!("{}: {e}", estimator.name()));
                }
            }
        }
        if failures.is_empty() {
            failures.push("no estimators configured".to_string());
        }
        Err(EstimationError::Unavailable(failures.join("; ")))
    }

    /// Runs the active estimator, initializing it first if needed.
    pub fn estimate(
        &mut self,
        image: &SourceImage,
        progress: ProgressFn<'_>,
    ) -> Result<DepthMap, EstimationError> {
        self.ensure_initialized(progress)?;
        let index = self
            .active
            .ok_or_else(|| EstimationError::Unavailable("no active estimator".to_string()))?;
        let estimator = self
            .candidates
            .get_mut(index)
            .ok_or_else(|| EstimationError::Unavailable("no active estimator".to_string()))?;
        estimator.estimate(image, progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted {
        name: &'static str,
        init_ok: bool,
    }

    impl DepthEstimator for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        fn initialize(&mut self, progress: ProgressFn<'_>) -> Result<(), EstimationError> {
            progress(Progress::new(ProgressStage::Download, 100));
            if self.init_ok {
                Ok(())
            } else {
                Err(EstimationError::Failed("backend missing".into()))
            }
        }

        fn estimate(
            &mut self,
            image: &SourceImage,
            _progress: ProgressFn<'_>,
        ) -> Result<DepthMap, EstimationError> {
            let n = image.width() as usize * image.height() as usize;
            Ok(DepthMap::new(vec![0.5; n], image.width(), image.height())?)
        }
    }

    #[test]
    fn test_falls_back_to_next_estimator() {
        let mut ctx = EstimatorContext::new(vec![
            Box::new(Scripted {
                name: "gpu",
                init_ok: false,
            }),
            Box::new(Scripted {
                name: "cpu",
                init_ok: true,
            }),
        ]);
        let mut reports = Vec::new();
        ctx.ensure_initialized(&mut |p| reports.push(p)).unwrap();
        assert_eq!(ctx.active_name(), Some("cpu"));
        assert_eq!(reports.len(), 2);

        let image = SourceImage::solid(4, 2, [0, 0, 0, 255]).unwrap();
        let map = ctx.estimate(&image, &mut |_| {}).unwrap();
        assert_eq!((map.width(), map.height()), (4, 2));
    }

    #[test]
    fn test_all_failing_is_unavailable() {
        let mut ctx = EstimatorContext::new(vec![Box::new(Scripted {
            name: "gpu",
            init_ok: false,
        })]);
        let err = ctx.ensure_initialized(&mut |_| {}).unwrap_err();
        assert!(matches!(err, EstimationError::Unavailable(_)));
        assert!(EstimatorContext::new(Vec::new())
            .ensure_initialized(&mut |_| {})
            .is_err());
    }

    #[test]
    fn test_progress_from_bytes() {
        assert_eq!(
            Progress::from_bytes(ProgressStage::Download, 50, 200).percent,
            25
        );
        assert_eq!(Progress::from_bytes(ProgressStage::Download, 5, 0).percent, 0);
        assert_eq!(Progress::new(ProgressStage::Inference, 250).percent, 100);
    }
}
