//! Built-in depth estimator.

use vhsdepth_core::{
    DepthEstimator, DepthMap, EstimationError, Progress, ProgressFn, ProgressStage, SourceImage,
};

/// Rec. 709 luma weights.
const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Treats brightness as nearness: bright pixels come forward.
///
/// Needs no model, so it is always available as the last fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct LuminanceDepthEstimator;

impl LuminanceDepthEstimator {
    /// Relative luminance of an RGBA8 pixel in `[0, 1]`.
    #[must_use]
    pub fn luma(pixel: [u8; 4]) -> f32 {
        (f32::from(pixel[0]) * LUMA[0] + f32::from(pixel[1]) * LUMA[1] + f32::from(pixel[2]) * LUMA[2])
            / 255.0
    }
}

impl DepthEstimator for LuminanceDepthEstimator {
    fn name(&self) -> &str {
        "luminance"
    }

    fn initialize(&mut self, progress: ProgressFn<'_>) -> Result<(), EstimationError> {
        progress(Progress::new(ProgressStage::Download, 100));
        Ok(())
    }

    fn estimate(
        &mut self,
        image: &SourceImage,
        progress: ProgressFn<'_>,
    ) -> Result<DepthMap, EstimationError> {
        let raw: Vec<f32> = image.pixels().map(Self::luma).collect();
        progress(Progress::new(ProgressStage::Inference, 50));
        let depth_map = DepthMap::from_raw(&raw, image.width(), image.height())?;
        progress(Progress::new(ProgressStage::Inference, 100));
        Ok(depth_map)
    }
}
