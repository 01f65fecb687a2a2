//! Headless rendering API for vhsdepth.
//!
//! Renders frames into an off-screen texture and returns the pixels, without
//! opening a window. Useful for integration tests and batch previews. Nothing
//! is written to disk; the buffer belongs to the caller.

use pollster::FutureExt;
use vhsdepth_core::{DepthMap, Options, Result, SourceImage, ViewMode, VhsDepthError};
use vhsdepth_render::{DepthEffectRenderer, RenderEngine, RenderError, ShaderSource};

pub(crate) fn render_error(e: RenderError) -> VhsDepthError {
    VhsDepthError::RenderError(e.to_string())
}

/// A renderer bound to a headless GPU device.
pub struct HeadlessRenderer {
    renderer: DepthEffectRenderer,
    width: u32,
    height: u32,
}

impl HeadlessRenderer {
    /// Creates a headless device and compiles every program.
    pub fn new(
        width: u32,
        height: u32,
        shaders: &dyn ShaderSource,
        options: &Options,
    ) -> Result<Self> {
        let engine = RenderEngine::new_headless(width, height)
            .block_on()
            .map_err(|e| {
                VhsDepthError::RenderError(format!("failed to create headless engine: {e}"))
            })?;
        let renderer = DepthEffectRenderer::new(engine, shaders, options).map_err(render_error)?;
        Ok(Self {
            renderer,
            width: width.max(1),
            height: height.max(1),
        })
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn load_image(&mut self, image: &SourceImage, depth_map: &DepthMap) -> Result<()> {
        self.renderer
            .load_image(image, depth_map)
            .map_err(render_error)
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> Result<()> {
        self.renderer.set_view_mode(mode).map_err(render_error)
    }

    /// Renders one frame at `time` and returns `width * height * 4` RGBA bytes.
    pub fn render(&mut self, time: f32) -> Result<Vec<u8>> {
        self.renderer.render_to_image(time).map_err(render_error)
    }

    #[must_use]
    pub fn renderer(&self) -> &DepthEffectRenderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut DepthEffectRenderer {
        &mut self.renderer
    }
}

/// Renders a single frame of `image` in `mode` to a raw RGBA pixel buffer.
///
/// # Example
/// ```no_run
/// use vhsdepth::*;
///
/// let image = SourceImage::solid(64, 32, [128, 128, 128, 255]).unwrap();
/// let depth = DepthMap::from_raw(&vec![0.5; 64 * 32], 64, 32).unwrap();
/// let pixels = render_to_image(&image, &depth, &Options::default(), ViewMode::Effect, 0.0, 64, 32).unwrap();
/// assert_eq!(pixels.len(), 64 * 32 * 4);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn render_to_image(
    image: &SourceImage,
    depth_map: &DepthMap,
    options: &Options,
    mode: ViewMode,
    time: f32,
    width: u32,
    height: u32,
) -> Result<Vec<u8>> {
    let mut headless = HeadlessRenderer::new(width, height, &vhsdepth_render::EmbeddedShaders, options)?;
    headless.load_image(image, depth_map)?;
    headless.set_view_mode(mode)?;
    headless.render(time)
}
