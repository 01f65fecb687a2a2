//! Per-image GPU resources.

use vhsdepth_core::{splat, DepthMap, SourceImage};

use crate::compositor::{PassChain, PassOutput};
use crate::engine::{GpuTexture, RenderEngine, RenderTarget};
use crate::error::RenderResult;

/// Everything the GPU holds for one loaded image: the depth and image
/// textures plus one render target per intermediate pass.
///
/// Replacing a session must go through [`ImageSession::release`] so the
/// previous image's memory is returned at once.
#[derive(Debug)]
pub struct ImageSession {
    depth: GpuTexture,
    image: GpuTexture,
    /// Indexed by pass; `None` for passes that write the screen.
    targets: Vec<Option<RenderTarget>>,
}

impl ImageSession {
    /// Uploads both textures and creates the chain's targets at the image resolution.
    pub fn new(
        engine: &RenderEngine,
        image: &SourceImage,
        depth_map: &DepthMap,
        chain: &PassChain,
    ) -> RenderResult<Self> {
        let depth = engine.create_depth_texture(depth_map)?;
        let image_texture = match engine.create_image_texture(image) {
            Ok(texture) => texture,
            Err(e) => {
                depth.destroy();
                return Err(e);
            }
        };

        let mut targets = Vec::with_capacity(chain.passes().len());
        for pass in chain.passes() {
            let target = match pass.output {
                PassOutput::Target => {
                    match engine.create_render_target(image.width(), image.height()) {
                        Ok(target) => Some(target),
                        Err(e) => {
                            depth.destroy();
                            image_texture.destroy();
                            targets.iter().flatten().for_each(RenderTarget::destroy);
                            return Err(e.into());
                        }
                    }
                }
                PassOutput::Screen => None,
            };
            targets.push(target);
        }

        log::debug!(
            "image session {}x{} (depth {}x{}), {} render targets",
            image.width(),
            image.height(),
            depth_map.width(),
            depth_map.height(),
            targets.iter().flatten().count()
        );
        Ok(Self {
            depth,
            image: image_texture,
            targets,
        })
    }

    #[must_use]
    pub fn depth_texture(&self) -> &GpuTexture {
        &self.depth
    }

    #[must_use]
    pub fn image_texture(&self) -> &GpuTexture {
        &self.image
    }

    /// Render target written by pass `index`, if that pass writes one.
    #[must_use]
    pub fn target(&self, index: usize) -> Option<&RenderTarget> {
        self.targets.get(index).and_then(Option::as_ref)
    }

    pub fn targets(&self) -> impl Iterator<Item = &RenderTarget> {
        self.targets.iter().flatten()
    }

    #[must_use]
    pub fn image_size(&self) -> (u32, u32) {
        (self.image.width, self.image.height)
    }

    #[must_use]
    pub fn depth_size(&self) -> (u32, u32) {
        (self.depth.width, self.depth.height)
    }

    /// Splats drawn per frame: one per depth texel.
    #[must_use]
    pub fn point_count(&self) -> u32 {
        splat::point_count(self.depth.width, self.depth.height)
    }

    /// Destroys every texture the session owns.
    pub fn release(self) {
        self.depth.destroy();
        self.image.destroy();
        for target in self.targets.iter().flatten() {
            target.destroy();
        }
        log::debug!("released image session");
    }
}
