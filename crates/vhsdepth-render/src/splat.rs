//! 3D point-splat renderer.
//!
//! Every depth texel becomes one instanced sprite; the vertex shader reads the
//! depth texture directly, so no point buffer exists on either side.

use vhsdepth_core::{EffectParameters, OrbitCamera, Vec2};

use crate::engine::{OutputTarget, RenderEngine};
use crate::error::RenderResult;
use crate::session::ImageSession;
use crate::shader::ShaderProgram;

/// Depth attachment format of the splat pass.
pub const SPLAT_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Texture unit of the depth map in the splat program.
const DEPTH_MAP_UNIT: u32 = 1;

struct DepthBuffer {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

/// Draws the loaded depth map as a point cloud under an orbit camera.
///
/// Owns the depth attachment, recreated whenever the output size changes.
#[derive(Default)]
pub struct SplatRenderer {
    depth_buffer: Option<DepthBuffer>,
    last_point_count: u32,
}

impl SplatRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Splats issued by the most recent frame.
    #[must_use]
    pub fn last_point_count(&self) -> u32 {
        self.last_point_count
    }

    /// Background derived from the glow color, scaled down.
    #[must_use]
    pub fn clear_color(params: &EffectParameters) -> wgpu::Color {
        let tint = params.background_tint();
        wgpu::Color {
            r: f64::from(tint.x),
            g: f64::from(tint.y),
            b: f64::from(tint.z),
            a: 1.0,
        }
    }

    fn ensure_depth_buffer(&mut self, engine: &RenderEngine, width: u32, height: u32) {
        if self
            .depth_buffer
            .as_ref()
            .is_some_and(|b| b.width == width && b.height == height)
        {
            return;
        }
        if let Some(old) = self.depth_buffer.take() {
            old.texture.destroy();
        }
        let texture = engine.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("splat depth buffer"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SPLAT_DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        log::debug!("splat depth buffer {width}x{height}");
        self.depth_buffer = Some(DepthBuffer {
            texture,
            view,
            width,
            height,
        });
    }

    /// Renders one frame of splats into `output`. Returns the point count drawn.
    #[allow(clippy::cast_precision_loss, clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        engine: &RenderEngine,
        program: &mut ShaderProgram,
        session: &ImageSession,
        camera: &OrbitCamera,
        params: &EffectParameters,
        time: f32,
        output: OutputTarget<'_>,
    ) -> RenderResult<u32> {
        self.ensure_depth_buffer(engine, output.width, output.height);
        let Some(depth_buffer) = &self.depth_buffer else {
            return Ok(0);
        };

        let depth_texture = session.depth_texture();
        let (image_w, image_h) = session.depth_size();
        program.clear_textures();
        program.set_texture_uniform("u_depthMap", depth_texture, DEPTH_MAP_UNIT);
        for (name, value) in params.uniform_values() {
            program.set_uniform(name, value);
        }
        program.set_uniform("u_viewMatrix", camera.view_matrix());
        program.set_uniform("u_projMatrix", camera.projection_matrix(output.aspect()));
        program.set_uniform("u_imageSize", Vec2::new(image_w as f32, image_h as f32));
        program.set_uniform(
            "u_resolution",
            Vec2::new(output.width as f32, output.height as f32),
        );
        program.set_uniform("u_time", time);

        let point_count = session.point_count();
        let mut encoder = engine.encoder("splat encoder");
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("splat pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: output.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(Self::clear_color(params)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_buffer.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            program.bind(engine, &mut render_pass, output.format)?;
            render_pass.draw(0..4, 0..point_count);
        }
        engine.submit(encoder);

        self.last_point_count = point_count;
        Ok(point_count)
    }

    /// Destroys the depth attachment.
    pub fn release(&mut self) {
        if let Some(buffer) = self.depth_buffer.take() {
            buffer.texture.destroy();
        }
    }
}
