use vhsdepth_core::{DepthMap, SourceImage};

use super::RenderEngine;
use crate::error::{RenderResult, ResourceError};

/// Format of the encoded depth texture.
pub const DEPTH_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
/// Format of the uploaded source image. Bytes are sampled as stored.
pub const IMAGE_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// A 2D texture with its default view.
#[derive(Debug)]
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
}

impl GpuTexture {
    /// Releases the GPU memory now rather than when the last handle drops.
    pub fn destroy(&self) {
        self.texture.destroy();
    }

    pub(crate) fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("placeholder texture"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        write_rgba8(queue, &texture, &[0, 0, 0, 255], 1, 1);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width: 1,
            height: 1,
            format: wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

impl RenderEngine {
    /// Uploads a depth map as RGBA8, quantized depth replicated in R, G and B.
    pub fn create_depth_texture(&self, depth_map: &DepthMap) -> RenderResult<GpuTexture> {
        let texture = self.create_sampled_texture(
            "depth map texture",
            depth_map.width(),
            depth_map.height(),
            DEPTH_TEXTURE_FORMAT,
        )?;
        write_rgba8(
            &self.queue,
            &texture.texture,
            &depth_map.to_rgba8(),
            depth_map.width(),
            depth_map.height(),
        );
        log::debug!(
            "created depth texture {}x{}",
            depth_map.width(),
            depth_map.height()
        );
        Ok(texture)
    }

    /// Uploads the source image without any conversion.
    pub fn create_image_texture(&self, image: &SourceImage) -> RenderResult<GpuTexture> {
        let texture = self.create_sampled_texture(
            "source image texture",
            image.width(),
            image.height(),
            IMAGE_TEXTURE_FORMAT,
        )?;
        write_rgba8(
            &self.queue,
            &texture.texture,
            image.rgba(),
            image.width(),
            image.height(),
        );
        log::debug!("created image texture {}x{}", image.width(), image.height());
        Ok(texture)
    }

    /// Checks a requested size against the device limits.
    pub(crate) fn check_texture_size(
        &self,
        label: &str,
        width: u32,
        height: u32,
    ) -> Result<(), ResourceError> {
        if width == 0 || height == 0 {
            return Err(ResourceError::ZeroSize {
                label: label.to_string(),
            });
        }
        let limit = self.max_texture_dimension();
        if width > limit || height > limit {
            return Err(ResourceError::TooLarge {
                label: label.to_string(),
                width,
                height,
                limit,
            });
        }
        Ok(())
    }

    fn create_sampled_texture(
        &self,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> RenderResult<GpuTexture> {
        self.check_texture_size(label, width, height)?;
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(GpuTexture {
            texture,
            view,
            width,
            height,
            format,
        })
    }
}

fn write_rgba8(queue: &wgpu::Queue, texture: &wgpu::Texture, data: &[u8], width: u32, height: u32) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}
