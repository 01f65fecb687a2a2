use pollster::FutureExt;

use super::{GpuTexture, RenderEngine};
use crate::error::ResourceError;

/// Color formats tried for render targets, best first.
///
/// Half-float keeps accumulated glow above 1.0; 8-bit is the fallback.
pub const TARGET_FORMAT_CANDIDATES: [wgpu::TextureFormat; 2] = [
    wgpu::TextureFormat::Rgba16Float,
    wgpu::TextureFormat::Rgba8Unorm,
];

/// An off-screen color target a later pass can sample.
#[derive(Debug)]
pub struct RenderTarget {
    pub texture: GpuTexture,
}

impl RenderTarget {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.texture.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.texture.height
    }

    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.texture.format
    }

    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.texture.view
    }

    /// Whether the target kept the preferred half-float format.
    #[must_use]
    pub fn is_half_float(&self) -> bool {
        self.texture.format == wgpu::TextureFormat::Rgba16Float
    }

    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

/// Runs `attempt` for each candidate format until one yields a complete target.
///
/// `attempt` reports incompleteness as `Err(reason)`. When every candidate
/// fails the reasons are joined into a [`ResourceError::IncompleteTarget`].
pub fn select_target_format<T>(
    width: u32,
    height: u32,
    mut attempt: impl FnMut(wgpu::TextureFormat) -> Result<T, String>,
) -> Result<T, ResourceError> {
    let mut reasons = Vec::new();
    for (i, &format) in TARGET_FORMAT_CANDIDATES.iter().enumerate() {
        match attempt(format) {
            Ok(target) => {
                if i > 0 {
                    log::warn!("render target falling back to {format:?}: {}", reasons.join("; "));
                }
                return Ok(target);
            }
            Err(reason) => reasons.push(format!("{format:?}: {reason}")),
        }
    }
    Err(ResourceError::IncompleteTarget {
        width,
        height,
        reason: reasons.join("; "),
    })
}

impl RenderEngine {
    /// Creates an off-screen render target, half-float if the device allows it.
    pub fn create_render_target(
        &self,
        width: u32,
        height: u32,
    ) -> Result<RenderTarget, ResourceError> {
        self.check_texture_size("render target", width, height)?;
        select_target_format(width, height, |format| {
            self.try_create_target(format, width, height)
        })
    }

    fn try_create_target(
        &self,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Result<RenderTarget, String> {
        let features = self.adapter.get_texture_format_features(format);
        let required = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
        if !features.allowed_usages.contains(required) {
            return Err("format cannot be both rendered to and sampled".to_string());
        }
        if !features
            .flags
            .contains(wgpu::TextureFormatFeatureFlags::FILTERABLE)
        {
            return Err("format is not filterable".to_string());
        }

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("pass render target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        if let Some(error) = self.device.pop_error_scope().block_on() {
            texture.destroy();
            return Err(error.to_string());
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(RenderTarget {
            texture: GpuTexture {
                texture,
                view,
                width,
                height,
                format,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_half_float() {
        let chosen = select_target_format(4, 4, Ok).unwrap();
        assert_eq!(chosen, wgpu::TextureFormat::Rgba16Float);
    }

    #[test]
    fn test_falls_back_to_eight_bit() {
        let mut tried = Vec::new();
        let chosen = select_target_format(4, 4, |format| {
            tried.push(format);
            if format == wgpu::TextureFormat::Rgba16Float {
                Err("incomplete".to_string())
            } else {
                Ok(format)
            }
        })
        .unwrap();
        assert_eq!(chosen, wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(tried, TARGET_FORMAT_CANDIDATES.to_vec());
    }

    #[test]
    fn test_all_incomplete_is_resource_error() {
        let err = select_target_format::<()>(8, 2, |_| Err("incomplete".to_string())).unwrap_err();
        match err {
            ResourceError::IncompleteTarget {
                width,
                height,
                reason,
            } => {
                assert_eq!((width, height), (8, 2));
                assert!(reason.contains("Rgba16Float"));
                assert!(reason.contains("Rgba8Unorm"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
