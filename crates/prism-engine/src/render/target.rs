use crate::error::RenderError;

use super::texture::{create_sampler, texture_bind_group, TextureFilter};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Checks a render target size against the device's texture limit.
pub fn validate_size(width: u32, height: u32, max_dimension: u32) -> Result<(), RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::FramebufferIncomplete(format!(
            "zero-sized attachment ({width}x{height})"
        )));
    }
    if width > max_dimension || height > max_dimension {
        return Err(RenderError::FramebufferIncomplete(format!(
            "{width}x{height} exceeds the device limit of {max_dimension}"
        )));
    }
    Ok(())
}

/// Depth attachment sized to a color target.
pub struct DepthBuffer {
    pub view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl DepthBuffer {
    pub fn new(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { view, width, height }
    }

    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

/// Color and depth textures the mesh pass renders into before compositing.
///
/// The color attachment uses the surface format so pipelines built for the
/// surface can draw here as well.
pub struct OffscreenTarget {
    pub color_view: wgpu::TextureView,
    pub depth: DepthBuffer,
    /// Samples `color_view` for the composite pass.
    pub bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

impl OffscreenTarget {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        texture_layout: &wgpu::BindGroupLayout,
    ) -> Result<Self, RenderError> {
        validate_size(width, height, device.limits().max_texture_dimension_2d)?;

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("prism offscreen color"),
            size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth = DepthBuffer::new(device, width, height, "prism offscreen depth");

        let sampler = create_sampler(device, TextureFilter::Linear);
        let bind_group = texture_bind_group(
            device,
            texture_layout,
            &color_view,
            &sampler,
            "prism offscreen composite",
        );

        log::debug!("offscreen target created: {width}x{height} {format:?}");

        Ok(Self { color_view, depth, bind_group, width, height })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_incomplete() {
        assert!(matches!(
            validate_size(0, 600, 8192),
            Err(RenderError::FramebufferIncomplete(_))
        ));
    }

    #[test]
    fn oversize_is_incomplete() {
        let err = validate_size(9000, 600, 8192).unwrap_err();
        assert!(err.to_string().contains("8192"));
    }

    #[test]
    fn regular_size_is_complete() {
        assert!(validate_size(1280, 720, 8192).is_ok());
    }
}
