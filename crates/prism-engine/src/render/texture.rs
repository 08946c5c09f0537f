use std::path::{Path, PathBuf};

use crate::assets::{load_image, Image};

/// Index into a [`TextureStore`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureId(pub usize);

/// Sampling filter for minification and magnification.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum TextureFilter {
    #[default]
    Linear,
    /// Keeps texels sharp; used for low-resolution textures.
    Nearest,
}

impl From<TextureFilter> for wgpu::FilterMode {
    fn from(f: TextureFilter) -> Self {
        match f {
            TextureFilter::Linear => wgpu::FilterMode::Linear,
            TextureFilter::Nearest => wgpu::FilterMode::Nearest,
        }
    }
}

/// A sampled 2D texture, ready to bind.
#[derive(Debug)]
pub struct Texture {
    pub path: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    pub texture: wgpu::Texture,
    pub bind_group: wgpu::BindGroup,
}

/// Colors of the built-in 1x1 textures.
pub const WHITE: [u8; 4] = [255, 255, 255, 255];
pub const BLACK: [u8; 4] = [0, 0, 0, 255];
pub const FLAT_NORMAL: [u8; 4] = [128, 128, 255, 255];
pub const MAGENTA: [u8; 4] = [255, 0, 255, 255];

/// Bind group layout shared by every textured program: texture at 0, sampler at 1.
pub fn texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("prism texture bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Clamp-to-edge sampler with the given filter.
pub fn create_sampler(device: &wgpu::Device, filter: TextureFilter) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("prism sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filter.into(),
        min_filter: filter.into(),
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}

pub fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

/// Owns every loaded texture. Loads are deduplicated by path.
pub struct TextureStore {
    layout: wgpu::BindGroupLayout,
    textures: Vec<Texture>,
    pub white: TextureId,
    pub black: TextureId,
    pub flat_normal: TextureId,
    pub magenta: TextureId,
}

impl TextureStore {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let layout = texture_bind_group_layout(device);
        let mut textures = Vec::new();

        let mut solid = |rgba: [u8; 4], label: &str, format: wgpu::TextureFormat| {
            let tex = upload(device, queue, &layout, &Image::solid(rgba), TextureFilter::Nearest, label, format, None);
            textures.push(tex);
            TextureId(textures.len() - 1)
        };

        let white = solid(WHITE, "white", wgpu::TextureFormat::Rgba8UnormSrgb);
        let black = solid(BLACK, "black", wgpu::TextureFormat::Rgba8UnormSrgb);
        let flat_normal = solid(FLAT_NORMAL, "flat normal", wgpu::TextureFormat::Rgba8Unorm);
        let magenta = solid(MAGENTA, "magenta", wgpu::TextureFormat::Rgba8UnormSrgb);

        Self {
            layout,
            textures,
            white,
            black,
            flat_normal,
            magenta,
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Loads a color texture, or returns the existing id if `path` was loaded before.
    ///
    /// Decoding failures are logged and yield `None`.
    pub fn load(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        filter: TextureFilter,
    ) -> Option<TextureId> {
        if let Some(id) = self.find(path) {
            return Some(id);
        }

        let image = match load_image(path, true) {
            Ok(img) => img,
            Err(e) => {
                log::error!("{e}");
                return None;
            }
        };

        let label = path.display().to_string();
        let tex = upload(
            device,
            queue,
            &self.layout,
            &image,
            filter,
            &label,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            Some(path.to_path_buf()),
        );
        log::debug!("texture {label}: {}x{} ({} channels)", tex.width, tex.height, image.channels);

        self.textures.push(tex);
        Some(TextureId(self.textures.len() - 1))
    }

    pub fn find(&self, path: &Path) -> Option<TextureId> {
        self.textures
            .iter()
            .position(|t| t.path.as_deref() == Some(path))
            .map(TextureId)
    }

    pub fn get(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id.0)
    }

    pub fn bind_group(&self, id: TextureId) -> Option<&wgpu::BindGroup> {
        self.get(id).map(|t| &t.bind_group)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[allow(clippy::too_many_arguments)]
fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    image: &Image,
    filter: TextureFilter,
    label: &str,
    format: wgpu::TextureFormat,
    path: Option<PathBuf>,
) -> Texture {
    let size = wgpu::Extent3d {
        width: image.width.max(1),
        height: image.height.max(1),
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    let rgba = image.to_rgba8();
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(size.width * 4),
            rows_per_image: Some(size.height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = create_sampler(device, filter);
    let bind_group = texture_bind_group(device, layout, &view, &sampler, label);

    Texture {
        path,
        width: size.width,
        height: size.height,
        texture,
        bind_group,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_maps_to_wgpu() {
        assert_eq!(wgpu::FilterMode::from(TextureFilter::Nearest), wgpu::FilterMode::Nearest);
        assert_eq!(wgpu::FilterMode::from(TextureFilter::default()), wgpu::FilterMode::Linear);
    }

    #[test]
    fn flat_normal_points_up() {
        // (0.5, 0.5, 1.0) once decoded from unorm
        assert_eq!(FLAT_NORMAL[2], 255);
        assert_eq!(FLAT_NORMAL[0], FLAT_NORMAL[1]);
    }
}
