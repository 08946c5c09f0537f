use std::path::Path;

use crate::error::RenderError;

/// Decoded 8-bit image.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Image {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// 1 (grey), 2 (grey + alpha), 3 (RGB) or 4 (RGBA).
    pub channels: u8,
}

impl Image {
    /// 1x1 RGBA image of a single color.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            pixels: rgba.to_vec(),
            width: 1,
            height: 1,
            channels: 4,
        }
    }

    /// Expands the pixels to RGBA8, the only 8-bit color layout textures accept.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let n = self.channels.max(1) as usize;
        let mut out = Vec::with_capacity((self.width * self.height * 4) as usize);
        for px in self.pixels.chunks_exact(n) {
            let rgba = match px {
                &[g] => [g, g, g, 255],
                &[g, a] => [g, g, g, a],
                &[r, g, b] => [r, g, b, 255],
                &[r, g, b, a] => [r, g, b, a],
                _ => [255, 0, 255, 255],
            };
            out.extend_from_slice(&rgba);
        }
        out
    }
}

/// Decodes an image file, optionally flipping it so the first row is the bottom one.
///
/// Deeper formats (16-bit, float) are converted to 8 bits per channel.
pub fn load_image(path: &Path, flip_vertically: bool) -> Result<Image, RenderError> {
    let img = image::open(path).map_err(|e| RenderError::TextureLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let img = if flip_vertically { img.flipv() } else { img };

    let (width, height) = (img.width(), img.height());
    let channels = img.color().channel_count();
    let pixels = match channels {
        1 => img.into_luma8().into_raw(),
        2 => img.into_luma_alpha8().into_raw(),
        3 => img.into_rgb8().into_raw(),
        _ => img.into_rgba8().into_raw(),
    };

    Ok(Image {
        pixels,
        width,
        height,
        channels: channels.min(4),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_expands_with_opaque_alpha() {
        let img = Image { pixels: vec![1, 2, 3, 4, 5, 6], width: 2, height: 1, channels: 3 };
        assert_eq!(img.to_rgba8(), vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    fn grey_alpha_expands() {
        let img = Image { pixels: vec![9, 100], width: 1, height: 1, channels: 2 };
        assert_eq!(img.to_rgba8(), vec![9, 9, 9, 100]);
    }

    #[test]
    fn missing_file_is_texture_error() {
        let err = load_image(Path::new("definitely/not/here.png"), true).unwrap_err();
        assert!(matches!(err, RenderError::TextureLoad { .. }));
    }

    #[test]
    fn decode_and_flip() {
        let dir = std::env::temp_dir().join(format!("prism-img-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("two_rows.png");

        // top row red, bottom row blue
        let mut buf = image::RgbImage::new(1, 2);
        buf.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        buf.put_pixel(0, 1, image::Rgb([0, 0, 255]));
        buf.save(&path).unwrap();

        let upright = load_image(&path, false).unwrap();
        assert_eq!((upright.width, upright.height, upright.channels), (1, 2, 3));
        assert_eq!(&upright.pixels[0..3], &[255, 0, 0]);

        let flipped = load_image(&path, true).unwrap();
        assert_eq!(&flipped.pixels[0..3], &[0, 0, 255]);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
