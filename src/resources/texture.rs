//! Texture loading and management
//!
//! Images are decoded to RGBA8 on the CPU. Mip chains are also built on the
//! CPU with a box filter and uploaded level by level, so the backend never
//! needs render-to-texture downsampling passes.

use crate::backend::traits::*;
use crate::backend::types::*;
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

/// Texture loading error type
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to load texture image: {0}")]
    Image(#[from] image::ImageError),
}

/// Loaded texture data (base level only, RGBA8)
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub data: Vec<u8>,
    pub name: String,
}

impl TextureData {
    /// Load texture from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let img = image::open(path)?;
        Ok(Self::from_image(img, &name))
    }

    /// Load texture from bytes
    pub fn from_bytes(bytes: &[u8], name: &str) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_image(img, name))
    }

    fn from_image(img: DynamicImage, name: &str) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            width,
            height,
            format: TextureFormat::Rgba8UnormSrgb,
            data: rgba.into_raw(),
            name: name.to_string(),
        }
    }

    /// Create a solid color texture
    pub fn solid_color(color: [u8; 4], name: &str) -> Self {
        Self {
            width: 1,
            height: 1,
            format: TextureFormat::Rgba8UnormSrgb,
            data: color.to_vec(),
            name: name.to_string(),
        }
    }

    /// Create a default white texture
    pub fn white() -> Self {
        Self::solid_color([255, 255, 255, 255], "white")
    }

    /// Create a checkerboard texture
    pub fn checkerboard(size: u32, color1: [u8; 4], color2: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity((size * size * 4) as usize);

        for y in 0..size {
            for x in 0..size {
                let is_even = ((x / 8) + (y / 8)) % 2 == 0;
                let color = if is_even { color1 } else { color2 };
                data.extend_from_slice(&color);
            }
        }

        Self {
            width: size,
            height: size,
            format: TextureFormat::Rgba8UnormSrgb,
            data,
            name: "checkerboard".to_string(),
        }
    }

    /// Number of mip levels in a full chain down to 1x1.
    pub fn full_mip_count(&self) -> u32 {
        32 - self.width.max(self.height).leading_zeros()
    }

    /// Build the full mip chain, base level included.
    ///
    /// Each level halves the previous one (clamped at 1) with a 2x2 box
    /// filter. Odd dimensions clamp the right/bottom taps to the edge.
    pub fn mip_chain(&self) -> Vec<MipLevel> {
        let mut levels = vec![MipLevel {
            width: self.width,
            height: self.height,
            data: self.data.clone(),
        }];

        while levels[levels.len() - 1].width > 1 || levels[levels.len() - 1].height > 1 {
            let prev = &levels[levels.len() - 1];
            levels.push(downsample(prev));
        }

        levels
    }
}

/// One level of a CPU-built mip chain
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

fn downsample(src: &MipLevel) -> MipLevel {
    let width = (src.width / 2).max(1);
    let height = (src.height / 2).max(1);
    let mut data = Vec::with_capacity((width * height * 4) as usize);

    let texel = |x: u32, y: u32, channel: u32| -> u32 {
        let x = x.min(src.width - 1);
        let y = y.min(src.height - 1);
        src.data[((y * src.width + x) * 4 + channel) as usize] as u32
    };

    for y in 0..height {
        for x in 0..width {
            for channel in 0..4 {
                let sum = texel(x * 2, y * 2, channel)
                    + texel(x * 2 + 1, y * 2, channel)
                    + texel(x * 2, y * 2 + 1, channel)
                    + texel(x * 2 + 1, y * 2 + 1, channel);
                data.push((sum / 4) as u8);
            }
        }
    }

    MipLevel {
        width,
        height,
        data,
    }
}

/// GPU texture with associated view
pub struct GpuTexture {
    pub handle: TextureHandle,
    pub view: TextureViewHandle,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub name: String,
}

impl GpuTexture {
    /// Create and upload texture to GPU.
    ///
    /// With `generate_mipmaps` set, the whole CPU-built chain is uploaded;
    /// otherwise only the base level exists.
    pub fn create<B: GraphicsBackend>(
        backend: &mut B,
        data: &TextureData,
        generate_mipmaps: bool,
    ) -> BackendResult<Self> {
        let mip_levels = if generate_mipmaps {
            data.full_mip_count()
        } else {
            1
        };

        let handle = backend.create_texture(&TextureDescriptor {
            label: Some(data.name.clone()),
            width: data.width,
            height: data.height,
            mip_levels,
            format: data.format,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        })?;
        let view = backend.create_texture_view(handle)?;

        if generate_mipmaps {
            for (level, mip) in data.mip_chain().into_iter().enumerate() {
                backend.write_texture(handle, level as u32, &mip.data, mip.width, mip.height);
            }
        } else {
            backend.write_texture(handle, 0, &data.data, data.width, data.height);
        }

        log::debug!(
            "Uploaded texture '{}' ({}x{}, {} mips)",
            data.name,
            data.width,
            data.height,
            mip_levels
        );

        Ok(Self {
            handle,
            view,
            width: data.width,
            height: data.height,
            format: data.format,
            name: data.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_color_is_one_texel() {
        let tex = TextureData::solid_color([10, 20, 30, 40], "tiny");
        assert_eq!(tex.width, 1);
        assert_eq!(tex.height, 1);
        assert_eq!(tex.data, vec![10, 20, 30, 40]);
    }

    #[test]
    fn checkerboard_has_expected_size_and_alternation() {
        let tex = TextureData::checkerboard(16, [255, 0, 0, 255], [0, 0, 255, 255]);
        assert_eq!(tex.data.len(), 16 * 16 * 4);
        // (0,0) is in the first 8x8 cell, (8,0) in the second
        assert_eq!(&tex.data[0..4], &[255, 0, 0, 255]);
        assert_eq!(&tex.data[8 * 4..8 * 4 + 4], &[0, 0, 255, 255]);
    }

    #[test]
    fn full_mip_count_covers_down_to_one_texel() {
        let tex = TextureData {
            width: 8,
            height: 8,
            format: TextureFormat::Rgba8UnormSrgb,
            data: vec![0; 8 * 8 * 4],
            name: "m".to_string(),
        };
        assert_eq!(tex.full_mip_count(), 4);
    }

    #[test]
    fn mip_chain_halves_dimensions_per_level() {
        let tex = TextureData {
            width: 4,
            height: 2,
            format: TextureFormat::Rgba8UnormSrgb,
            data: vec![128; 4 * 2 * 4],
            name: "m".to_string(),
        };
        let chain = tex.mip_chain();
        let dims: Vec<(u32, u32)> = chain.iter().map(|m| (m.width, m.height)).collect();
        assert_eq!(dims, vec![(4, 2), (2, 1), (1, 1)]);
    }

    #[test]
    fn box_filter_averages_four_texels() {
        let tex = TextureData {
            width: 2,
            height: 2,
            format: TextureFormat::Rgba8UnormSrgb,
            data: vec![
                0, 0, 0, 255, //
                100, 0, 0, 255, //
                0, 200, 0, 255, //
                100, 200, 0, 255,
            ],
            name: "m".to_string(),
        };
        let chain = tex.mip_chain();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[1].data, vec![50, 100, 0, 255]);
    }

    #[test]
    fn mip_chain_of_single_texel_is_just_the_base() {
        let tex = TextureData::white();
        let chain = tex.mip_chain();
        assert_eq!(chain.len(), 1);
        assert_eq!(tex.full_mip_count(), 1);
    }
}
