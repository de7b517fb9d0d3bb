//! Base texture creation from a pluggable pixel source.
//!
//! The renderer never generates pixels itself; anything that can produce an
//! RGBA8 image of a given size satisfies [`TextureSource`]. The procedural
//! checker pattern from the reference scene ships as the default impl.

use crate::error::{RenderError, RenderResult};

/// Produces an RGBA8 image for the shared base texture.
pub trait TextureSource {
    /// Image dimensions in pixels.
    fn size(&self) -> (u32, u32);

    /// Tightly packed RGBA8 pixels, row-major, `width * height * 4` bytes.
    fn pixels(&self) -> Vec<u8>;
}

/// The reference scene's procedural two-tone checker pattern.
#[derive(Debug, Clone)]
pub struct Checkerboard {
    /// Image width and height (square).
    pub size: u32,
    /// Checker cell size in pixels.
    pub cell: u32,
    /// RGB of the light cells.
    pub light: [u8; 3],
    /// RGB of the dark cells.
    pub dark: [u8; 3],
}

impl Default for Checkerboard {
    fn default() -> Self {
        Self {
            size: 256,
            cell: 32,
            light: [220, 220, 220],
            dark: [90, 90, 90],
        }
    }
}

impl TextureSource for Checkerboard {
    fn size(&self) -> (u32, u32) {
        (self.size, self.size)
    }

    fn pixels(&self) -> Vec<u8> {
        let cell = self.cell.max(1);
        let mut data = Vec::with_capacity((self.size * self.size * 4) as usize);
        for y in 0..self.size {
            for x in 0..self.size {
                let rgb = if ((x / cell) + (y / cell)) % 2 == 0 {
                    self.light
                } else {
                    self.dark
                };
                data.extend_from_slice(&rgb);
                data.push(255);
            }
        }
        data
    }
}

/// A base texture with its view and sampler, shared read-only by all
/// drawables.
pub struct BaseTexture {
    /// The GPU texture.
    pub texture: wgpu::Texture,
    /// Default view over the whole texture.
    pub view: wgpu::TextureView,
    /// Sampler with the filter/wrap modes given at creation.
    pub sampler: wgpu::Sampler,
}

impl BaseTexture {
    /// Uploads a [`TextureSource`] into an Rgba8UnormSrgb texture.
    ///
    /// # Errors
    /// [`RenderError::TextureCreationFailed`] when the source reports a zero
    /// dimension or returns the wrong number of bytes.
    pub fn from_source(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &dyn TextureSource,
        filter: wgpu::FilterMode,
        wrap: wgpu::AddressMode,
    ) -> RenderResult<Self> {
        let (width, height) = source.size();
        if width == 0 || height == 0 {
            return Err(RenderError::TextureCreationFailed(format!(
                "texture source reported zero dimension {width}x{height}"
            )));
        }

        let pixels = source.pixels();
        let expected = (width * height * 4) as usize;
        if pixels.len() != expected {
            return Err(RenderError::TextureCreationFailed(format!(
                "texture source produced {} bytes, expected {expected}",
                pixels.len()
            )));
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Base Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Base Texture Sampler"),
            address_mode_u: wrap,
            address_mode_v: wrap,
            mag_filter: filter,
            min_filter: filter,
            ..Default::default()
        });

        Ok(Self {
            texture,
            view,
            sampler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkerboard_pixel_count() {
        let board = Checkerboard {
            size: 8,
            cell: 2,
            ..Default::default()
        };
        assert_eq!(board.pixels().len(), 8 * 8 * 4);
    }

    #[test]
    fn test_checkerboard_alternates() {
        let board = Checkerboard {
            size: 4,
            cell: 1,
            light: [255, 255, 255],
            dark: [0, 0, 0],
        };
        let px = board.pixels();
        // (0,0) light, (1,0) dark
        assert_eq!(px[0], 255);
        assert_eq!(px[4], 0);
        // Row below starts dark
        assert_eq!(px[4 * 4], 0);
    }

    #[test]
    fn test_checkerboard_opaque_alpha() {
        let board = Checkerboard::default();
        let px = board.pixels();
        assert!(px.chunks_exact(4).all(|c| c[3] == 255));
    }
}
