//! # Volume Data
//!
//! The renderer draws exactly one scalar field: a 256 x 256 x 256 grid of one-byte densities.
//!
//! ## Host layout
//!
//! Samples are stored x fastest, then y, then z, so the byte for voxel `(x, y, z)` lives at
//! `x + y * ROW_STRIDE + z * SLICE_STRIDE`. Raw CT exports in this shape (for example
//! `skull_256x256x256_uint8.raw`) can be loaded directly with [`Volume::load`].
//!
//! ## GPU layout
//!
//! [`VolumeTexture`] uploads the grid once into an `R8Unorm` 3-D texture with
//! `TEXTURE_BINDING` usage only. The ray-casting shader samples it with normalized coordinates
//! `object_position * 0.5 + 0.5`.

use std::path::Path;

use crate::error::{RenderError, RenderResult};

/// Voxels along each axis.
pub const VOLUME_DIMENSION: u32 = 256;

/// Bytes between two consecutive rows (`y` steps).
pub const ROW_STRIDE: usize = VOLUME_DIMENSION as usize;

/// Bytes between two consecutive slices (`z` steps).
pub const SLICE_STRIDE: usize = ROW_STRIDE * VOLUME_DIMENSION as usize;

/// Total number of voxels, and bytes, in a volume.
pub const VOLUME_LEN: usize = SLICE_STRIDE * VOLUME_DIMENSION as usize;

/// A 256³ grid of 8-bit densities held in host memory.
#[derive(Clone, PartialEq, Eq)]
pub struct Volume {
    data: Vec<u8>,
}

impl std::fmt::Debug for Volume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Volume")
            .field("dimension", &VOLUME_DIMENSION)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl Volume {
    /// Wraps a raw buffer of exactly [`VOLUME_LEN`] bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidVolume`] for any other length.
    pub fn from_bytes(data: Vec<u8>) -> RenderResult<Self> {
        if data.len() != VOLUME_LEN {
            return Err(RenderError::InvalidVolume {
                expected: VOLUME_LEN,
                actual: data.len(),
            });
        }
        Ok(Self { data })
    }

    /// Reads a raw volume file.
    pub fn load(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| RenderError::io(path, source))?;
        let volume = Self::from_bytes(data)?;
        log::info!("Loaded volume from {}", path.display());
        Ok(volume)
    }

    /// A volume where every voxel has density `0`.
    pub fn empty() -> Self {
        Self {
            data: vec![0; VOLUME_LEN],
        }
    }

    /// A solid sphere of `density` centered in the grid, everything else `0`.
    ///
    /// `radius` is measured in voxels from the grid center `(127.5, 127.5, 127.5)`.
    pub fn sphere(radius: f32, density: u8) -> Self {
        let center = (VOLUME_DIMENSION as f32 - 1.0) * 0.5;
        let radius_squared = radius * radius;
        let mut data = vec![0; VOLUME_LEN];
        for (index, voxel) in data.iter_mut().enumerate() {
            let x = (index % ROW_STRIDE) as f32 - center;
            let y = (index / ROW_STRIDE % ROW_STRIDE) as f32 - center;
            let z = (index / SLICE_STRIDE) as f32 - center;
            if x * x + y * y + z * z <= radius_squared {
                *voxel = density;
            }
        }
        Self { data }
    }

    /// The density at voxel `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate is `>= 256`.
    pub fn density(&self, x: u32, y: u32, z: u32) -> u8 {
        assert!(
            x < VOLUME_DIMENSION && y < VOLUME_DIMENSION && z < VOLUME_DIMENSION,
            "voxel ({x}, {y}, {z}) is outside the volume"
        );
        self.data[x as usize + y as usize * ROW_STRIDE + z as usize * SLICE_STRIDE]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// The volume uploaded to an immutable `R8Unorm` 3-D texture.
pub struct VolumeTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl VolumeTexture {
    /// Texel format of the volume texture.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;

    /// Uploads `volume` through `queue`. The texture is never written again.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, volume: &Volume) -> Self {
        let texture = wgpu::util::DeviceExt::create_texture_with_data(
            device,
            queue,
            &wgpu::TextureDescriptor {
                label: Some("Volume Texture"),
                size: wgpu::Extent3d {
                    width: VOLUME_DIMENSION,
                    height: VOLUME_DIMENSION,
                    depth_or_array_layers: VOLUME_DIMENSION,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D3,
                format: Self::FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            volume.as_bytes(),
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Volume Texture View"),
            dimension: Some(wgpu::TextureViewDimension::D3),
            ..Default::default()
        });

        log::debug!("Uploaded {VOLUME_DIMENSION}³ volume texture");
        Self { texture, view }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides_match_raw_layout() {
        assert_eq!(ROW_STRIDE, 256);
        assert_eq!(SLICE_STRIDE, 65_536);
        assert_eq!(VOLUME_LEN, 16_777_216);
    }

    #[test]
    fn rejects_wrong_length() {
        let error = Volume::from_bytes(vec![0; 1024]).unwrap_err();
        assert!(matches!(
            error,
            RenderError::InvalidVolume {
                expected: VOLUME_LEN,
                actual: 1024
            }
        ));
    }

    #[test]
    fn indexes_x_fastest() {
        let mut data = vec![0; VOLUME_LEN];
        data[1] = 10;
        data[ROW_STRIDE] = 20;
        data[SLICE_STRIDE] = 30;
        let volume = Volume::from_bytes(data).unwrap();
        assert_eq!(volume.density(1, 0, 0), 10);
        assert_eq!(volume.density(0, 1, 0), 20);
        assert_eq!(volume.density(0, 0, 1), 30);
    }

    #[test]
    fn sphere_is_centered_and_bounded() {
        let volume = Volume::sphere(40.0, 255);
        assert_eq!(volume.density(128, 128, 128), 255);
        assert_eq!(volume.density(127, 127, 127), 255);
        assert_eq!(volume.density(0, 0, 0), 0);
        assert_eq!(volume.density(255, 255, 255), 0);
        // Symmetric about the center along each axis.
        assert_eq!(volume.density(88, 128, 128), volume.density(167, 128, 128));
        assert_eq!(volume.density(128, 88, 128), volume.density(128, 167, 128));
        assert_eq!(volume.density(128, 128, 88), volume.density(128, 128, 167));
    }

    #[test]
    fn empty_volume_has_no_density() {
        assert!(Volume::empty().as_bytes().iter().all(|&density| density == 0));
    }

    #[test]
    fn load_reports_missing_file() {
        let error = Volume::load("/nonexistent/volume.raw").unwrap_err();
        assert!(matches!(error, RenderError::Io { .. }));
    }
}
