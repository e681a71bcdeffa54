//! Shared helpers for the headless GPU tests.

#![allow(dead_code)]

use volume_raycaster::HeadlessGpu;

/// Format of the offscreen color target.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Opaque black, the clear color read back as bytes.
pub const CLEAR_PIXEL: [u8; 4] = [0, 0, 0, 255];

/// Returns a headless device, or `None` with a note on stderr when the machine has no adapter.
pub fn headless_gpu() -> Option<HeadlessGpu> {
    match pollster::block_on(HeadlessGpu::new_async()) {
        Ok(gpu) => Some(gpu),
        Err(error) => {
            eprintln!("Skipping headless test: no GPU adapter available ({error})");
            None
        }
    }
}

/// An offscreen color texture that can be rendered into and read back.
pub struct OffscreenTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl OffscreenTarget {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    pub fn frame(&self) -> volume_raycaster::FrameTarget<'_> {
        volume_raycaster::FrameTarget {
            view: &self.view,
            width: self.width,
            height: self.height,
        }
    }
}

/// Bytes per row rounded up to the copy alignment.
fn aligned_bytes_per_row(unpadded: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Copies a 2-D texture into a buffer and returns its rows without padding.
pub fn read_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    bytes_per_pixel: u32,
) -> Vec<u8> {
    let width = texture.width();
    let height = texture.height();
    let unpadded = width * bytes_per_pixel;
    let bytes_per_row = aligned_bytes_per_row(unpadded);

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Buffer"),
        size: u64::from(bytes_per_row * height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Readback Encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let buffer_slice = buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).unwrap();
    });
    device.poll(wgpu::Maintain::Wait);
    rx.recv().unwrap().unwrap();

    let data = buffer_slice.get_mapped_range();
    let mut pixels = Vec::with_capacity((unpadded * height) as usize);
    for row in 0..height {
        let start = (row * bytes_per_row) as usize;
        pixels.extend_from_slice(&data[start..start + unpadded as usize]);
    }
    drop(data);
    buffer.unmap();
    pixels
}

/// Reads an `Rgba8Unorm` texture as one `[r, g, b, a]` per pixel, row by row.
pub fn read_rgba8(device: &wgpu::Device, queue: &wgpu::Queue, texture: &wgpu::Texture) -> Vec<[u8; 4]> {
    read_texture(device, queue, texture, 4)
        .chunks_exact(4)
        .map(|px| [px[0], px[1], px[2], px[3]])
        .collect()
}

/// Reads a position target as one `[x, y, z, w]` per pixel, row by row. Handles both
/// `Rgba32Float` and `Rgba16Float` textures.
pub fn read_positions(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
) -> Vec<[f32; 4]> {
    match texture.format() {
        wgpu::TextureFormat::Rgba32Float => read_texture(device, queue, texture, 16)
            .chunks_exact(16)
            .map(|px| {
                let mut texel = [0.0f32; 4];
                for (value, bytes) in texel.iter_mut().zip(px.chunks_exact(4)) {
                    *value = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                }
                texel
            })
            .collect(),
        wgpu::TextureFormat::Rgba16Float => read_texture(device, queue, texture, 8)
            .chunks_exact(8)
            .map(|px| {
                let mut texel = [0.0f32; 4];
                for (value, bytes) in texel.iter_mut().zip(px.chunks_exact(2)) {
                    *value = half::f16::from_le_bytes([bytes[0], bytes[1]]).to_f32();
                }
                texel
            })
            .collect(),
        other => panic!("not a position target format: {other:?}"),
    }
}
