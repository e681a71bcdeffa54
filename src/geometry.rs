//! # Cube Geometry
//!
//! Immutable GPU buffers for the unit cube. All three passes of a frame draw from the same pair of
//! buffers; only the pipeline and the render target change between them.

use crate::vertex::CUBE_VERTICES;
use crate::CUBE_INDICES;

/// Vertex and index buffers for the unit cube.
///
/// The buffers are created with `VERTEX` / `INDEX` usage only, so there is no way to write to them
/// after construction.
pub struct CubeGeometry {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
}

impl CubeGeometry {
    /// Uploads [`CUBE_VERTICES`] and [`CUBE_INDICES`].
    pub fn new(device: &wgpu::Device) -> Self {
        let vertex_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Cube Vertex Buffer"),
                contents: bytemuck::cast_slice(&CUBE_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );

        let index_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Cube Index Buffer"),
                contents: bytemuck::cast_slice(&CUBE_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            },
        );

        Self {
            vertex_buffer,
            index_buffer,
        }
    }

    /// Binds the cube buffers and draws all 36 indices with whatever pipeline is currently set.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..(CUBE_INDICES.len() as u32), 0, 0..1);
    }
}
