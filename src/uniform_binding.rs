//! # Frame Uniform Binding
//!
//! This module owns the two per-frame uniform buffers and the bind group that exposes them to
//! every pipeline at `@group(0)`.
//!
//! ## Bindings
//!
//! | Binding | Contents | Visibility |
//! |---|---|---|
//! | 0 | [`TransformUniform`] | vertex, fragment |
//! | 1 | [`ViewportUniform`] | fragment |
//!
//! ## Update semantics
//!
//! Updates go through [`wgpu::Queue::write_buffer`], which stages the new bytes and applies them
//! ahead of the next submission. Each update overwrites the whole buffer: the old contents are
//! abandoned, and a GPU read from a frame already in flight never observes a partial write. The
//! buffers are never read back by the host.

use crate::error::{RenderError, RenderResult};
use crate::uniform_buffer::{TransformUniform, ViewportUniform};

/// Per-frame uniform buffers and their shared bind group.
pub struct FrameUniforms {
    transform_buffer: wgpu::Buffer,
    viewport_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl FrameUniforms {
    /// Creates both uniform buffers, zero-initialized, and the bind group that exposes them.
    pub fn new(device: &wgpu::Device) -> Self {
        let transform_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Transform Uniform Buffer"),
                contents: bytemuck::bytes_of(&TransformUniform::default()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        let viewport_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Viewport Uniform Buffer"),
                contents: bytemuck::bytes_of(&ViewportUniform::default()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<TransformUniform>() as u64,
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<ViewportUniform>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
            label: Some("frame_uniforms_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: transform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: viewport_buffer.as_entire_binding(),
                },
            ],
            label: Some("frame_uniforms_bind_group"),
        });

        Self {
            transform_buffer,
            viewport_buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Replaces the transform used by the next submission.
    pub fn update_transform(&self, queue: &wgpu::Queue, wvp: nalgebra_glm::Mat4) {
        queue.write_buffer(
            &self.transform_buffer,
            0,
            bytemuck::bytes_of(&TransformUniform { wvp }),
        );
    }

    /// Replaces the reciprocal viewport size used by the next submission.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::EmptyViewport`] if either dimension is zero; the buffer is left
    /// untouched.
    pub fn update_viewport_size(
        &self,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
    ) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyViewport { width, height });
        }
        queue.write_buffer(
            &self.viewport_buffer,
            0,
            bytemuck::bytes_of(&ViewportUniform::new(width, height)),
        );
        Ok(())
    }
}
