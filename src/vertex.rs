//! # Vertex Module
//!
//! This module provides the `Vertex` struct and the fixed corner set of the cube that
//! every render pass draws. The cube spans `[-1, 1]` on each axis in object space; the
//! position-encoding passes write these coordinates straight into their color targets, so the
//! vertex carries nothing but a position.
//!
//! # Overview
//!
//! ## Structs
//!
//! - [`Vertex`]: A single cube corner in object space.
//!
//! ## Constants
//!
//! - [`CUBE_VERTICES`]: The 8 corners of the cube, indexed by [`crate::CUBE_INDICES`].
//!
//! ## Methods
//!
//! - [`Vertex::vertex_attributes`]: Returns the attribute layout consumed by both shader modules.
//! - [`Vertex::description`]: Returns the buffer layout for the vertex buffer slot.
//!
//! ## Usage
//!
//! ```ignore
//! let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
//!     label: Some("Cube Vertex Buffer"),
//!     contents: bytemuck::cast_slice(&CUBE_VERTICES),
//!     usage: wgpu::BufferUsages::VERTEX,
//! });
//! ```
//!
//! # GPU Compatibility
//!
//! The layout matches `@location(0) position: vec3<f32>` in `cube.wgsl` and `ray_casting.wgsl`.
//! Any change here must be mirrored in both shaders.

/// A single cube corner in object space.
///
/// The struct is `#[repr(C)]` and `Pod` so a slice of vertices can be uploaded with
/// `bytemuck::cast_slice` without copying.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position, each component `-1.0` or `1.0`.
    pub position: [f32; 3],
}

/// Implementation of the buffer layout helpers for [`Vertex`].
impl Vertex {
    /// Creates a vertex at `position`.
    pub const fn new(position: [f32; 3]) -> Self {
        Self { position }
    }

    /// Returns the vertex attributes of a [`Vertex`]: a single `Float32x3` position at
    /// shader location `0`.
    pub fn vertex_attributes() -> Vec<wgpu::VertexAttribute> {
        wgpu::vertex_attr_array![0 => Float32x3].to_vec()
    }

    /// Describes how a buffer of [`Vertex`] values is laid out for the vertex stage.
    ///
    /// # Parameters
    ///
    /// - `attributes`: The attribute list, usually [`Vertex::vertex_attributes`]. It is borrowed
    ///   so the returned layout can live inside a pipeline descriptor.
    pub fn description(attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }
}

/// The 8 corners of the unit cube.
///
/// Corner `i` has `x = bit 2`, `y = bit 1`, `z = bit 0` of `i`, mapped `0 -> -1.0` and
/// `1 -> 1.0`.
pub const CUBE_VERTICES: [Vertex; 8] = [
    Vertex::new([-1.0, -1.0, -1.0]),
    Vertex::new([-1.0, -1.0, 1.0]),
    Vertex::new([-1.0, 1.0, -1.0]),
    Vertex::new([-1.0, 1.0, 1.0]),
    Vertex::new([1.0, -1.0, -1.0]),
    Vertex::new([1.0, -1.0, 1.0]),
    Vertex::new([1.0, 1.0, -1.0]),
    Vertex::new([1.0, 1.0, 1.0]),
];
