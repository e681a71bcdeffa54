//! # Uniform Buffers
//!
//! This module defines the plain-old-data structs that are copied into the two per-frame uniform
//! buffers shared by every render pass.
//!
//! ## Overview
//!
//! - [`TransformUniform`]: the world-view-projection matrix read by both vertex shaders.
//! - [`ViewportUniform`]: the reciprocal of the viewport size, read by the ray-casting fragment
//!   shader to turn `@builtin(position)` into texture coordinates for the position targets.
//!
//! ## Memory Layout and Traits
//!
//! Both structs are `#[repr(C)]` and derive `bytemuck::Pod` / `bytemuck::Zeroable`, so they can
//! be written to a `wgpu` buffer with `bytemuck::bytes_of`. Their sizes are multiples of 16 bytes
//! to satisfy uniform address space layout rules on every backend.
//!
//! ```ignore
//! let uniform = TransformUniform { wvp: nalgebra_glm::identity() };
//! queue.write_buffer(&buffer, 0, bytemuck::bytes_of(&uniform));
//! ```

/// The world-view-projection transform uploaded once per frame.
///
/// The matrix is stored column-major, which is what `mat4x4<f32>` in WGSL expects, so the shaders
/// compute `transform.wvp * vec4(position, 1.0)` without transposing.
#[repr(C)]
#[derive(Default, Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    /// Object space to clip space.
    pub wvp: nalgebra_glm::Mat4,
}

/// The reciprocal viewport size used by the ray-casting pass.
///
/// # Fields
///
/// - `inv_size`: `[1 / width, 1 / height]` of the viewport the ray-cast pass renders into.
/// - `_padding`: Pads the struct to 16 bytes.
#[repr(C)]
#[derive(Default, Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewportUniform {
    pub inv_size: [f32; 2],
    _padding: [f32; 2],
}

impl ViewportUniform {
    /// Builds the uniform for a `width` x `height` viewport.
    ///
    /// Both dimensions must be non-zero; [`crate::FrameUniforms::update_viewport_size`] checks
    /// this before calling.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            inv_size: [1.0 / width as f32, 1.0 / height as f32],
            _padding: [0.0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_are_uniform_aligned() {
        assert_eq!(std::mem::size_of::<TransformUniform>(), 64);
        assert_eq!(std::mem::size_of::<ViewportUniform>(), 16);
    }

    #[test]
    fn viewport_stores_reciprocals() {
        let uniform = ViewportUniform::new(1024, 720);
        assert_eq!(uniform.inv_size, [1.0 / 1024.0, 1.0 / 720.0]);
        assert_eq!(ViewportUniform::new(1, 1).inv_size, [1.0, 1.0]);
    }

    #[test]
    fn transform_bytes_are_column_major() {
        let mut wvp = nalgebra_glm::Mat4::identity();
        wvp[(0, 3)] = 7.0;
        let uniform = TransformUniform { wvp };
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&uniform));
        // Column 3, row 0.
        assert_eq!(floats[12], 7.0);
    }
}
