//! # Projection and Camera Matrices
//!
//! Matrix helpers used to build the per-frame world-view-projection transform.
//!
//! All matrices follow the column-vector convention of `nalgebra_glm`: a point is
//! transformed as `m * v`, and matrices compose right to left. The transform that
//! reaches the GPU is therefore `proj * view * world`, which is the same matrix a
//! row-vector math library would produce with `transpose(world * view * proj)`.
//!
//! ## Depth conventions
//!
//! Graphics APIs disagree on the clip-space depth range. [`DepthConvention`]
//! selects the coefficients of the projection matrix:
//!
//! - [`DepthConvention::ZeroToOne`]: Direct3D, Metal, Vulkan and WebGPU style,
//!   the near plane maps to depth `0`.
//! - [`DepthConvention::NegOneToOne`]: OpenGL style, the near plane maps to `-1`.
//!
//! In both conventions the far plane maps to `1`. The projection is left-handed:
//! the camera looks down `+z` and `w` equals the view-space depth.

use thiserror::Error;

/// Clip-space depth range expected by the graphics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthConvention {
    /// Depth in `[0, 1]`.
    ZeroToOne,
    /// Depth in `[-1, 1]`.
    NegOneToOne,
}

impl DepthConvention {
    /// The convention a wgpu backend expects from vertex shaders.
    ///
    /// wgpu normalizes clip space across backends: even the GL backend takes
    /// `[0, 1]` depth and remaps it internally, so every backend reports
    /// [`DepthConvention::ZeroToOne`].
    pub fn for_backend(_backend: wgpu::Backend) -> Self {
        Self::ZeroToOne
    }
}

/// Rejected projection parameters.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ProjectionError {
    /// The vertical field of view is outside `(0, π)`.
    #[error("field of view must lie in (0, π) radians, got {0}")]
    FieldOfView(f32),

    /// The aspect ratio is not a positive finite number.
    #[error("aspect ratio must be positive and finite, got {0}")]
    AspectRatio(f32),

    /// The near plane distance is not positive.
    #[error("near plane distance must be positive, got {0}")]
    NearPlane(f32),

    /// The far plane distance is not positive.
    #[error("far plane distance must be positive, got {0}")]
    FarPlane(f32),

    /// The near plane is not closer than the far plane.
    #[error("near plane ({near}) must be closer than far plane ({far})")]
    PlaneOrder { near: f32, far: f32 },
}

/// Builds a left-handed perspective projection.
///
/// `field_of_view` is the vertical angle in radians and `aspect_ratio` is
/// width over height. Invalid parameters are rejected, never clamped.
///
/// # Errors
///
/// Returns a [`ProjectionError`] when `field_of_view` is not in `(0, π)`, the
/// aspect ratio is not positive, either plane distance is not positive, or
/// `near >= far`.
pub fn perspective(
    field_of_view: f32,
    aspect_ratio: f32,
    near: f32,
    far: f32,
    convention: DepthConvention,
) -> Result<nalgebra_glm::Mat4, ProjectionError> {
    // Negated comparisons also reject NaN.
    if !(field_of_view > 0.0 && field_of_view < std::f32::consts::PI) {
        return Err(ProjectionError::FieldOfView(field_of_view));
    }
    if !(aspect_ratio > 0.0 && aspect_ratio.is_finite()) {
        return Err(ProjectionError::AspectRatio(aspect_ratio));
    }
    if !(near > 0.0) {
        return Err(ProjectionError::NearPlane(near));
    }
    if !(far > 0.0) {
        return Err(ProjectionError::FarPlane(far));
    }
    if near >= far {
        return Err(ProjectionError::PlaneOrder { near, far });
    }

    let y_scale = 1.0 / (field_of_view * 0.5).tan();
    let x_scale = y_scale / aspect_ratio;
    let range = far - near;

    let (z_scale, z_offset) = match convention {
        DepthConvention::ZeroToOne => (far / range, -near * far / range),
        DepthConvention::NegOneToOne => ((far + near) / range, -2.0 * near * far / range),
    };

    #[rustfmt::skip]
    let projection = nalgebra_glm::Mat4::new(
        x_scale, 0.0,     0.0,     0.0,
        0.0,     y_scale, 0.0,     0.0,
        0.0,     0.0,     z_scale, z_offset,
        0.0,     0.0,     1.0,     0.0,
    );
    Ok(projection)
}

/// Object-to-world rotation: spin by `angle` around the volume's `z` axis, then
/// tip the volume over by -90° around `x` so its `z` axis points up the screen.
pub fn world_rotation(angle: f32) -> nalgebra_glm::Mat4 {
    let tip = nalgebra_glm::rotation(-std::f32::consts::FRAC_PI_2, &nalgebra_glm::Vec3::x());
    let spin = nalgebra_glm::rotation(angle, &nalgebra_glm::Vec3::z());
    tip * spin
}

/// World-to-view transform for a camera at the origin looking down `+z` at a
/// subject `distance` units away.
pub fn view_translation(distance: f32) -> nalgebra_glm::Mat4 {
    nalgebra_glm::translation(&nalgebra_glm::vec3(0.0, 0.0, distance))
}

/// Composes the matrix uploaded to the transform uniform.
pub fn world_view_projection(
    world: &nalgebra_glm::Mat4,
    view: &nalgebra_glm::Mat4,
    projection: &nalgebra_glm::Mat4,
) -> nalgebra_glm::Mat4 {
    projection * view * world
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::PI;

    fn clip_depth(projection: &nalgebra_glm::Mat4, view_z: f32) -> f32 {
        let clip = projection * nalgebra_glm::vec4(0.0, 0.0, view_z, 1.0);
        clip.z / clip.w
    }

    #[test]
    fn every_wgpu_backend_uses_zero_to_one_depth() {
        for backend in [
            wgpu::Backend::Vulkan,
            wgpu::Backend::Metal,
            wgpu::Backend::Dx12,
            wgpu::Backend::Gl,
            wgpu::Backend::BrowserWebGpu,
        ] {
            assert_eq!(DepthConvention::for_backend(backend), DepthConvention::ZeroToOne);
        }
    }

    #[test]
    fn zero_to_one_maps_near_and_far_planes() {
        let projection = perspective(PI / 5.0, 1.5, 0.01, 100.0, DepthConvention::ZeroToOne).unwrap();
        assert!(clip_depth(&projection, 0.01).abs() < 1e-5);
        assert!((clip_depth(&projection, 100.0) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn neg_one_to_one_maps_near_and_far_planes() {
        let projection = perspective(PI / 5.0, 1.5, 0.01, 100.0, DepthConvention::NegOneToOne).unwrap();
        assert!((clip_depth(&projection, 0.01) + 1.0).abs() < 1e-4);
        assert!((clip_depth(&projection, 100.0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn w_carries_view_depth() {
        let projection = perspective(PI / 4.0, 1.0, 0.1, 10.0, DepthConvention::ZeroToOne).unwrap();
        let clip = projection * nalgebra_glm::vec4(0.3, -0.2, 4.0, 1.0);
        assert_eq!(clip.w, 4.0);
    }

    #[test]
    fn rejects_each_invalid_parameter() {
        let convention = DepthConvention::ZeroToOne;
        assert_eq!(
            perspective(0.0, 1.0, 0.1, 10.0, convention),
            Err(ProjectionError::FieldOfView(0.0))
        );
        assert_eq!(
            perspective(-0.5, 1.0, 0.1, 10.0, convention),
            Err(ProjectionError::FieldOfView(-0.5))
        );
        assert_eq!(
            perspective(PI, 1.0, 0.1, 10.0, convention),
            Err(ProjectionError::FieldOfView(PI))
        );
        assert_eq!(
            perspective(1.0, 1.0, 0.0, 10.0, convention),
            Err(ProjectionError::NearPlane(0.0))
        );
        assert_eq!(
            perspective(1.0, 1.0, -1.0, 10.0, convention),
            Err(ProjectionError::NearPlane(-1.0))
        );
        assert_eq!(
            perspective(1.0, 1.0, 0.1, 0.0, convention),
            Err(ProjectionError::FarPlane(0.0))
        );
        assert_eq!(
            perspective(1.0, 1.0, 10.0, 10.0, convention),
            Err(ProjectionError::PlaneOrder { near: 10.0, far: 10.0 })
        );
        assert_eq!(
            perspective(1.0, 1.0, 20.0, 10.0, convention),
            Err(ProjectionError::PlaneOrder { near: 20.0, far: 10.0 })
        );
        assert_eq!(
            perspective(1.0, 0.0, 0.1, 10.0, convention),
            Err(ProjectionError::AspectRatio(0.0))
        );
    }

    #[test]
    fn rejects_nan_field_of_view() {
        assert!(matches!(
            perspective(f32::NAN, 1.0, 0.1, 10.0, DepthConvention::ZeroToOne),
            Err(ProjectionError::FieldOfView(_))
        ));
    }

    #[test]
    fn world_rotation_at_zero_tips_z_axis_up() {
        let world = world_rotation(0.0);
        let up = world * nalgebra_glm::vec4(0.0, 0.0, 1.0, 0.0);
        assert!(up.x.abs() < 1e-6);
        assert!((up.y - 1.0).abs() < 1e-6);
        assert!(up.z.abs() < 1e-6);
    }

    #[test]
    fn view_moves_origin_in_front_of_camera() {
        let view = view_translation(5.0);
        let origin = view * nalgebra_glm::vec4(0.0, 0.0, 0.0, 1.0);
        assert_eq!(origin, nalgebra_glm::vec4(0.0, 0.0, 5.0, 1.0));
    }

    #[test]
    fn cube_center_projects_to_screen_center() {
        let projection = perspective(PI / 5.0, 1.0, 0.01, 100.0, DepthConvention::ZeroToOne).unwrap();
        let wvp = world_view_projection(&world_rotation(0.7), &view_translation(5.0), &projection);
        let clip = wvp * nalgebra_glm::vec4(0.0, 0.0, 0.0, 1.0);
        assert!(clip.x.abs() < 1e-5);
        assert!(clip.y.abs() < 1e-5);
        assert!(clip.z / clip.w > 0.0 && clip.z / clip.w < 1.0);
    }

    proptest! {
        #[test]
        fn valid_parameters_produce_invertible_projection(
            field_of_view in 0.05f32..3.0,
            aspect_ratio in 0.1f32..10.0,
            near in 0.01f32..10.0,
            depth_range in 0.5f32..500.0,
        ) {
            let far = near + depth_range;
            for convention in [DepthConvention::ZeroToOne, DepthConvention::NegOneToOne] {
                let projection = perspective(field_of_view, aspect_ratio, near, far, convention).unwrap();
                prop_assert!(projection.try_inverse().is_some());

                let expected_near = match convention {
                    DepthConvention::ZeroToOne => 0.0,
                    DepthConvention::NegOneToOne => -1.0,
                };
                prop_assert!((clip_depth(&projection, near) - expected_near).abs() < 1e-3);
                prop_assert!((clip_depth(&projection, far) - 1.0).abs() < 1e-3);
            }
        }

        #[test]
        fn out_of_range_field_of_view_is_rejected(field_of_view in prop_oneof![-10.0f32..=0.0, PI..10.0]) {
            prop_assert_eq!(
                perspective(field_of_view, 1.0, 0.1, 10.0, DepthConvention::ZeroToOne),
                Err(ProjectionError::FieldOfView(field_of_view))
            );
        }
    }
}
