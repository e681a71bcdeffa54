//! # Scene Module
//!
//! The `Scene` holds the animated camera state of the volume view: how far the volume has
//! rotated, whether it is still rotating, and the camera parameters it is viewed with.
//!
//! ## Transform
//!
//! Each frame the scene produces the world-view-projection matrix uploaded to the transform
//! uniform:
//!
//! - **World**: spin by the current angle around the volume's `z` axis, then tip it by -90°
//!   around `x` (see [`crate::projection::world_rotation`]).
//! - **View**: push the volume `camera_distance` units in front of the camera.
//! - **Projection**: left-handed perspective for the backend's [`DepthConvention`].
//!
//! ## Animation
//!
//! [`Scene::advance`] adds `elapsed_ms / milliseconds_per_radian` to the angle unless the scene is
//! paused.

use crate::config::RendererConfig;
use crate::projection::{self, DepthConvention, ProjectionError};

/// Animated camera state for the volume view.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Current rotation around the volume's `z` axis, in radians.
    pub angle: f32,
    /// When set, [`Scene::advance`] leaves the angle alone.
    pub paused: bool,
    pub field_of_view: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub camera_distance: f32,
    pub milliseconds_per_radian: f32,
}

impl Scene {
    /// A scene at angle zero with the camera from `config`.
    pub fn new(config: &RendererConfig) -> Self {
        Self {
            angle: 0.0,
            paused: false,
            field_of_view: config.field_of_view,
            near_plane: config.near_plane,
            far_plane: config.far_plane,
            camera_distance: config.camera_distance,
            milliseconds_per_radian: config.milliseconds_per_radian,
        }
    }

    /// Advances the rotation by the wall time elapsed since the previous frame.
    pub fn advance(&mut self, delta_time: crate::Duration) {
        if self.paused || self.milliseconds_per_radian <= 0.0 {
            return;
        }
        let elapsed_ms = delta_time.as_secs_f32() * 1000.0;
        self.angle = (self.angle + elapsed_ms / self.milliseconds_per_radian) % std::f32::consts::TAU;
    }

    /// The world-view-projection matrix for a viewport of `aspect_ratio`.
    ///
    /// # Errors
    ///
    /// Returns the [`ProjectionError`] for invalid field of view, aspect ratio or clip planes.
    pub fn transform(
        &self,
        aspect_ratio: f32,
        convention: DepthConvention,
    ) -> Result<nalgebra_glm::Mat4, ProjectionError> {
        let projection = projection::perspective(
            self.field_of_view,
            aspect_ratio,
            self.near_plane,
            self.far_plane,
            convention,
        )?;
        Ok(projection::world_view_projection(
            &projection::world_rotation(self.angle),
            &projection::view_translation(self.camera_distance),
            &projection,
        ))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(&RendererConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Duration;

    #[test]
    fn advance_uses_milliseconds_per_radian() {
        let mut scene = Scene::default();
        scene.advance(Duration::from_millis(3000));
        assert!((scene.angle - 0.5).abs() < 1e-6);
    }

    #[test]
    fn paused_scene_keeps_its_angle() {
        let mut scene = Scene::default();
        scene.paused = true;
        scene.advance(Duration::from_secs(10));
        assert_eq!(scene.angle, 0.0);
    }

    #[test]
    fn angle_wraps_after_full_turn() {
        let mut scene = Scene::default();
        scene.advance(Duration::from_secs_f32(6.0 * std::f32::consts::TAU + 6.0));
        assert!((scene.angle - 1.0).abs() < 1e-3);
    }

    #[test]
    fn transform_rejects_invalid_camera() {
        let mut scene = Scene::default();
        scene.near_plane = 200.0;
        assert_eq!(
            scene.transform(1.0, DepthConvention::ZeroToOne),
            Err(ProjectionError::PlaneOrder {
                near: 200.0,
                far: 100.0
            })
        );
    }

    #[test]
    fn cube_stays_inside_depth_range() {
        let scene = Scene::default();
        let wvp = scene.transform(1024.0 / 720.0, DepthConvention::ZeroToOne).unwrap();
        for vertex in crate::CUBE_VERTICES {
            let [x, y, z] = vertex.position;
            let clip = wvp * nalgebra_glm::vec4(x, y, z, 1.0);
            let depth = clip.z / clip.w;
            assert!((0.0..=1.0).contains(&depth));
        }
    }
}
