//! # Configuration
//!
//! Application settings, read from an optional JSON file. Every field has a default, and a file
//! only needs to name the fields it changes:
//!
//! ```json
//! {
//!     "renderer": { "camera_distance": 4.0 },
//!     "volume_path": "assets/skull_256x256x256_uint8.raw"
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::error::{RenderError, RenderResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub renderer: RendererConfig,
    pub logging: LoggingConfig,
    /// Raw 256³ volume to render. A synthetic sphere is used when unset.
    pub volume_path: Option<PathBuf>,
    /// Directory holding `cube.wgsl` and `ray_casting.wgsl`. The built-in shaders are used when
    /// unset.
    pub shader_dir: Option<PathBuf>,
}

impl Config {
    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RenderError::io(path, source))?;
        serde_json::from_str(&text).map_err(|source| RenderError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Main window settings.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Volume renderer".to_owned(),
            width: 1024,
            height: 720,
            min_width: 200,
            min_height: 200,
        }
    }
}

/// Camera and animation parameters.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Vertical field of view in radians.
    pub field_of_view: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    /// Distance from the camera to the center of the volume.
    pub camera_distance: f32,
    /// Milliseconds of wall time per radian of rotation.
    pub milliseconds_per_radian: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            field_of_view: std::f32::consts::PI / 5.0,
            near_plane: 0.01,
            far_plane: 100.0,
            camera_distance: 5.0,
            milliseconds_per_radian: 6000.0,
        }
    }
}

/// Logger settings.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `env_logger` filter, e.g. `"info"` or `"volume_raycaster=debug,wgpu=warn"`. Falls back to
    /// `RUST_LOG`, then `info`.
    pub filter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_camera() {
        let config = RendererConfig::default();
        assert_eq!(config.field_of_view, std::f32::consts::PI / 5.0);
        assert_eq!(config.near_plane, 0.01);
        assert_eq!(config.far_plane, 100.0);
        assert_eq!(config.camera_distance, 5.0);
        assert_eq!(config.milliseconds_per_radian, 6000.0);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "renderer": { "camera_distance": 4.0 }, "window": { "title": "CT" } }"#)
                .unwrap();
        assert_eq!(config.renderer.camera_distance, 4.0);
        assert_eq!(config.renderer.milliseconds_per_radian, 6000.0);
        assert_eq!(config.window.title, "CT");
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.volume_path, None);
    }

    #[test]
    fn empty_json_is_default() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let path = std::env::temp_dir().join(format!("volume-raycaster-config-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let error = Config::load(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(error, RenderError::Config { path: ref reported, .. } if *reported == path));
    }
}
