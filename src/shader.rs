//! # Shader Sources
//!
//! The renderer needs four shader programs: a vertex/fragment pair for the position-encoding passes
//! and a vertex/fragment pair for the ray-casting pass. They live in two WGSL modules, `cube.wgsl`
//! and `ray_casting.wgsl`, each with a `vs_main` and an `fs_main` entry point.
//!
//! [`ShaderSources`] holds the WGSL text. The default sources are compiled into the binary; a
//! directory containing replacement files can be loaded with [`ShaderSources::from_dir`].
//! [`ShaderLibrary`] compiles the text into `wgpu::ShaderModule`s and resolves a
//! [`ShaderProgram`] to its module and entry point.

use std::borrow::Cow;
use std::path::Path;

use crate::error::{RenderError, RenderResult};
use crate::{CUBE_SHADER_SOURCE, RAY_CASTING_SHADER_SOURCE};

/// File name of the position-encoding module inside a shader directory.
pub const CUBE_SHADER_FILE: &str = "cube.wgsl";

/// File name of the ray-casting module inside a shader directory.
pub const RAY_CASTING_SHADER_FILE: &str = "ray_casting.wgsl";

/// One of the four shader programs, addressed by logical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderProgram {
    CubeVertex,
    CubeFragment,
    RayCastVertex,
    RayCastFragment,
}

impl ShaderProgram {
    /// The entry point of this program inside its module.
    pub fn entry_point(self) -> &'static str {
        match self {
            Self::CubeVertex | Self::RayCastVertex => "vs_main",
            Self::CubeFragment | Self::RayCastFragment => "fs_main",
        }
    }
}

/// WGSL text for both shader modules.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub cube: Cow<'static, str>,
    pub ray_casting: Cow<'static, str>,
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self {
            cube: Cow::Borrowed(CUBE_SHADER_SOURCE),
            ray_casting: Cow::Borrowed(RAY_CASTING_SHADER_SOURCE),
        }
    }
}

impl ShaderSources {
    /// Reads `cube.wgsl` and `ray_casting.wgsl` from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Io`] naming the first file that could not be read.
    pub fn from_dir(dir: impl AsRef<Path>) -> RenderResult<Self> {
        let dir = dir.as_ref();
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| RenderError::io(path, source))
        };
        let sources = Self {
            cube: Cow::Owned(read(CUBE_SHADER_FILE)?),
            ray_casting: Cow::Owned(read(RAY_CASTING_SHADER_FILE)?),
        };
        log::info!("Loaded shader sources from {}", dir.display());
        Ok(sources)
    }
}

/// Compiled shader modules.
pub struct ShaderLibrary {
    cube: wgpu::ShaderModule,
    ray_casting: wgpu::ShaderModule,
}

impl ShaderLibrary {
    /// Compiles both modules. Compilation errors surface through the device's error scopes.
    pub fn new(device: &wgpu::Device, sources: &ShaderSources) -> Self {
        let compile = |label: &str, source: &Cow<'static, str>| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.clone()),
            })
        };
        Self {
            cube: compile("Cube Shader", &sources.cube),
            ray_casting: compile("Ray Casting Shader", &sources.ray_casting),
        }
    }

    /// The module that contains `program`.
    pub fn module(&self, program: ShaderProgram) -> &wgpu::ShaderModule {
        match program {
            ShaderProgram::CubeVertex | ShaderProgram::CubeFragment => &self.cube,
            ShaderProgram::RayCastVertex | ShaderProgram::RayCastFragment => &self.ray_casting,
        }
    }

    /// Vertex stage state for `program`, reading one [`crate::Vertex`] buffer.
    pub fn vertex_state<'a>(
        &'a self,
        program: ShaderProgram,
        buffers: &'a [wgpu::VertexBufferLayout<'a>],
    ) -> wgpu::VertexState<'a> {
        wgpu::VertexState {
            module: self.module(program),
            entry_point: Some(program.entry_point()),
            buffers,
            compilation_options: Default::default(),
        }
    }

    /// Fragment stage state for `program` writing to `targets`.
    pub fn fragment_state<'a>(
        &'a self,
        program: ShaderProgram,
        targets: &'a [Option<wgpu::ColorTargetState>],
    ) -> wgpu::FragmentState<'a> {
        wgpu::FragmentState {
            module: self.module(program),
            entry_point: Some(program.entry_point()),
            targets,
            compilation_options: Default::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn programs_map_to_entry_points() {
        assert_eq!(ShaderProgram::CubeVertex.entry_point(), "vs_main");
        assert_eq!(ShaderProgram::CubeFragment.entry_point(), "fs_main");
        assert_eq!(ShaderProgram::RayCastVertex.entry_point(), "vs_main");
        assert_eq!(ShaderProgram::RayCastFragment.entry_point(), "fs_main");
    }

    #[test]
    fn default_sources_declare_entry_points() {
        let sources = ShaderSources::default();
        for source in [&sources.cube, &sources.ray_casting] {
            assert!(source.contains("fn vs_main"));
            assert!(source.contains("fn fs_main"));
        }
        assert!(sources.ray_casting.contains("texture_3d<f32>"));
    }

    #[test]
    fn from_dir_reads_both_files() {
        let dir = std::env::temp_dir().join(format!("volume-raycaster-shaders-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CUBE_SHADER_FILE), "// cube").unwrap();
        std::fs::write(dir.join(RAY_CASTING_SHADER_FILE), "// ray casting").unwrap();

        let sources = ShaderSources::from_dir(&dir).unwrap();
        assert_eq!(sources.cube, "// cube");
        assert_eq!(sources.ray_casting, "// ray casting");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn from_dir_reports_missing_file() {
        let dir = std::env::temp_dir().join("volume-raycaster-missing-shaders");
        let error = ShaderSources::from_dir(&dir).unwrap_err();
        assert!(matches!(error, RenderError::Io { ref path, .. } if path.ends_with(CUBE_SHADER_FILE)));
    }
}
