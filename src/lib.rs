//! # Volume Ray-Casting Renderer
//!
//! This library renders a 256³ scalar volume by GPU ray casting, using the classic two-pass
//! entry/exit technique on `wgpu`:
//!
//! 1. The cube `[-1, 1]³` enclosing the volume is rasterized with front faces culled. Each fragment
//!    writes its object-space position, so the **back** target holds where every view ray leaves
//!    the volume.
//! 2. The cube is rasterized again with back faces culled, filling the **front** target with the
//!    positions where rays enter.
//! 3. The cube's front faces are drawn a third time into the final target. Each fragment reads its
//!    entry and exit positions, marches between them through the 3-D volume texture and
//!    composites the samples front to back.
//!
//! Both position targets use a float format, `Rgba32Float` where the adapter can render it and
//! `Rgba16Float` otherwise, and follow the viewport size. They are sampled with a
//! border-clamped sampler, so a read outside them has alpha zero and the shader skips the ray;
//! pixels the cube does not cover keep the clear color.
//!
//! ## Modules
//!
//! - [`app`]: the winit application with its egui overlay.
//! - [`renderer`]: surface frames, the volume passes and the overlay, put together per frame.
//! - [`volume_renderer`]: the GPU resources of the ray caster and its three passes.
//! - [`gpu`]: adapter, device and surface setup, windowed or headless.
//! - [`scene`]: rotation angle and camera parameters.
//! - [`projection`]: left-handed perspective projection and the world and view transforms.
//! - [`position_targets`], [`position_pass`], [`ray_cast`]: the targets and pipelines of the passes.
//! - [`volume`]: volume data and its 3-D texture.
//! - [`geometry`], [`vertex`]: the cube mesh.
//! - [`uniform_buffer`], [`uniform_binding`]: per-frame uniforms.
//! - [`shader`]: WGSL sources and shader modules.
//! - [`config`], [`logging`], [`error`]: settings, logger setup and error types.
//!
//! ## Example
//!
//! ```ignore
//! use volume_raycaster::{FrameTarget, HeadlessGpu, Scene, ShaderSources, Volume, VolumeRenderer};
//!
//! let gpu = pollster::block_on(HeadlessGpu::new_async())?;
//! let volume = Volume::sphere(96.0, 255);
//! let mut renderer = pollster::block_on(VolumeRenderer::new(
//!     &gpu.device, &gpu.queue, &ShaderSources::default(), &volume,
//!     gpu.render_formats(wgpu::TextureFormat::Rgba8Unorm), 64, 64,
//! ))?;
//!
//! let mut encoder = gpu.device.create_command_encoder(&Default::default());
//! let target = FrameTarget { view: &view, width: 64, height: 64 };
//! renderer.render_scene(&gpu.device, &gpu.queue, &mut encoder, target, &Scene::default(), gpu.depth_convention())?;
//! gpu.queue.submit(std::iter::once(encoder.finish()));
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod logging;
pub mod position_pass;
pub mod position_targets;
pub mod projection;
pub mod ray_cast;
pub mod renderer;
pub mod scene;
pub mod shader;
pub mod uniform_binding;
pub mod uniform_buffer;
pub mod vertex;
pub mod volume;
pub mod volume_renderer;

pub use web_time::Duration;

pub use crate::app::App;
pub use crate::config::{Config, LoggingConfig, RendererConfig, WindowConfig};
pub use crate::error::{RenderError, RenderResult};
pub use crate::geometry::CubeGeometry;
pub use crate::gpu::{AdapterProfile, Gpu, HeadlessGpu};
pub use crate::logging::init_logging;
pub use crate::position_pass::PositionPipelines;
pub use crate::position_targets::{
    select_position_format, PositionTarget, PositionTargets, POSITION_FORMATS,
};
pub use crate::projection::{DepthConvention, ProjectionError};
pub use crate::ray_cast::{RayCastBinding, RayCastPipeline};
pub use crate::renderer::Renderer;
pub use crate::scene::Scene;
pub use crate::shader::{ShaderLibrary, ShaderProgram, ShaderSources};
pub use crate::uniform_binding::FrameUniforms;
pub use crate::uniform_buffer::{TransformUniform, ViewportUniform};
pub use crate::vertex::{Vertex, CUBE_VERTICES};
pub use crate::volume::{Volume, VolumeTexture};
pub use crate::volume_renderer::{FrameTarget, RenderFormats, VolumeRenderer, CLEAR_COLOR};

/// Triangle list of the cube's twelve triangles, two per face, into [`CUBE_VERTICES`].
///
/// Every triangle is wound counter-clockwise when seen from outside the cube in object space,
/// which the left-handed camera turns into clockwise on screen.
pub const CUBE_INDICES: [u32; 36] = [
    0, 1, 2, 2, 1, 3, // x = -1
    0, 4, 1, 1, 4, 5, // y = -1
    0, 2, 4, 4, 2, 6, // z = -1
    1, 5, 3, 3, 5, 7, // z = +1
    2, 3, 6, 6, 3, 7, // y = +1
    5, 4, 7, 7, 4, 6, // x = +1
];

/// WGSL for the two position passes: `vs_main` transforms the cube, `fs_main` writes the
/// object-space position with alpha 1.
pub const CUBE_SHADER_SOURCE: &str = include_str!("shaders/cube.wgsl");

/// WGSL for the ray-casting pass.
pub const RAY_CASTING_SHADER_SOURCE: &str = include_str!("shaders/ray_casting.wgsl");
