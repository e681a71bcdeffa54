//! # Volume Renderer
//!
//! [`VolumeRenderer`] owns every GPU object the ray caster needs and records the three passes of a
//! frame:
//!
//! 1. **Back positions**: the cull-front pipeline draws the cube into the back target.
//! 2. **Front positions**: the cull-back pipeline draws the cube into the front target.
//! 3. **Ray cast**: the ray-cast pipeline draws the cube into the caller's target, reading both
//!    position targets and the volume texture.
//!
//! Each pass clears its color target to opaque black and the shared depth attachment to `1.0`.
//! The passes are recorded in order into one command encoder; wgpu inserts the barriers that make
//! the position targets written by passes 1 and 2 readable by pass 3.
//!
//! ## Resizing
//!
//! The position targets and the depth attachment follow the viewport size. [`VolumeRenderer::resize`]
//! builds a complete new set of targets and the ray-cast binding that samples them before swapping
//! both in, so a frame never draws with a binding that points at targets of another size.
//! [`VolumeRenderer::render`] resizes on its own when the target it is given has changed size.
//!
//! ## Lifetime
//!
//! All resources are released exactly once when the renderer is dropped. None of them outlives
//! the `wgpu::Device` the caller keeps.
//!
//! ## Example
//!
//! ```ignore
//! let mut renderer = VolumeRenderer::new(
//!     &device, &queue, &ShaderSources::default(), &volume, gpu.render_formats(format), width, height,
//! ).await?;
//!
//! let mut encoder = device.create_command_encoder(&Default::default());
//! renderer.render_scene(&device, &queue, &mut encoder, &target, &scene, DepthConvention::ZeroToOne)?;
//! queue.submit(std::iter::once(encoder.finish()));
//! ```

use crate::error::{RenderError, RenderResult};
use crate::geometry::CubeGeometry;
use crate::position_pass::PositionPipelines;
use crate::position_targets::PositionTargets;
use crate::projection::DepthConvention;
use crate::ray_cast::{RayCastBinding, RayCastPipeline};
use crate::scene::Scene;
use crate::shader::{ShaderLibrary, ShaderSources};
use crate::uniform_binding::FrameUniforms;
use crate::volume::{Volume, VolumeTexture};

/// Color every pass clears its target to.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// Texture formats the pipelines are built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderFormats {
    /// Format of the views passed to [`VolumeRenderer::render`].
    pub output: wgpu::TextureFormat,
    /// Float format of the position targets, see
    /// [`select_position_format`](crate::position_targets::select_position_format).
    pub position: wgpu::TextureFormat,
}

/// The view and size of the texture a frame is composited into.
#[derive(Clone, Copy)]
pub struct FrameTarget<'a> {
    pub view: &'a wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl FrameTarget<'_> {
    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Owns the GPU resources of the ray caster and records its passes.
pub struct VolumeRenderer {
    geometry: CubeGeometry,
    uniforms: FrameUniforms,
    position_pipelines: PositionPipelines,
    ray_cast_pipeline: RayCastPipeline,
    volume_texture: VolumeTexture,
    targets: PositionTargets,
    ray_cast_binding: RayCastBinding,
}

impl VolumeRenderer {
    /// Creates every resource of the renderer.
    ///
    /// `formats` names the output and position target formats; `width` x `height` is the initial
    /// viewport.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::EmptyViewport`] for a zero-sized viewport, and
    /// [`RenderError::Validation`] or [`RenderError::OutOfMemory`] if any shader, pipeline,
    /// buffer or texture fails to be created. No renderer is returned in that case.
    pub async fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        shader_sources: &ShaderSources,
        volume: &Volume,
        formats: RenderFormats,
        width: u32,
        height: u32,
    ) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyViewport { width, height });
        }

        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shaders = ShaderLibrary::new(device, shader_sources);
        let geometry = CubeGeometry::new(device);
        let uniforms = FrameUniforms::new(device);
        let position_pipelines =
            PositionPipelines::new(device, &shaders, &uniforms, formats.position);
        let ray_cast_pipeline = RayCastPipeline::new(
            device,
            &shaders,
            &uniforms,
            formats.output,
            formats.position,
        );
        let volume_texture = VolumeTexture::new(device, queue, volume);
        let targets = PositionTargets::new(device, formats.position, width, height, 0);
        let ray_cast_binding = ray_cast_pipeline.bind(device, &targets, &volume_texture);

        let validation = device.pop_error_scope().await;
        let out_of_memory = device.pop_error_scope().await;
        if let Some(error) = validation {
            log::error!("Volume renderer construction failed: {error}");
            return Err(RenderError::Validation {
                stage: "volume renderer",
                message: error.to_string(),
            });
        }
        if out_of_memory.is_some() {
            log::error!("Volume renderer construction ran out of memory");
            return Err(RenderError::OutOfMemory {
                stage: "volume renderer",
            });
        }

        log::info!("Volume renderer ready at {width}x{height}");
        Ok(Self {
            geometry,
            uniforms,
            position_pipelines,
            ray_cast_pipeline,
            volume_texture,
            targets,
            ray_cast_binding,
        })
    }

    /// Replaces the position targets and the ray-cast binding with `width` x `height` versions.
    ///
    /// The new targets and binding are both built before either replaces the old one. Resizing to
    /// the current size does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::EmptyViewport`] if either dimension is zero; the current targets
    /// are kept.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyViewport { width, height });
        }
        if self.targets.size() == (width, height) {
            return Ok(());
        }

        log::info!("Resizing position targets to {width}x{height}");
        let targets = PositionTargets::new(
            device,
            self.targets.format(),
            width,
            height,
            self.targets.generation() + 1,
        );
        let ray_cast_binding = self
            .ray_cast_pipeline
            .bind(device, &targets, &self.volume_texture);

        self.targets = targets;
        self.ray_cast_binding = ray_cast_binding;
        Ok(())
    }

    /// Records a frame that uses the transform of `scene` for the target's aspect ratio.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::EmptyViewport`] for a zero-sized target and
    /// [`RenderError::Projection`] for invalid camera parameters in `scene`. Either is reported
    /// before any GPU work is recorded.
    pub fn render_scene(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: FrameTarget<'_>,
        scene: &Scene,
        convention: DepthConvention,
    ) -> RenderResult<()> {
        if target.width == 0 || target.height == 0 {
            return Err(RenderError::EmptyViewport {
                width: target.width,
                height: target.height,
            });
        }
        let wvp = scene.transform(target.aspect_ratio(), convention)?;
        self.render(device, queue, encoder, target, wvp)
    }

    /// Writes the frame uniforms and records the three passes into `encoder`.
    ///
    /// The caller submits the encoder. If the target size differs from the current viewport the
    /// renderer resizes first.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::EmptyViewport`] for a zero-sized target; nothing is recorded.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: FrameTarget<'_>,
        wvp: nalgebra_glm::Mat4,
    ) -> RenderResult<()> {
        self.resize(device, target.width, target.height)?;

        self.uniforms.update_transform(queue, wvp);
        self.uniforms
            .update_viewport_size(queue, target.width, target.height)?;

        encoder.insert_debug_marker("Volume ray casting");

        self.draw_pass(
            encoder,
            "Back Position Pass",
            &self.targets.back.render_view,
            &self.position_pipelines.cull_front,
            None,
        );
        self.draw_pass(
            encoder,
            "Front Position Pass",
            &self.targets.front.render_view,
            &self.position_pipelines.cull_back,
            None,
        );
        self.draw_pass(
            encoder,
            "Ray Cast Pass",
            target.view,
            &self.ray_cast_pipeline.pipeline,
            Some(&self.ray_cast_binding.bind_group),
        );
        Ok(())
    }

    fn draw_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        color_view: &wgpu::TextureView,
        pipeline: &wgpu::RenderPipeline,
        textures: Option<&wgpu::BindGroup>,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.targets.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &self.uniforms.bind_group, &[]);
        if let Some(textures) = textures {
            render_pass.set_bind_group(1, textures, &[]);
        }
        self.geometry.draw(&mut render_pass);
    }

    /// The current position targets.
    pub fn position_targets(&self) -> &PositionTargets {
        &self.targets
    }

    /// The current ray-cast texture binding.
    pub fn ray_cast_binding(&self) -> &RayCastBinding {
        &self.ray_cast_binding
    }

    /// `(width, height)` of the current viewport.
    pub fn viewport_size(&self) -> (u32, u32) {
        self.targets.size()
    }
}

impl Drop for VolumeRenderer {
    fn drop(&mut self) {
        let (width, height) = self.targets.size();
        log::debug!("Releasing volume renderer resources ({width}x{height} targets)");
    }
}
