//! # Renderer Module
//!
//! The `Renderer` ties the window surface to the volume ray caster and the egui overlay. It owns
//! the [`Gpu`], the [`VolumeRenderer`], the animated [`Scene`] and an `egui_wgpu::Renderer`.
//!
//! ## Frame
//!
//! [`Renderer::render_frame`] runs once per redraw:
//!
//! 1. Advance the scene by the elapsed wall time.
//! 2. Upload the overlay's texture changes and vertex buffers.
//! 3. Acquire the next surface texture.
//! 4. Record the three volume passes into the surface view.
//! 5. Draw the overlay on top in its own pass, loading what the ray cast left.
//! 6. Submit and present.
//!
//! ## Surface errors
//!
//! A lost or outdated surface is reconfigured and the frame skipped, a timed-out acquire just skips
//! the frame, and running out of memory is returned as [`RenderError::SurfaceOutOfMemory`] so the
//! application can shut down.

use crate::config::RendererConfig;
use crate::error::{RenderError, RenderResult};
use crate::gpu::Gpu;
use crate::scene::Scene;
use crate::shader::ShaderSources;
use crate::volume::Volume;
use crate::volume_renderer::{FrameTarget, VolumeRenderer};

/// Draws the volume and the overlay into a window surface.
pub struct Renderer {
    gpu: Gpu,
    volume_renderer: VolumeRenderer,
    egui_renderer: egui_wgpu::Renderer,
    scene: Scene,
}

impl Renderer {
    /// Sets up the device for `window` and builds the volume renderer and the overlay renderer.
    ///
    /// # Errors
    ///
    /// Any failure to create the surface, device, shaders, pipelines or textures.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        config: &RendererConfig,
        shader_sources: &ShaderSources,
        volume: &Volume,
    ) -> RenderResult<Self> {
        let gpu = Gpu::new_async(window, width, height).await?;

        let volume_renderer = VolumeRenderer::new(
            &gpu.device,
            &gpu.queue,
            shader_sources,
            volume,
            gpu.render_formats(),
            width,
            height,
        )
        .await?;

        let egui_renderer =
            egui_wgpu::Renderer::new(&gpu.device, gpu.surface_config.format, None, 1, false);

        Ok(Self {
            gpu,
            volume_renderer,
            egui_renderer,
            scene: Scene::new(config),
        })
    }

    /// Resizes the surface and the position targets. Zero sizes, as reported for minimized
    /// windows, are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {width}x{height}");
            return Ok(());
        }
        self.gpu.resize(width, height);
        self.volume_renderer.resize(&self.gpu.device, width, height)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    /// `(width, height)` of the surface.
    pub fn surface_size(&self) -> (u32, u32) {
        (self.gpu.surface_config.width, self.gpu.surface_config.height)
    }

    /// Renders and presents one frame.
    ///
    /// # Errors
    ///
    /// [`RenderError::SurfaceOutOfMemory`] when no frame can be acquired, or the error from
    /// computing the scene transform.
    pub fn render_frame(
        &mut self,
        screen_descriptor: egui_wgpu::ScreenDescriptor,
        paint_jobs: Vec<egui::epaint::ClippedPrimitive>,
        textures_delta: egui::TexturesDelta,
        delta_time: crate::Duration,
    ) -> RenderResult<()> {
        self.scene.advance(delta_time);

        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(&self.gpu.device, &self.gpu.queue, *id, image_delta);
        }
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        let surface_texture = match self.gpu.surface.get_current_texture() {
            Ok(surface_texture) => surface_texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out acquiring surface texture, skipping frame");
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::SurfaceOutOfMemory),
            Err(error) => {
                log::warn!("Failed to acquire surface texture: {error}");
                return Ok(());
            }
        };

        let surface_texture_view =
            surface_texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor {
                    label: Some("Surface Texture View"),
                    format: Some(self.gpu.surface_format),
                    ..Default::default()
                });

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let target = FrameTarget {
            view: &surface_texture_view,
            width: surface_texture.texture.width(),
            height: surface_texture.texture.height(),
        };
        self.volume_renderer.render_scene(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            target,
            &self.scene,
            self.gpu.depth_convention(),
        )?;

        self.egui_renderer.update_buffers(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        encoder.insert_debug_marker("Render overlay");
        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer.render(
                &mut render_pass.forget_lifetime(),
                &paint_jobs,
                &screen_descriptor,
            );
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}
