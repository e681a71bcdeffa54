//! # Application Module
//!
//! [`App`] is the winit [`ApplicationHandler`] that drives the volume viewer. It creates the
//! window described by [`WindowConfig`], builds the [`Renderer`] once the window exists, feeds
//! window events to egui, and requests a redraw after every event so the volume keeps rotating.
//!
//! ## Overlay
//!
//! A small egui window shows the adapter, backend, position target format, viewport size and frame
//! time, and lets the user pause the rotation or move the camera. `F1` hides or shows it.
//!
//! ## Shutdown
//!
//! `Escape` and the window's close button exit the event loop. A renderer that fails to build or
//! a surface that runs out of memory also exits it; the error is kept and can be read with
//! [`App::take_error`] after the loop returns.

use std::sync::Arc;

use web_time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Theme, Window},
};

use crate::config::{RendererConfig, WindowConfig};
use crate::error::RenderError;
use crate::renderer::Renderer;
use crate::shader::ShaderSources;
use crate::volume::Volume;

/// The volume viewer application.
pub struct App {
    window_config: WindowConfig,
    renderer_config: RendererConfig,
    shader_sources: ShaderSources,
    volume: Option<Volume>,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    gui_state: Option<egui_winit::State>,
    last_render_time: Option<Instant>,
    last_frame_time: crate::Duration,
    last_size: (u32, u32),
    overlay_visible: bool,
    error: Option<RenderError>,
}

impl App {
    pub fn new(
        window_config: WindowConfig,
        renderer_config: RendererConfig,
        shader_sources: ShaderSources,
        volume: Volume,
    ) -> Self {
        Self {
            window_config,
            renderer_config,
            shader_sources,
            volume: Some(volume),
            window: None,
            renderer: None,
            gui_state: None,
            last_render_time: None,
            last_frame_time: crate::Duration::ZERO,
            last_size: (0, 0),
            overlay_visible: true,
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<RenderError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: RenderError) {
        log::error!("{error}");
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(self.window_config.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.window_config.width,
                self.window_config.height,
            ))
            .with_min_inner_size(PhysicalSize::new(
                self.window_config.min_width,
                self.window_config.min_height,
            ));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(error) => {
                log::error!("Failed to create window: {error}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let inner_size = window.inner_size();
        self.last_size = (inner_size.width.max(1), inner_size.height.max(1));
        let (width, height) = self.last_size;

        let gui_context = egui::Context::default();
        let viewport_id = gui_context.viewport_id();
        let gui_state = egui_winit::State::new(
            gui_context,
            viewport_id,
            &window,
            Some(window.scale_factor() as _),
            Some(Theme::Dark),
            None,
        );

        let Some(volume) = self.volume.take() else {
            return;
        };
        let renderer = pollster::block_on(Renderer::new(
            window.clone(),
            width,
            height,
            &self.renderer_config,
            &self.shader_sources,
            &volume,
        ));

        match renderer {
            Ok(renderer) => {
                log::info!(
                    "Rendering {width}x{height} on {:?}",
                    renderer.gpu().backend()
                );
                self.renderer = Some(renderer);
                self.gui_state = Some(gui_state);
                self.last_render_time = Some(Instant::now());
                window.request_redraw();
            }
            Err(error) => self.fail(event_loop, error),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let (Some(gui_state), Some(renderer), Some(window), Some(last_render_time)) = (
            self.gui_state.as_mut(),
            self.renderer.as_mut(),
            self.window.as_ref(),
            self.last_render_time.as_mut(),
        ) else {
            return;
        };

        if gui_state.on_window_event(window, &event).consumed {
            return;
        }

        let mut failure = None;
        match event {
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: winit::event::ElementState::Pressed,
                        ..
                    },
                ..
            } => match key_code {
                KeyCode::Escape => event_loop.exit(),
                KeyCode::F1 => self.overlay_visible = !self.overlay_visible,
                _ => (),
            },
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if width == 0 || height == 0 {
                    log::debug!("Window minimized, keeping {:?}", self.last_size);
                } else {
                    log::info!("Resizing renderer surface to: ({width}, {height})");
                    match renderer.resize(width, height) {
                        Ok(()) => self.last_size = (width, height),
                        Err(error) => failure = Some(error),
                    }
                }
            }
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting...");
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let delta_time = now - *last_render_time;
                *last_render_time = now;
                self.last_frame_time = delta_time;

                let gui_input = gui_state.take_egui_input(window);
                gui_state.egui_ctx().begin_pass(gui_input);

                if self.overlay_visible {
                    let adapter = renderer.gpu().adapter_info().name.clone();
                    let backend = renderer.gpu().backend();
                    let positions = renderer.gpu().render_formats().position;
                    let (width, height) = renderer.surface_size();
                    let frame_ms = self.last_frame_time.as_secs_f32() * 1000.0;
                    egui::Window::new("Volume").show(gui_state.egui_ctx(), |ui| {
                        ui.label(format!("Adapter: {adapter}"));
                        ui.label(format!("Backend: {backend:?}"));
                        ui.label(format!("Position targets: {positions:?}"));
                        ui.label(format!("Viewport: {width}x{height}"));
                        ui.label(format!("Frame time: {frame_ms:.2} ms"));
                        ui.separator();
                        let scene = renderer.scene_mut();
                        ui.checkbox(&mut scene.paused, "Pause rotation");
                        ui.add(
                            egui::Slider::new(&mut scene.camera_distance, 2.0..=20.0)
                                .text("Camera distance"),
                        );
                        ui.label("F1 hides this window");
                    });
                }

                let egui_winit::egui::FullOutput {
                    textures_delta,
                    shapes,
                    pixels_per_point,
                    platform_output,
                    ..
                } = gui_state.egui_ctx().end_pass();

                gui_state.handle_platform_output(window, platform_output);

                let paint_jobs = gui_state.egui_ctx().tessellate(shapes, pixels_per_point);

                let screen_descriptor = {
                    let (width, height) = self.last_size;
                    egui_wgpu::ScreenDescriptor {
                        size_in_pixels: [width, height],
                        pixels_per_point: window.scale_factor() as f32,
                    }
                };

                if let Err(error) =
                    renderer.render_frame(screen_descriptor, paint_jobs, textures_delta, delta_time)
                {
                    failure = Some(error);
                }
            }
            _ => (),
        }

        window.request_redraw();

        if let Some(error) = failure {
            self.fail(event_loop, error);
        }
    }
}
