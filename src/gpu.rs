//! # GPU Management Module
//!
//! The `gpu` module sets up the wgpu device the volume renderer draws with.
//!
//! ## Overview
//!
//! - [`Gpu`]: device, queue and a configured window surface, used by the interactive application.
//! - [`HeadlessGpu`]: device and queue without a surface, used for offscreen rendering and tests.
//! - [`create_depth_texture`]: the depth attachment shared by the three render passes.
//!
//! Both flavors request the same optional features: `ADDRESS_MODE_CLAMP_TO_BORDER` and
//! `FLOAT32_FILTERABLE` are enabled when the adapter offers them, so the ray-casting pass can
//! sample the position targets with a border-clamped linear sampler. Without them the
//! ray-casting pipeline falls back to a clamped nearest sampler (see [`crate::RayCastPipeline`]).
//!
//! Both also describe the adapter once, in an [`AdapterProfile`]: the active backend, the
//! [`DepthConvention`] its clip space uses, which the projection matrix depends on, and the float
//! format the position targets can be rendered in.
//!
//! ## Example Usage
//!
//! ```ignore
//! let gpu = Gpu::new_async(window, width, height).await?;
//! log::info!("Rendering with {:?}", gpu.backend());
//! ```

use crate::error::{RenderError, RenderResult};
use crate::position_targets::select_position_format;
use crate::projection::DepthConvention;
use crate::volume_renderer::RenderFormats;

/// Features the renderer uses when available.
const OPTIONAL_FEATURES: wgpu::Features = wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER
    .union(wgpu::Features::FLOAT32_FILTERABLE);

/// Format of the depth attachment shared by all passes.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// What the renderer needs to know about the adapter, worked out once at device creation.
#[derive(Debug, Clone)]
pub struct AdapterProfile {
    pub info: wgpu::AdapterInfo,
    pub depth_convention: DepthConvention,
    pub position_format: wgpu::TextureFormat,
}

impl AdapterProfile {
    /// # Errors
    ///
    /// Returns [`RenderError::UnsupportedFormat`] if the adapter cannot render any float format
    /// the position targets accept.
    pub fn new(adapter: &wgpu::Adapter) -> RenderResult<Self> {
        let info = adapter.get_info();
        let depth_convention = DepthConvention::for_backend(info.backend);
        let position_format = select_position_format(adapter)?;
        log::info!("Clip depth {depth_convention:?}, position targets {position_format:?}");
        Ok(Self {
            info,
            depth_convention,
            position_format,
        })
    }
}

/// A wgpu device bound to a window surface.
pub struct Gpu {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub surface_format: wgpu::TextureFormat,
    profile: AdapterProfile,
}

impl Gpu {
    /// Reconfigures the surface for a new window size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Reapplies the current configuration after the surface was lost or became outdated.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// The backend the device runs on.
    pub fn backend(&self) -> wgpu::Backend {
        self.profile.info.backend
    }

    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.profile.info
    }

    /// Clip-space depth convention of the active backend.
    pub fn depth_convention(&self) -> DepthConvention {
        self.profile.depth_convention
    }

    /// Formats for rendering into the surface.
    pub fn render_formats(&self) -> RenderFormats {
        RenderFormats {
            output: self.surface_format,
            position: self.profile.position_format,
        }
    }

    /// Creates the surface for `window`, picks an adapter that can present to it, requests a
    /// device and configures the surface at `width` x `height`.
    ///
    /// # Errors
    ///
    /// Fails when the surface cannot be created, no compatible adapter exists, or the device
    /// request is refused.
    pub async fn new_async(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::AdapterUnavailable)?;

        let profile = AdapterProfile::new(&adapter)?;
        let (device, queue) = request_device(&adapter, "Volume Renderer Device").await?;

        let surface_capabilities = surface.get_capabilities(&adapter);

        let surface_format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb()) // egui wants a non-srgb surface texture
            .unwrap_or(surface_capabilities.formats[0]);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: surface_capabilities.present_modes[0],
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &surface_config);

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            surface_format,
            profile,
        })
    }
}

/// A wgpu device with no surface, for rendering into offscreen textures.
pub struct HeadlessGpu {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    profile: AdapterProfile,
}

impl HeadlessGpu {
    /// Requests any adapter, falling back to a software adapter if no hardware one is found.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::AdapterUnavailable`] when the system has no usable adapter at all,
    /// and [`RenderError::UnsupportedFormat`] when it cannot render float position targets.
    pub async fn new_async() -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let mut adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await;
        if adapter.is_none() {
            log::warn!("No hardware adapter found, trying the fallback adapter");
            adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    compatible_surface: None,
                    force_fallback_adapter: true,
                })
                .await;
        }
        let adapter = adapter.ok_or(RenderError::AdapterUnavailable)?;

        let profile = AdapterProfile::new(&adapter)?;
        let (device, queue) = request_device(&adapter, "Volume Renderer Device (headless)").await?;

        Ok(Self {
            device,
            queue,
            profile,
        })
    }

    pub fn profile(&self) -> &AdapterProfile {
        &self.profile
    }

    /// The backend the device runs on.
    pub fn backend(&self) -> wgpu::Backend {
        self.profile.info.backend
    }

    /// Clip-space depth convention of the active backend.
    pub fn depth_convention(&self) -> DepthConvention {
        self.profile.depth_convention
    }

    /// Formats for rendering into offscreen targets of `output` format.
    pub fn render_formats(&self, output: wgpu::TextureFormat) -> RenderFormats {
        RenderFormats {
            output,
            position: self.profile.position_format,
        }
    }
}

/// Requests a device with the renderer's optional features enabled where supported.
async fn request_device(
    adapter: &wgpu::Adapter,
    label: &str,
) -> RenderResult<(wgpu::Device, wgpu::Queue)> {
    let info = adapter.get_info();
    log::info!(
        "Using adapter {} ({:?}, {:?})",
        info.name,
        info.backend,
        info.device_type
    );

    let required_features = adapter.features() & OPTIONAL_FEATURES;
    if required_features != OPTIONAL_FEATURES {
        log::warn!(
            "Adapter lacks {:?}; position targets will use a clamped nearest sampler",
            OPTIONAL_FEATURES - required_features
        );
    }

    let device_and_queue = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some(label),
                memory_hints: wgpu::MemoryHints::default(),
                required_features,
                required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
            },
            None,
        )
        .await?;
    Ok(device_and_queue)
}

/// Creates a `Depth32Float` attachment of `width` x `height` and returns its view.
pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(
        &(wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        }),
    );

    texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("Depth Texture View"),
        format: Some(DEPTH_FORMAT),
        dimension: Some(wgpu::TextureViewDimension::D2),
        aspect: wgpu::TextureAspect::All,
        base_mip_level: 0,
        base_array_layer: 0,
        array_layer_count: None,
        mip_level_count: None,
        usage: None,
    })
}
