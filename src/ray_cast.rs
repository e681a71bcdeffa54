//! # Ray-Cast Pipeline
//!
//! The ray-casting pass draws the cube's front faces into the final target. For each covered pixel
//! the fragment shader reads the entry position from the front target, the exit position from the
//! back target, and marches between them through the volume texture, compositing front to back.
//!
//! ## Bindings
//!
//! `@group(0)` is the shared [`FrameUniforms`] bind group. `@group(1)` holds the textures:
//!
//! | Binding | Resource |
//! |---|---|
//! | 0 | front position texture |
//! | 1 | back position texture |
//! | 2 | volume texture (3-D) |
//! | 3 | position sampler (border-clamped, linear) |
//! | 4 | volume sampler (edge-clamped, linear) |
//!
//! The pipeline is built once. Its texture bind group, a [`RayCastBinding`], is rebuilt whenever
//! the position targets are replaced, because a wgpu bind group cannot be re-pointed at new views.
//!
//! ## Sampler fallback
//!
//! The position sampler returns transparent black outside `[0, 1]`, which the shader reads as
//! "no ray". That needs `ADDRESS_MODE_CLAMP_TO_BORDER`. Linear filtering of the position targets
//! needs a filterable format: `Rgba16Float` always is, `Rgba32Float` only with
//! `FLOAT32_FILTERABLE`. Without border support the sampler clamps to the edge, and without
//! filtering it samples nearest; the shader also checks the texture coordinate range itself, and
//! positions are always read at texel centers, so the image does not change.

use crate::gpu::DEPTH_FORMAT;
use crate::position_targets::PositionTargets;
use crate::shader::{ShaderLibrary, ShaderProgram};
use crate::uniform_binding::FrameUniforms;
use crate::vertex::Vertex;
use crate::volume::VolumeTexture;

/// The ray-casting pipeline, its texture bind group layout and its samplers.
pub struct RayCastPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub texture_bind_group_layout: wgpu::BindGroupLayout,
    position_sampler: wgpu::Sampler,
    volume_sampler: wgpu::Sampler,
}

impl RayCastPipeline {
    pub fn new(
        device: &wgpu::Device,
        shaders: &ShaderLibrary,
        uniforms: &FrameUniforms,
        target_format: wgpu::TextureFormat,
        position_format: wgpu::TextureFormat,
    ) -> Self {
        let features = device.features();
        let border_sampling = features.contains(wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER);
        let filterable_positions = position_format
            .guaranteed_format_features(features)
            .flags
            .contains(wgpu::TextureFormatFeatureFlags::FILTERABLE);

        let position_sampler = device.create_sampler(&Self::position_sampler_descriptor(
            border_sampling,
            filterable_positions,
        ));
        let volume_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Volume Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let position_texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float {
                    filterable: filterable_positions,
                },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let position_sampler_type = if filterable_positions {
            wgpu::SamplerBindingType::Filtering
        } else {
            wgpu::SamplerBindingType::NonFiltering
        };

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("ray_cast_texture_bind_group_layout"),
                entries: &[
                    position_texture_entry(0),
                    position_texture_entry(1),
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D3,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(position_sampler_type),
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 4,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Ray Cast Pipeline Layout"),
            bind_group_layouts: &[&uniforms.bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let attributes = Vertex::vertex_attributes();
        let buffers = [Vertex::description(&attributes)];
        let targets = [Some(wgpu::ColorTargetState {
            format: target_format,
            blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING), // Composite over the clear color.
            write_mask: wgpu::ColorWrites::ALL,
        })];

        log::debug!(
            "Creating ray cast pipeline for {target_format:?} from {position_format:?} positions (border sampling: {border_sampling}, filterable positions: {filterable_positions})"
        );
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Ray Cast Pipeline"),
            layout: Some(&layout),
            vertex: shaders.vertex_state(ShaderProgram::RayCastVertex, &buffers),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Cw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
                unclipped_depth: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(shaders.fragment_state(ShaderProgram::RayCastFragment, &targets)),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            texture_bind_group_layout,
            position_sampler,
            volume_sampler,
        }
    }

    fn position_sampler_descriptor(
        border_sampling: bool,
        filterable_positions: bool,
    ) -> wgpu::SamplerDescriptor<'static> {
        let (address_mode, border_color) = if border_sampling {
            (
                wgpu::AddressMode::ClampToBorder,
                Some(wgpu::SamplerBorderColor::TransparentBlack),
            )
        } else {
            (wgpu::AddressMode::ClampToEdge, None)
        };
        let filter = if filterable_positions {
            wgpu::FilterMode::Linear
        } else {
            wgpu::FilterMode::Nearest
        };
        wgpu::SamplerDescriptor {
            label: Some("Position Sampler"),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: filter,
            lod_min_clamp: 0.0,
            border_color,
            ..Default::default()
        }
    }

    /// Builds the texture bind group for `targets` and `volume`.
    pub fn bind(
        &self,
        device: &wgpu::Device,
        targets: &PositionTargets,
        volume: &VolumeTexture,
    ) -> RayCastBinding {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ray_cast_texture_bind_group"),
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&targets.front.sample_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&targets.back.sample_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&volume.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.position_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&self.volume_sampler),
                },
            ],
        });

        RayCastBinding {
            bind_group,
            targets_generation: targets.generation(),
        }
    }
}

/// The ray-casting texture bind group for one generation of position targets.
pub struct RayCastBinding {
    pub bind_group: wgpu::BindGroup,
    targets_generation: u64,
}

impl RayCastBinding {
    /// Generation of the [`PositionTargets`] whose views this binding samples.
    pub fn targets_generation(&self) -> u64 {
        self.targets_generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_sampler_returns_transparent_black() {
        let descriptor = RayCastPipeline::position_sampler_descriptor(true, true);
        assert_eq!(descriptor.address_mode_u, wgpu::AddressMode::ClampToBorder);
        assert_eq!(descriptor.address_mode_v, wgpu::AddressMode::ClampToBorder);
        assert_eq!(descriptor.border_color, Some(wgpu::SamplerBorderColor::TransparentBlack));
        assert_eq!(descriptor.mag_filter, wgpu::FilterMode::Linear);
        assert_eq!(descriptor.mipmap_filter, wgpu::FilterMode::Linear);
    }

    #[test]
    fn half_float_positions_are_filterable_without_extra_features() {
        let features = wgpu::TextureFormat::Rgba16Float.guaranteed_format_features(wgpu::Features::empty());
        assert!(features.flags.contains(wgpu::TextureFormatFeatureFlags::FILTERABLE));
        let features = wgpu::TextureFormat::Rgba32Float.guaranteed_format_features(wgpu::Features::empty());
        assert!(!features.flags.contains(wgpu::TextureFormatFeatureFlags::FILTERABLE));
    }

    #[test]
    fn fallback_sampler_clamps_to_edge_without_filtering() {
        let descriptor = RayCastPipeline::position_sampler_descriptor(false, false);
        assert_eq!(descriptor.address_mode_u, wgpu::AddressMode::ClampToEdge);
        assert_eq!(descriptor.border_color, None);
        assert_eq!(descriptor.min_filter, wgpu::FilterMode::Nearest);
    }
}
