//! # Position-Pass Pipelines
//!
//! Two pipelines rasterize the cube and write each fragment's object-space position as its color.
//! They share one shader pair, one layout and one target format and differ only in which faces
//! they cull:
//!
//! | Pipeline | Culls | Surface left | Target |
//! |---|---|---|---|
//! | [`PositionPipelines::cull_front`] | front faces | far side of the cube, where rays exit | back |
//! | [`PositionPipelines::cull_back`] | back faces | near side of the cube, where rays enter | front |
//!
//! Depth testing stays on in both so the correct surface survives when the cube is clipped by the
//! view frustum.

use crate::gpu::DEPTH_FORMAT;
use crate::shader::{ShaderLibrary, ShaderProgram};
use crate::uniform_binding::FrameUniforms;
use crate::vertex::Vertex;

/// The cull-front and cull-back position pipelines.
pub struct PositionPipelines {
    pub cull_front: wgpu::RenderPipeline,
    pub cull_back: wgpu::RenderPipeline,
}

impl PositionPipelines {
    /// Builds both pipelines for targets of `position_format`.
    pub fn new(
        device: &wgpu::Device,
        shaders: &ShaderLibrary,
        uniforms: &FrameUniforms,
        position_format: wgpu::TextureFormat,
    ) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Position Pipeline Layout"),
            bind_group_layouts: &[&uniforms.bind_group_layout],
            push_constant_ranges: &[],
        });

        Self {
            cull_front: Self::create_pipeline(
                device,
                shaders,
                &layout,
                position_format,
                wgpu::Face::Front,
                "Position Pipeline (cull front)",
            ),
            cull_back: Self::create_pipeline(
                device,
                shaders,
                &layout,
                position_format,
                wgpu::Face::Back,
                "Position Pipeline (cull back)",
            ),
        }
    }

    fn create_pipeline(
        device: &wgpu::Device,
        shaders: &ShaderLibrary,
        layout: &wgpu::PipelineLayout,
        format: wgpu::TextureFormat,
        cull_mode: wgpu::Face,
        label: &str,
    ) -> wgpu::RenderPipeline {
        let attributes = Vertex::vertex_attributes();
        let buffers = [Vertex::description(&attributes)];
        let targets = [Some(wgpu::ColorTargetState {
            format,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        })];

        log::debug!("Creating {label}");
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: shaders.vertex_state(ShaderProgram::CubeVertex, &buffers),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Cw, // Outward faces project clockwise under the left-handed camera.
                cull_mode: Some(cull_mode),
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
            fragment: Some(shaders.fragment_state(ShaderProgram::CubeFragment, &targets)),
            multiview: None,
            cache: None,
        })
    }
}
