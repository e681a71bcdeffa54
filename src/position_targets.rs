//! # Position Render Targets
//!
//! The two position-encoding passes render into a pair of float textures the size of the viewport:
//!
//! - **front**: object-space position of the nearest cube surface, where a view ray enters.
//! - **back**: object-space position of the farthest cube surface, where it leaves.
//!
//! Each texture has a render-target view, written by its pass, and a sampled view, read by the
//! ray-casting pass. The depth attachment used by all three passes is created alongside them so
//! that every viewport-sized resource is replaced in one step on resize.
//!
//! ## Format
//!
//! Positions are stored as `Rgba32Float` where the adapter can render to it. Some adapters, such
//! as wgpu's GL backend on llvmpipe, cannot; those get `Rgba16Float`, which is still a float
//! format and holds the `[-1, 1]` range with about three decimal digits. See
//! [`select_position_format`].
//!
//! Every set of targets carries a `generation` number. A [`crate::RayCastBinding`] records the
//! generation it was built from, which makes a stale binding detectable.

use crate::error::{RenderError, RenderResult};
use crate::gpu::create_depth_texture;

/// Candidate texel formats of the position targets, best first. Object-space coordinates are
/// negative half of the time, so only float formats are listed.
pub const POSITION_FORMATS: [wgpu::TextureFormat; 2] = [
    wgpu::TextureFormat::Rgba32Float,
    wgpu::TextureFormat::Rgba16Float,
];

/// The first of [`POSITION_FORMATS`] that `adapter` can both render to and sample.
///
/// # Errors
///
/// Returns [`RenderError::UnsupportedFormat`] when no candidate is usable.
pub fn select_position_format(adapter: &wgpu::Adapter) -> RenderResult<wgpu::TextureFormat> {
    preferred_position_format(|format| adapter.get_texture_format_features(format).allowed_usages)
}

fn preferred_position_format(
    allowed_usages: impl Fn(wgpu::TextureFormat) -> wgpu::TextureUsages,
) -> RenderResult<wgpu::TextureFormat> {
    let required = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
    POSITION_FORMATS
        .into_iter()
        .find(|&format| allowed_usages(format).contains(required))
        .ok_or(RenderError::UnsupportedFormat {
            purpose: "position targets",
        })
}

/// One position texture with its two views.
pub struct PositionTarget {
    pub texture: wgpu::Texture,
    /// Written by a position pass.
    pub render_view: wgpu::TextureView,
    /// Sampled by the ray-casting pass.
    pub sample_view: wgpu::TextureView,
}

impl PositionTarget {
    fn new(
        device: &wgpu::Device,
        label: &str,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let render_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Position Render View"),
            usage: Some(wgpu::TextureUsages::RENDER_ATTACHMENT),
            ..Default::default()
        });
        let sample_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Position Sample View"),
            usage: Some(wgpu::TextureUsages::TEXTURE_BINDING),
            ..Default::default()
        });

        Self {
            texture,
            render_view,
            sample_view,
        }
    }
}

/// The front/back position textures and the depth attachment, all sized to the viewport.
pub struct PositionTargets {
    pub front: PositionTarget,
    pub back: PositionTarget,
    pub depth_view: wgpu::TextureView,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    generation: u64,
}

impl PositionTargets {
    /// Creates a complete set of `width` x `height` targets tagged with `generation`.
    ///
    /// Both dimensions must be non-zero; [`crate::VolumeRenderer`] checks this before calling.
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        generation: u64,
    ) -> Self {
        log::debug!(
            "Creating {width}x{height} {format:?} position targets (generation {generation})"
        );
        Self {
            front: PositionTarget::new(device, "Front Position Texture", format, width, height),
            back: PositionTarget::new(device, "Back Position Texture", format, width, height),
            depth_view: create_depth_texture(device, width, height),
            format,
            width,
            height,
            generation,
        }
    }

    /// `(width, height)` of every target in the set.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RENDER_AND_SAMPLE: wgpu::TextureUsages =
        wgpu::TextureUsages::RENDER_ATTACHMENT.union(wgpu::TextureUsages::TEXTURE_BINDING);

    #[test]
    fn prefers_full_precision_when_renderable() {
        let format = preferred_position_format(|_| RENDER_AND_SAMPLE).unwrap();
        assert_eq!(format, wgpu::TextureFormat::Rgba32Float);
    }

    #[test]
    fn falls_back_to_half_float_when_rgba32_cannot_be_rendered() {
        let format = preferred_position_format(|format| match format {
            wgpu::TextureFormat::Rgba32Float => wgpu::TextureUsages::TEXTURE_BINDING,
            _ => RENDER_AND_SAMPLE,
        })
        .unwrap();
        assert_eq!(format, wgpu::TextureFormat::Rgba16Float);
    }

    #[test]
    fn reports_unsupported_when_no_float_target_renders() {
        let error = preferred_position_format(|_| wgpu::TextureUsages::TEXTURE_BINDING).unwrap_err();
        assert!(matches!(
            error,
            RenderError::UnsupportedFormat {
                purpose: "position targets"
            }
        ));
    }
}
