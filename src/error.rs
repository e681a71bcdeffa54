//! # Error Types
//!
//! Every fallible operation in the crate reports a [`RenderError`]. Construction
//! failures (adapter, device, shader, pipeline, texture, memory) are fatal: the
//! caller gets the error instead of a half-built renderer. Invalid projection
//! parameters are wrapped from [`ProjectionError`] and are reported before any
//! GPU state is touched.

use std::path::PathBuf;

use thiserror::Error;

use crate::projection::ProjectionError;

/// Errors that can occur while building or driving the volume renderer.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No graphics adapter matched the request.
    #[error("failed to find a suitable graphics adapter")]
    AdapterUnavailable,

    /// The adapter refused to create a device.
    #[error("failed to create graphics device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    /// The window surface could not be created.
    #[error("failed to create surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    /// A shader, pipeline, buffer or texture failed wgpu validation.
    #[error("GPU validation failed while creating {stage}: {message}")]
    Validation { stage: &'static str, message: String },

    /// The device ran out of memory while allocating resources.
    #[error("out of GPU memory while creating {stage}")]
    OutOfMemory { stage: &'static str },

    /// The adapter cannot render to any texture format usable for `purpose`.
    #[error("adapter has no renderable texture format for {purpose}")]
    UnsupportedFormat { purpose: &'static str },

    /// The volume buffer does not hold exactly one 256³ grid of bytes.
    #[error("volume data must be {expected} bytes, got {actual}")]
    InvalidVolume { expected: usize, actual: usize },

    /// A viewport with a zero dimension was requested.
    #[error("viewport must be at least 1x1, got {width}x{height}")]
    EmptyViewport { width: u32, height: u32 },

    /// The projection parameters were rejected.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// Reading a volume, shader or configuration file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for [`crate::Config`].
    #[error("invalid configuration file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The windowing event loop could not be created or stopped abnormally.
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The surface ran out of memory while acquiring a frame.
    #[error("surface out of memory")]
    SurfaceOutOfMemory,
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

impl RenderError {
    /// Wraps an I/O error with the path that produced it.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_viewport_message_names_both_dimensions() {
        let error = RenderError::EmptyViewport {
            width: 0,
            height: 720,
        };
        assert_eq!(error.to_string(), "viewport must be at least 1x1, got 0x720");
    }

    #[test]
    fn projection_errors_pass_through_unchanged() {
        let inner = ProjectionError::FieldOfView(0.0);
        let message = inner.to_string();
        let error: RenderError = inner.into();
        assert_eq!(error.to_string(), message);
    }
}
