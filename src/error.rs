//! Error types for the renderer.
//!
//! [`RendererError`] is the single error type returned by the public API. Its
//! variants follow the lifecycle of the renderer:
//!
//! - [`RendererError::Initialization`]: startup failed; the renderer must not be used
//! - [`RendererError::FrameAcquisition`]: this frame's target view could not be obtained
//! - [`RendererError::Present`]: the surface rejected the present call
//! - [`RendererError::ResourceGrowth`]: an instance buffer could not be reallocated
//!
//! Only initialization errors are fatal. The frame-level errors are transient:
//! the frame is abandoned, the draw queue is still cleared, and the next call to
//! [`Renderer::render_frame`](crate::Renderer::render_frame) starts fresh.

use std::fmt;

use thiserror::Error;

use crate::mesh::MeshType;

/// How far initialization progressed before it failed.
///
/// Stages are listed in acquisition order. A failure at a given stage means
/// every earlier stage succeeded and everything it created has already been
/// released again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InitStage {
    /// The window handle supplied by the caller could not be resolved.
    SurfaceHandle,
    /// The wgpu surface could not be created for the window.
    Surface,
    /// No adapter was returned by the instance.
    Adapter,
    /// The adapter refused the device request.
    Device,
    /// The surface reports no usable texture format for this adapter.
    SurfaceFormat,
    /// The shader program could not be loaded or compiled.
    Shader,
    /// A buffer, texture or pipeline failed to construct.
    Resources,
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InitStage::SurfaceHandle => "surface handle",
            InitStage::Surface => "surface",
            InitStage::Adapter => "adapter",
            InitStage::Device => "device",
            InitStage::SurfaceFormat => "surface format",
            InitStage::Shader => "shader",
            InitStage::Resources => "resources",
        };
        f.write_str(name)
    }
}

/// Initialization failure with the stage it happened in.
#[derive(Debug, Error)]
#[error("{stage} initialization failed: {message}")]
pub struct InitError {
    /// Stage that failed.
    pub stage: InitStage,
    /// Human-readable cause.
    pub message: String,
}

impl InitError {
    pub(crate) fn new(stage: InitStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Errors reported by the renderer.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error(transparent)]
    Initialization(#[from] InitError),

    #[error("failed to acquire a render target view: {reason}")]
    FrameAcquisition { reason: String },

    #[error("failed to present the frame: {reason}")]
    Present { reason: String },

    #[error("failed to grow the {mesh:?} instance buffer to {requested} instances: {reason}")]
    ResourceGrowth {
        mesh: MeshType,
        requested: u32,
        reason: String,
    },
}

impl RendererError {
    /// Returns the init stage if this is an initialization error.
    pub fn init_stage(&self) -> Option<InitStage> {
        match self {
            RendererError::Initialization(err) => Some(err.stage),
            _ => None,
        }
    }

    /// Whether the application loop may continue with the next frame.
    pub fn is_transient(&self) -> bool {
        !matches!(self, RendererError::Initialization(_))
    }
}

/// Shorthand used throughout the crate.
pub type Result<T, E = RendererError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_errors_are_fatal_frame_errors_are_not() {
        let init: RendererError = InitError::new(InitStage::Adapter, "none found").into();
        assert!(!init.is_transient());
        assert_eq!(init.init_stage(), Some(InitStage::Adapter));

        let acquire = RendererError::FrameAcquisition {
            reason: "timeout".into(),
        };
        assert!(acquire.is_transient());
        assert_eq!(acquire.init_stage(), None);
    }

    #[test]
    fn messages_name_the_stage_and_mesh() {
        let init: RendererError = InitError::new(InitStage::Device, "rejected").into();
        assert_eq!(init.to_string(), "device initialization failed: rejected");

        let growth = RendererError::ResourceGrowth {
            mesh: MeshType::Cube,
            requested: 300,
            reason: "out of memory".into(),
        };
        assert!(growth.to_string().contains("Cube"));
        assert!(growth.to_string().contains("300"));
    }
}
