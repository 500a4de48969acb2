//! # Raijin
//!
//! **A minimal instanced renderer on top of wgpu.**
//!
//! Raijin draws a small fixed set of meshes (triangle, cube, tetrahedron,
//! sphere) with one indexed-instanced draw call per mesh type per frame, into
//! either a window surface or an offscreen texture.
//!
//! ## Quick Start
//!
//! ```no_run
//! use raijin::{Camera, MeshType, Renderer, RendererConfig, Transform, Vec3, Vec4};
//!
//! let mut renderer = Renderer::init_headless(1280, 720, RendererConfig::default())?;
//!
//! let camera = Camera::new();
//! renderer.update_camera(camera.projection_matrix(1280.0 / 720.0), camera.view_matrix());
//!
//! for frame in 0..3 {
//!     let x = frame as f32;
//!     renderer.append_draw(
//!         MeshType::Cube,
//!         Transform::from_position(Vec3::new(x, 0.0, 0.0)).matrix(),
//!         Vec4::new(1.0, 1.0, 0.0, 1.0),
//!     );
//!     renderer.render_frame()?;
//! }
//!
//! renderer.destroy();
//! # Ok::<(), raijin::RendererError>(())
//! ```
//!
//! ## Frame Lifecycle
//!
//! Each [`Renderer::render_frame`] call acquires a target view, groups the
//! queued draws by [`MeshType`], grows and fills the instance buffers, encodes
//! one render pass, submits it and presents (windowed) or finishes (headless).
//! The draw queue is empty afterwards whether the frame succeeded or not. See
//! [`FrameState`] for the state machine and [`FrameReport`] for what a frame
//! returns.

mod bootstrap;
mod camera;
mod config;
mod draw_queue;
mod error;
mod frame;
mod geometry;
pub mod logging;
mod mesh;
mod mesh_registry;
mod pipeline;
mod render_target;
mod renderer;
mod scope;
mod shader;

pub use bootstrap::DeviceContext;
pub use camera::Camera;
pub use config::{DEFAULT_INSTANCE_CAPACITY, RendererConfig};
pub use draw_queue::{DrawQueue, DrawRequest, GroupedDraws};
pub use error::{InitError, InitStage, RendererError, Result};
pub use frame::{DrawPass, DrawRecord, Finalized, FrameReport, FrameState};
pub use geometry::MeshGeometry;
pub use mesh::{Instance, MeshType, Transform, Vertex};
pub use mesh_registry::{InstanceBuffer, MeshRegistry, MeshResource, grown_capacity};
pub use pipeline::{DEPTH_FORMAT, Uniforms};
pub use render_target::TargetKind;
pub use renderer::Renderer;
pub use shader::{ShaderLoadError, ShaderSource};

pub use glam::{Mat3, Mat4, Quat, Vec3, Vec4};
