//! The frame renderer.
//!
//! [`Renderer`] owns the device context, the per-mesh GPU resources, the draw
//! queue and the render target. The application appends draws during a frame
//! and calls [`Renderer::render_frame`] once; the renderer groups the draws by
//! mesh type and issues one indexed-instanced draw call per non-empty group.
//!
//! # Example
//!
//! ```no_run
//! use raijin::{MeshType, Renderer, RendererConfig, Mat4, Vec3, Vec4};
//!
//! let mut renderer = Renderer::init_headless(800, 600, RendererConfig::default())?;
//!
//! renderer.append_draw(
//!     MeshType::Cube,
//!     Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)),
//!     Vec4::new(1.0, 0.0, 1.0, 1.0),
//! );
//! let report = renderer.render_frame()?;
//! assert_eq!(report.draws.len(), 1);
//!
//! renderer.destroy();
//! # Ok::<(), raijin::RendererError>(())
//! ```

use glam::{Mat4, Vec4};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::bootstrap::DeviceContext;
use crate::camera::Camera;
use crate::config::RendererConfig;
use crate::draw_queue::{DrawQueue, DrawRequest, GroupedDraws};
use crate::error::{InitError, InitStage, RendererError, Result};
use crate::frame::{DrawPass, DrawRecord, FrameReport, FrameState, FrameTracker};
use crate::mesh::{Instance, MeshType};
use crate::mesh_registry::MeshRegistry;
use crate::pipeline::{DepthBuffer, Pipelines, Uniforms};
use crate::render_target::{RenderTarget, TargetKind};

/// One planned draw: which pipeline, which mesh, how many instances.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PlannedDraw {
    pub pass: DrawPass,
    pub mesh: MeshType,
    pub instances: u32,
}

/// Orders the draws for a frame: every solid draw in mesh-type order, then,
/// if enabled, the edge overlay in the same order.
pub(crate) fn plan_draws(grouped: &GroupedDraws, edges: bool) -> Vec<PlannedDraw> {
    let passes: &[DrawPass] = if edges {
        &[DrawPass::Solid, DrawPass::Edges]
    } else {
        &[DrawPass::Solid]
    };

    passes
        .iter()
        .flat_map(|&pass| {
            grouped.iter().map(move |(mesh, instances)| PlannedDraw {
                pass,
                mesh,
                instances: instances.len() as u32,
            })
        })
        .collect()
}

/// A real-time instanced renderer bound to a window surface or an offscreen
/// texture.
///
/// Fields drop in declaration order, so per-frame state and pipelines are
/// released before the target, and the target before the device context.
pub struct Renderer {
    draw_queue: DrawQueue,
    pipelines: Pipelines,
    depth: DepthBuffer,
    meshes: MeshRegistry,
    target: RenderTarget,
    context: DeviceContext,
    config: RendererConfig,
}

impl Renderer {
    /// Creates a renderer that presents to `window`.
    ///
    /// The window and display handles are checked before any GPU object is
    /// created; an unavailable handle fails with [`InitStage::SurfaceHandle`].
    pub fn init_windowed<W>(
        window: W,
        width: u32,
        height: u32,
        config: RendererConfig,
    ) -> Result<Self>
    where
        W: wgpu::WindowHandle + 'static,
    {
        Self::try_init_windowed(window, width, height, config).map_err(init_failed)
    }

    /// Creates a renderer that draws into an offscreen texture of the given
    /// size (each dimension clamped to at least 1).
    pub fn init_headless(width: u32, height: u32, config: RendererConfig) -> Result<Self> {
        Self::try_init_headless(width, height, config).map_err(init_failed)
    }

    fn try_init_windowed<W>(
        window: W,
        width: u32,
        height: u32,
        config: RendererConfig,
    ) -> std::result::Result<Self, InitError>
    where
        W: wgpu::WindowHandle + 'static,
    {
        window
            .window_handle()
            .map_err(|err| InitError::new(InitStage::SurfaceHandle, format!("window: {err}")))?;
        window
            .display_handle()
            .map_err(|err| InitError::new(InitStage::SurfaceHandle, format!("display: {err}")))?;

        let instance = create_instance(&config);
        let surface = instance
            .create_surface(window)
            .map_err(|err| InitError::new(InitStage::Surface, err.to_string()))?;

        let context = DeviceContext::acquire(instance, Some(&surface), &config)?;
        let target = RenderTarget::windowed(
            surface,
            &context.adapter,
            &context.device,
            width,
            height,
            &config,
        )?;

        Self::assemble(context, target, config)
    }

    fn try_init_headless(
        width: u32,
        height: u32,
        config: RendererConfig,
    ) -> std::result::Result<Self, InitError> {
        let instance = create_instance(&config);
        let context = DeviceContext::acquire(instance, None, &config)?;
        let target = RenderTarget::headless(&context.device, width, height, config.headless_format)?;

        Self::assemble(context, target, config)
    }

    /// Builds everything that depends on the device and the target format.
    ///
    /// Anything created before a failing step is dropped on the way out.
    fn assemble(
        context: DeviceContext,
        target: RenderTarget,
        config: RendererConfig,
    ) -> std::result::Result<Self, InitError> {
        let device = &context.device;
        let (width, height) = target.size();

        let camera = Camera::default();
        let initial = Uniforms::new(
            camera.projection_matrix(target.aspect()),
            camera.view_matrix(),
        );

        let pipelines = Pipelines::new(device, &config.shader, target.format(), initial)?;
        let depth = DepthBuffer::new(device, width, height);
        let meshes = MeshRegistry::with_builtin_meshes(device, config.instance_capacity)?;

        log::info!(
            "renderer ready: {:?} target {}x{} {:?}, instance capacity {}, edges {}",
            target.kind(),
            width,
            height,
            target.format(),
            meshes.baseline(),
            if config.enable_edges { "on" } else { "off" }
        );

        Ok(Self {
            draw_queue: DrawQueue::new(),
            pipelines,
            depth,
            meshes,
            target,
            context,
            config,
        })
    }

    /// Queues one instance of `mesh` for this frame.
    pub fn append_draw(&mut self, mesh: MeshType, transform: Mat4, color: Vec4) {
        self.draw_instance(mesh, Instance::new(transform, color));
    }

    /// Queues a prebuilt instance payload.
    pub fn draw_instance(&mut self, mesh: MeshType, instance: Instance) {
        self.draw_queue.append(DrawRequest { mesh, instance });
    }

    /// Sets the view-projection used by every draw. Uploaded lazily before the
    /// next frame's draws.
    pub fn update_camera(&mut self, projection: Mat4, view: Mat4) {
        self.pipelines.uniforms.set(Uniforms::new(projection, view));
    }

    /// Resizes a windowed target and its depth buffer.
    ///
    /// Zero-sized requests are deferred; frames fail acquisition until a
    /// non-zero size arrives. Headless targets ignore the call.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.target.resize(&self.context.device, width, height) {
            if let Err(err) = self.depth.ensure_size(&self.context.device, width, height) {
                log::error!("depth buffer resize to {width}x{height} failed: {err}");
            }
        }
    }

    /// Renders and finishes one frame, then clears the draw queue.
    ///
    /// The queue is cleared whether or not the frame succeeded. Acquisition
    /// and present failures are transient: log them and keep calling.
    pub fn render_frame(&mut self) -> Result<FrameReport> {
        let mut tracker = FrameTracker::begin();
        let result = self.run_frame(&mut tracker);

        self.draw_queue.clear();
        let report = tracker.finish();

        match result {
            Ok(()) => {
                log::trace!(
                    "frame done: {} draw calls, presented: {}",
                    report.draws.len(),
                    report.presented
                );
                Ok(report)
            }
            Err(err) => {
                log::warn!("frame abandoned: {err}");
                Err(err)
            }
        }
    }

    fn run_frame(&mut self, tracker: &mut FrameTracker) -> Result<()> {
        let device = &self.context.device;
        let queue = &self.context.queue;

        tracker.enter(FrameState::AcquiringTarget);
        let acquired = self.target.acquire(device)?;

        tracker.enter(FrameState::Encoding);
        let grouped = self.draw_queue.drain_grouped_by_type();
        let mut planned = plan_draws(&grouped, self.config.enable_edges);

        // Grow and fill instance buffers before the pass borrows them.
        planned.retain(|draw| {
            let instances = grouped.instances(draw.mesh);
            match self
                .meshes
                .ensure_instance_capacity(device, draw.mesh, draw.pass, draw.instances)
            {
                Ok(()) => {
                    self.meshes
                        .upload_instances(queue, draw.mesh, draw.pass, instances);
                    true
                }
                Err(err) => {
                    log::error!("skipping {:?} {:?} draw: {err}", draw.mesh, draw.pass);
                    tracker.skip(draw.mesh);
                    false
                }
            }
        });

        self.pipelines.uniforms.flush(queue);
        let (width, height) = self.target.size();
        self.depth
            .ensure_size(device, width, height)
            .map_err(|err| RendererError::FrameAcquisition {
                reason: format!("depth buffer for {width}x{height}: {err}"),
            })?;

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: acquired.view(),
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.depth.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, self.pipelines.uniforms.bind_group(), &[]);

            let mut bound = None;
            for draw in &planned {
                let Some(mesh) = self.meshes.get(draw.mesh) else {
                    continue;
                };

                if bound != Some(draw.pass) {
                    render_pass.set_pipeline(self.pipelines.pipeline(draw.pass));
                    bound = Some(draw.pass);
                }

                let instances = match draw.pass {
                    DrawPass::Solid => &mesh.instances,
                    DrawPass::Edges => &mesh.edge_instances,
                };
                let (index_buffer, index_count) = mesh.indices(draw.pass);

                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, instances.buffer().slice(..));
                render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..index_count, 0, 0..draw.instances);

                tracker.record_draw(DrawRecord {
                    mesh: draw.mesh,
                    pass: draw.pass,
                    index_count,
                    instance_count: draw.instances,
                });
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        tracker.enter(FrameState::Submitted);

        let finalized = self.target.finalize(device, acquired)?;
        tracker.enter(FrameState::Finalized(finalized));

        Ok(())
    }

    /// Releases every GPU resource.
    ///
    /// Pipelines and mesh buffers go first, then the target, then the queue,
    /// device, adapter and instance.
    pub fn destroy(self) {
        let Self {
            draw_queue,
            pipelines,
            depth,
            meshes,
            target,
            context,
            config: _,
        } = self;
        let kind = target.kind();

        drop(draw_queue);
        drop(pipelines);
        drop(depth);
        drop(meshes);
        drop(target);
        drop(context);

        log::info!("{kind:?} renderer destroyed");
    }

    /// Number of draw requests queued for the next frame.
    pub fn queued_draws(&self) -> usize {
        self.draw_queue.len()
    }

    /// Solid-pass instance buffer capacity for `mesh`.
    pub fn instance_capacity(&self, mesh: MeshType) -> u32 {
        self.meshes.capacity(mesh, DrawPass::Solid)
    }

    /// Edge-overlay instance buffer capacity for `mesh`.
    pub fn edge_instance_capacity(&self, mesh: MeshType) -> u32 {
        self.meshes.capacity(mesh, DrawPass::Edges)
    }

    pub fn target_size(&self) -> (u32, u32) {
        self.target.size()
    }

    pub fn target_kind(&self) -> TargetKind {
        self.target.kind()
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.context.adapter_info()
    }

    /// The projection × view matrix currently applied to draws.
    pub fn view_projection(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.pipelines.uniforms.value().view_proj)
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.context.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.context.queue
    }

    /// The offscreen texture of a headless renderer.
    pub fn target_texture(&self) -> Option<&wgpu::Texture> {
        self.target.texture()
    }
}

fn create_instance(config: &RendererConfig) -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: config.backends,
        ..Default::default()
    })
}

fn init_failed(err: InitError) -> RendererError {
    log::error!("renderer initialization failed: {err}");
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Finalized;
    use crate::shader::ShaderSource;
    use glam::Vec3;
    use raw_window_handle::{DisplayHandle, HandleError, WindowHandle};

    /// A window whose native handles cannot be resolved.
    struct MissingWindow;

    impl HasWindowHandle for MissingWindow {
        fn window_handle(&self) -> std::result::Result<WindowHandle<'_>, HandleError> {
            Err(HandleError::Unavailable)
        }
    }

    impl HasDisplayHandle for MissingWindow {
        fn display_handle(&self) -> std::result::Result<DisplayHandle<'_>, HandleError> {
            Err(HandleError::Unavailable)
        }
    }

    /// Creates a headless renderer, or `None` if this machine has no adapter.
    fn headless(width: u32, height: u32, config: RendererConfig) -> Option<Renderer> {
        match Renderer::init_headless(width, height, config) {
            Ok(renderer) => Some(renderer),
            Err(err) if matches!(err.init_stage(), Some(InitStage::Adapter | InitStage::Device)) => {
                eprintln!("skipping GPU test: {err}");
                None
            }
            Err(err) => panic!("unexpected init failure: {err}"),
        }
    }

    fn at(x: f32) -> Mat4 {
        Mat4::from_translation(Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn plan_orders_solid_by_type_then_edges() {
        let mut queue = DrawQueue::new();
        for mesh in [MeshType::Sphere, MeshType::Triangle, MeshType::Sphere] {
            queue.append(DrawRequest {
                mesh,
                instance: Instance::default(),
            });
        }
        let grouped = queue.drain_grouped_by_type();

        let solid_only = plan_draws(&grouped, false);
        assert_eq!(
            solid_only,
            vec![
                PlannedDraw {
                    pass: DrawPass::Solid,
                    mesh: MeshType::Triangle,
                    instances: 1
                },
                PlannedDraw {
                    pass: DrawPass::Solid,
                    mesh: MeshType::Sphere,
                    instances: 2
                },
            ]
        );

        let with_edges = plan_draws(&grouped, true);
        assert_eq!(with_edges.len(), 4);
        assert_eq!(&with_edges[..2], &solid_only[..]);
        assert!(with_edges[2..].iter().all(|d| d.pass == DrawPass::Edges));
        assert_eq!(with_edges[2].mesh, MeshType::Triangle);
    }

    #[test]
    fn plan_is_empty_without_draws() {
        let grouped = DrawQueue::new().drain_grouped_by_type();
        assert!(plan_draws(&grouped, true).is_empty());
    }

    #[test]
    fn unavailable_window_handle_fails_before_gpu_setup() {
        let Err(err) = Renderer::init_windowed(MissingWindow, 640, 480, RendererConfig::default())
        else {
            panic!("init_windowed accepted an unavailable window handle");
        };
        assert_eq!(err.init_stage(), Some(InitStage::SurfaceHandle));
        assert!(!err.is_transient());
    }

    #[test]
    fn headless_frame_draws_every_appended_instance_in_type_order() {
        let Some(mut renderer) = headless(64, 64, RendererConfig::default()) else {
            return;
        };

        renderer.append_draw(MeshType::Sphere, at(1.0), Vec4::ONE);
        renderer.append_draw(MeshType::Cube, at(2.0), Vec4::ONE);
        renderer.append_draw(MeshType::Sphere, at(3.0), Vec4::ONE);
        renderer.append_draw(MeshType::Triangle, at(4.0), Vec4::ONE);
        assert_eq!(renderer.queued_draws(), 4);

        let report = renderer.render_frame().unwrap();
        assert_eq!(renderer.queued_draws(), 0);

        let meshes: Vec<_> = report.draws.iter().map(|d| d.mesh).collect();
        assert_eq!(
            meshes,
            vec![MeshType::Triangle, MeshType::Cube, MeshType::Sphere]
        );
        assert_eq!(report.instances_drawn(MeshType::Sphere, DrawPass::Solid), 2);
        assert_eq!(report.instances_drawn(MeshType::Cube, DrawPass::Solid), 1);
        assert_eq!(report.instances_drawn(MeshType::Tetrahedron, DrawPass::Solid), 0);
        assert!(report.skipped.is_empty());

        renderer.destroy();
    }

    #[test]
    fn headless_frame_never_presents() {
        let Some(mut renderer) = headless(32, 32, RendererConfig::default()) else {
            return;
        };
        assert_eq!(renderer.target_kind(), TargetKind::Headless);

        renderer.append_draw(MeshType::Tetrahedron, Mat4::IDENTITY, Vec4::ONE);
        let report = renderer.render_frame().unwrap();

        assert!(!report.presented);
        assert_eq!(report.finalized(), Some(Finalized::HeadlessDone));
        assert_eq!(
            report.states,
            vec![
                FrameState::Idle,
                FrameState::AcquiringTarget,
                FrameState::Encoding,
                FrameState::Submitted,
                FrameState::Finalized(Finalized::HeadlessDone),
                FrameState::Idle,
            ]
        );
    }

    #[test]
    fn three_hundred_cubes_grow_capacity_to_512_in_one_draw() {
        let Some(mut renderer) = headless(64, 64, RendererConfig::default()) else {
            return;
        };
        assert_eq!(renderer.instance_capacity(MeshType::Cube), 256);

        for i in 0..300 {
            renderer.append_draw(MeshType::Cube, at(i as f32), Vec4::ONE);
        }
        let report = renderer.render_frame().unwrap();

        assert_eq!(renderer.instance_capacity(MeshType::Cube), 512);
        assert_eq!(report.draw_calls(MeshType::Cube, DrawPass::Solid), 1);
        assert_eq!(report.instances_drawn(MeshType::Cube, DrawPass::Solid), 300);
        assert_eq!(
            report.draws[0],
            DrawRecord {
                mesh: MeshType::Cube,
                pass: DrawPass::Solid,
                index_count: 36,
                instance_count: 300,
            }
        );

        // Edges are off, so the edge buffer keeps its own baseline capacity.
        assert_eq!(renderer.edge_instance_capacity(MeshType::Cube), 256);

        // Capacity never shrinks.
        renderer.append_draw(MeshType::Cube, Mat4::IDENTITY, Vec4::ONE);
        renderer.render_frame().unwrap();
        assert_eq!(renderer.instance_capacity(MeshType::Cube), 512);
    }

    #[test]
    fn empty_frame_after_a_full_one_draws_nothing() {
        let Some(mut renderer) = headless(64, 64, RendererConfig::default()) else {
            return;
        };

        renderer.append_draw(MeshType::Cube, Mat4::IDENTITY, Vec4::ONE);
        let first = renderer.render_frame().unwrap();
        assert_eq!(first.draws.len(), 1);

        let second = renderer.render_frame().unwrap();
        assert!(second.draws.is_empty());
        for mesh in MeshType::ALL {
            assert_eq!(second.instances_drawn(mesh, DrawPass::Solid), 0);
        }
        assert_eq!(renderer.queued_draws(), 0);
    }

    #[test]
    fn failed_growth_drops_only_that_mesh() {
        let Some(mut renderer) = headless(16, 16, RendererConfig::new().instance_capacity(1))
        else {
            return;
        };

        let too_many = renderer.device().limits().max_buffer_size / Instance::SIZE + 1;
        for _ in 0..too_many {
            renderer.draw_instance(MeshType::Cube, Instance::default());
        }
        renderer.append_draw(MeshType::Triangle, Mat4::IDENTITY, Vec4::ONE);

        let report = renderer
            .render_frame()
            .expect("a skipped mesh does not fail the frame");
        assert_eq!(renderer.queued_draws(), 0);
        assert_eq!(report.skipped, vec![MeshType::Cube]);
        assert_eq!(
            report.draws,
            vec![DrawRecord {
                mesh: MeshType::Triangle,
                pass: DrawPass::Solid,
                index_count: 3,
                instance_count: 1,
            }]
        );
        assert_eq!(report.finalized(), Some(Finalized::HeadlessDone));
        assert_eq!(renderer.instance_capacity(MeshType::Cube), 1);

        // The next frame is unaffected.
        renderer.append_draw(MeshType::Cube, Mat4::IDENTITY, Vec4::ONE);
        let next = renderer.render_frame().unwrap();
        assert!(next.skipped.is_empty());
        assert_eq!(next.instances_drawn(MeshType::Cube, DrawPass::Solid), 1);
    }

    #[test]
    fn edge_overlay_draws_after_solid_with_its_own_buffer() {
        let config = RendererConfig::new().edges(true).instance_capacity(4);
        let Some(mut renderer) = headless(64, 64, config) else {
            return;
        };

        for i in 0..5 {
            renderer.append_draw(MeshType::Triangle, at(i as f32), Vec4::ONE);
        }
        renderer.append_draw(MeshType::Cube, Mat4::IDENTITY, Vec4::ONE);
        let report = renderer.render_frame().unwrap();

        let passes: Vec<_> = report.draws.iter().map(|d| (d.pass, d.mesh)).collect();
        assert_eq!(
            passes,
            vec![
                (DrawPass::Solid, MeshType::Triangle),
                (DrawPass::Solid, MeshType::Cube),
                (DrawPass::Edges, MeshType::Triangle),
                (DrawPass::Edges, MeshType::Cube),
            ]
        );
        assert_eq!(report.draws[3].index_count, 24);
        assert_eq!(renderer.instance_capacity(MeshType::Triangle), 8);
        assert_eq!(renderer.edge_instance_capacity(MeshType::Triangle), 8);
        assert_eq!(renderer.edge_instance_capacity(MeshType::Cube), 4);
    }

    #[test]
    fn headless_size_is_clamped_and_fixed() {
        let Some(mut renderer) = headless(0, 0, RendererConfig::default()) else {
            return;
        };
        assert_eq!(renderer.target_size(), (1, 1));

        renderer.resize(800, 600);
        assert_eq!(renderer.target_size(), (1, 1));
        assert!(renderer.target_texture().is_some());
        assert!(renderer.render_frame().is_ok());
    }

    #[test]
    fn camera_updates_apply_to_later_frames() {
        let Some(mut renderer) = headless(64, 32, RendererConfig::default()) else {
            return;
        };
        let camera = Camera::new().at(0.0, -20.0, 5.0);
        renderer.update_camera(camera.projection_matrix(2.0), camera.view_matrix());
        assert_eq!(
            renderer.view_projection(),
            camera.projection_matrix(2.0) * camera.view_matrix()
        );

        renderer.append_draw(MeshType::Sphere, Mat4::IDENTITY, Vec4::ONE);
        let report = renderer.render_frame().unwrap();
        assert_eq!(report.instances_drawn(MeshType::Sphere, DrawPass::Solid), 1);
    }

    #[test]
    fn invalid_shader_fails_at_shader_stage() {
        let config = RendererConfig::new().shader(ShaderSource::from_text("broken", "fn vs_main( {"));
        match Renderer::init_headless(16, 16, config) {
            Ok(_) => panic!("broken shader was accepted"),
            Err(err) => match err.init_stage() {
                Some(InitStage::Adapter | InitStage::Device) => {
                    eprintln!("skipping GPU test: {err}");
                }
                stage => assert_eq!(stage, Some(InitStage::Shader)),
            },
        }
    }
}
