//! Demo: two spinning cubes in a window, or N offscreen frames with
//! `--headless N`.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use raijin::logging::{LoggingConfig, init_logging};
use raijin::{Camera, MeshType, Quat, Renderer, RendererConfig, Transform, Vec3, Vec4};

const MAGENTA: Vec4 = Vec4::new(1.0, 0.0, 1.0, 1.0);
const YELLOW: Vec4 = Vec4::new(1.0, 1.0, 0.0, 1.0);

/// Queues the sample scene for time `t` seconds.
fn draw_scene(renderer: &mut Renderer, t: f32) {
    let spin = Quat::from_rotation_z(t * 0.8);

    renderer.append_draw(
        MeshType::Cube,
        Transform::new()
            .position(Vec3::new(5.0, 0.0, 0.0))
            .rotation(spin)
            .uniform_scale(2.0)
            .matrix(),
        MAGENTA,
    );
    renderer.append_draw(
        MeshType::Cube,
        Transform::new()
            .position(Vec3::new(0.0, 5.0, 0.0))
            .rotation(spin.inverse())
            .uniform_scale(2.0)
            .matrix(),
        YELLOW,
    );
}

fn update_camera(renderer: &mut Renderer, camera: &Camera) {
    let (width, height) = renderer.target_size();
    let aspect = width as f32 / height.max(1) as f32;
    renderer.update_camera(camera.projection_matrix(aspect), camera.view_matrix());
}

struct App {
    config: RendererConfig,
    camera: Camera,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    start_time: Instant,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: RendererConfig) -> Self {
        Self {
            config,
            camera: Camera::new(),
            window: None,
            renderer: None,
            start_time: Instant::now(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes().with_title("raijin");
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, err.into()),
        };

        let size = window.inner_size();
        match Renderer::init_windowed(window.clone(), size.width, size.height, self.config.clone()) {
            Ok(mut renderer) => {
                update_camera(&mut renderer, &self.camera);
                self.renderer = Some(renderer);
                self.window = Some(window.clone());
                window.request_redraw();
            }
            Err(err) => self.fail(event_loop, anyhow::Error::new(err).context("renderer init")),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(renderer) = self.renderer.take() {
                    renderer.destroy();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                    update_camera(renderer, &self.camera);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(renderer) = &mut self.renderer {
                    draw_scene(renderer, self.start_time.elapsed().as_secs_f32());
                    if let Err(err) = renderer.render_frame() {
                        log::debug!("frame skipped: {err}");
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => (),
        }
    }
}

fn run_windowed(config: RendererConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app).context("event loop failed")?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn run_headless(config: RendererConfig, frames: u32) -> Result<()> {
    let mut renderer =
        Renderer::init_headless(1280, 720, config).context("headless renderer init")?;
    update_camera(&mut renderer, &Camera::new());

    let info = renderer.adapter_info();
    log::info!("rendering {frames} headless frames on '{}'", info.name);

    for frame in 0..frames {
        draw_scene(&mut renderer, frame as f32 / 60.0);
        let report = renderer.render_frame()?;
        log::debug!(
            "frame {frame}: {} draw calls, {} cube instances",
            report.draws.len(),
            report.instances_drawn(MeshType::Cube, raijin::DrawPass::Solid)
        );
    }

    renderer.destroy();
    Ok(())
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut args = std::env::args().skip(1);
    let mut headless = None;
    let mut config = RendererConfig::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--headless" => {
                let frames = args
                    .next()
                    .context("--headless expects a frame count")?
                    .parse::<u32>()
                    .context("--headless frame count must be a number")?;
                headless = Some(frames);
            }
            "--edges" => config = config.edges(true),
            other => bail!("unknown argument '{other}' (expected --headless N or --edges)"),
        }
    }

    match headless {
        Some(frames) => run_headless(config, frames),
        None => run_windowed(config),
    }
}
