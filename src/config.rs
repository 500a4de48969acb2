use std::time::Duration;

use crate::shader::ShaderSource;

/// Baseline instance-buffer capacity, in instances.
pub const DEFAULT_INSTANCE_CAPACITY: u32 = 256;

/// Renderer configuration.
///
/// Defaults favor portability: FIFO presentation, all backends, a high
/// performance adapter and a bounded wait for adapter/device acquisition.
///
/// ```
/// use raijin::RendererConfig;
///
/// let config = RendererConfig::new()
///     .instance_capacity(1024)
///     .edges(true);
/// assert_eq!(config.instance_capacity, 1024);
/// ```
#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// Color the target is cleared to at the start of every frame.
    pub clear_color: wgpu::Color,
    /// Surface present mode (windowed only).
    pub present_mode: wgpu::PresentMode,
    pub power_preference: wgpu::PowerPreference,
    pub backends: wgpu::Backends,
    /// Prefer an sRGB surface format when the surface offers one.
    pub prefer_srgb: bool,
    /// Color format of the offscreen texture (headless only).
    pub headless_format: wgpu::TextureFormat,
    /// Starting capacity of every instance buffer.
    pub instance_capacity: u32,
    /// Upper bound on the adapter/device wait. `None` waits forever.
    pub acquire_timeout: Option<Duration>,
    /// Draw mesh edges as lines over the solid pass.
    pub enable_edges: bool,
    pub shader: ShaderSource,
    pub desired_maximum_frame_latency: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: wgpu::Color {
                r: 0.01,
                g: 0.01,
                b: 0.01,
                a: 1.0,
            },
            present_mode: wgpu::PresentMode::Fifo,
            power_preference: wgpu::PowerPreference::HighPerformance,
            backends: wgpu::Backends::all(),
            prefer_srgb: true,
            headless_format: wgpu::TextureFormat::Rgba8Unorm,
            instance_capacity: DEFAULT_INSTANCE_CAPACITY,
            acquire_timeout: Some(Duration::from_secs(10)),
            enable_edges: false,
            shader: ShaderSource::embedded(),
            desired_maximum_frame_latency: 2,
        }
    }
}

impl RendererConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn present_mode(mut self, mode: wgpu::PresentMode) -> Self {
        self.present_mode = mode;
        self
    }

    pub fn backends(mut self, backends: wgpu::Backends) -> Self {
        self.backends = backends;
        self
    }

    /// Sets the baseline instance capacity. Zero is treated as one.
    pub fn instance_capacity(mut self, capacity: u32) -> Self {
        self.instance_capacity = capacity.max(1);
        self
    }

    pub fn acquire_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn edges(mut self, enabled: bool) -> Self {
        self.enable_edges = enabled;
        self
    }

    pub fn shader(mut self, shader: ShaderSource) -> Self {
        self.shader = shader;
        self
    }
}
