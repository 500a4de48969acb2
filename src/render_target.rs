//! The surface or texture a frame is rendered into.
//!
//! A renderer is bound to one [`RenderTarget`] for its whole life: either a
//! presentable window surface or a fixed-size offscreen texture. Only the
//! windowed variant can be resized or presented.

use crate::config::RendererConfig;
use crate::error::{InitError, InitStage, RendererError};
use crate::frame::Finalized;
use crate::scope::{self, Scope};

/// Which variant a [`RenderTarget`] is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Windowed,
    Headless,
}

/// Destination of every frame.
pub enum RenderTarget {
    Windowed {
        surface: wgpu::Surface<'static>,
        /// Configuration last applied to the surface.
        config: wgpu::SurfaceConfiguration,
        extent: SurfaceExtent,
    },
    Headless {
        texture: wgpu::Texture,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    },
}

/// Requested versus configured size of a window surface.
///
/// The requested size may be zero while the window is minimized; the
/// configured size then keeps its last non-zero value and acquisition is
/// refused until a usable size arrives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceExtent {
    requested: (u32, u32),
    configured: (u32, u32),
}

impl SurfaceExtent {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            requested: (width, height),
            configured: (width.max(1), height.max(1)),
        }
    }

    /// Records a resize. Returns the size to configure, or `None` when the
    /// request is zero-sized and must wait.
    pub(crate) fn request(&mut self, width: u32, height: u32) -> Option<(u32, u32)> {
        self.requested = (width, height);
        if width == 0 || height == 0 {
            return None;
        }
        self.configured = (width, height);
        Some(self.configured)
    }

    /// Rolls the configured size back after a failed reconfiguration.
    pub(crate) fn revert(&mut self, configured: (u32, u32)) {
        self.configured = configured;
        self.requested = configured;
    }

    pub(crate) fn configured(&self) -> (u32, u32) {
        self.configured
    }

    /// Fails while the last requested size is zero.
    pub(crate) fn check_acquirable(&self) -> Result<(), RendererError> {
        let (width, height) = self.requested;
        if width == 0 || height == 0 {
            return Err(acquisition_error(format!(
                "surface is zero-sized ({width}x{height})"
            )));
        }
        Ok(())
    }
}

/// A view acquired for one frame.
pub(crate) enum AcquiredTarget {
    Surface {
        texture: wgpu::SurfaceTexture,
        view: wgpu::TextureView,
    },
    Offscreen {
        view: wgpu::TextureView,
    },
}

impl AcquiredTarget {
    pub(crate) fn view(&self) -> &wgpu::TextureView {
        match self {
            AcquiredTarget::Surface { view, .. } | AcquiredTarget::Offscreen { view } => view,
        }
    }
}

/// Picks the surface format: the first sRGB format when `prefer_srgb` is set,
/// otherwise (or if none is sRGB) the surface's preferred format.
pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = *formats.first()?;
    if prefer_srgb {
        if let Some(srgb) = formats.iter().find(|f| f.is_srgb()) {
            return Some(*srgb);
        }
    }
    Some(first)
}

impl RenderTarget {
    /// Configures `surface` for `device` at the given size.
    pub(crate) fn windowed(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        width: u32,
        height: u32,
        config: &RendererConfig,
    ) -> Result<Self, InitError> {
        let caps = surface.get_capabilities(adapter);
        let format = choose_surface_format(&caps.formats, config.prefer_srgb).ok_or_else(|| {
            InitError::new(
                InitStage::SurfaceFormat,
                "surface reports no supported formats for this adapter",
            )
        })?;

        let present_mode = if caps.present_modes.contains(&config.present_mode) {
            config.present_mode
        } else {
            log::warn!(
                "present mode {:?} unsupported, falling back to Fifo",
                config.present_mode
            );
            wgpu::PresentMode::Fifo
        };

        let extent = SurfaceExtent::new(width, height);
        let (config_width, config_height) = extent.configured();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: config_width,
            height: config_height,
            present_mode,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: config.desired_maximum_frame_latency,
        };

        configure(&surface, device, &surface_config)
            .map_err(|err| InitError::new(InitStage::Surface, err.to_string()))?;

        log::info!(
            "surface configured: {}x{} {:?} {:?}",
            surface_config.width,
            surface_config.height,
            format,
            present_mode
        );

        Ok(RenderTarget::Windowed {
            surface,
            config: surface_config,
            extent,
        })
    }

    /// Allocates an offscreen color texture. Dimensions are clamped to at
    /// least 1.
    pub(crate) fn headless(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Result<Self, InitError> {
        let width = width.max(1);
        let height = height.max(1);

        let texture = scope::capture_all(device, || {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Headless Target"),
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
            })
        })
        .map_err(|err| InitError::new(InitStage::Resources, format!("headless target: {err}")))?;

        log::info!("headless target: {width}x{height} {format:?}");

        Ok(RenderTarget::Headless {
            texture,
            format,
            width,
            height,
        })
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            RenderTarget::Windowed { .. } => TargetKind::Windowed,
            RenderTarget::Headless { .. } => TargetKind::Headless,
        }
    }

    /// Size frames are currently rendered at.
    pub fn size(&self) -> (u32, u32) {
        match self {
            RenderTarget::Windowed { config, .. } => (config.width, config.height),
            RenderTarget::Headless { width, height, .. } => (*width, *height),
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        match self {
            RenderTarget::Windowed { config, .. } => config.format,
            RenderTarget::Headless { format, .. } => *format,
        }
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        let (width, height) = self.size();
        width as f32 / height.max(1) as f32
    }

    /// Reconfigures a windowed surface to the new size.
    ///
    /// Returns whether the surface was reconfigured. A zero dimension is
    /// recorded but defers configuration until a non-zero size arrives. If
    /// the device rejects the new size the previous configuration stays.
    /// Headless targets are fixed-size and ignore the call.
    pub(crate) fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        match self {
            RenderTarget::Windowed {
                surface,
                config,
                extent,
            } => {
                let previous = extent.configured();
                let Some((width, height)) = extent.request(width, height) else {
                    log::warn!("deferring zero-sized resize to {width}x{height}");
                    return false;
                };
                config.width = width;
                config.height = height;
                if let Err(err) = configure(surface, device, config) {
                    log::error!("resize to {width}x{height} rejected: {err}");
                    extent.revert(previous);
                    (config.width, config.height) = previous;
                    // Restore the surface to the last accepted size.
                    if let Err(err) = configure(surface, device, config) {
                        log::error!("restoring surface to {}x{} failed: {err}", previous.0, previous.1);
                    }
                    return false;
                }
                log::debug!("surface resized to {width}x{height}");
                true
            }
            RenderTarget::Headless { width: w, height: h, .. } => {
                log::warn!("ignoring resize to {width}x{height}: headless target is fixed at {w}x{h}");
                false
            }
        }
    }

    /// Obtains a view to render this frame into.
    ///
    /// A suboptimal, lost or outdated surface is reconfigured and the frame is
    /// reported as failed, so the next frame starts from a fresh configuration.
    pub(crate) fn acquire(&mut self, device: &wgpu::Device) -> Result<AcquiredTarget, RendererError> {
        match self {
            RenderTarget::Windowed {
                surface,
                config,
                extent,
            } => {
                extent.check_acquirable()?;

                match surface.get_current_texture() {
                    Ok(texture) if texture.suboptimal => {
                        drop(texture);
                        Err(reconfigure_after(surface, device, config, "surface texture is suboptimal"))
                    }
                    Ok(texture) => {
                        let view = texture
                            .texture
                            .create_view(&wgpu::TextureViewDescriptor::default());
                        Ok(AcquiredTarget::Surface { texture, view })
                    }
                    Err(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                        Err(reconfigure_after(surface, device, config, &err.to_string()))
                    }
                    Err(err) => Err(acquisition_error(err.to_string())),
                }
            }
            RenderTarget::Headless { texture, .. } => Ok(AcquiredTarget::Offscreen {
                view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            }),
        }
    }

    /// Finishes a submitted frame: presents a surface texture, or does nothing
    /// for an offscreen one.
    pub(crate) fn finalize(
        &self,
        device: &wgpu::Device,
        acquired: AcquiredTarget,
    ) -> Result<Finalized, RendererError> {
        match acquired {
            AcquiredTarget::Surface { texture, view } => {
                drop(view);
                scope::capture(device, Scope::Validation, || texture.present())
                    .map_err(|err| RendererError::Present {
                        reason: err.to_string(),
                    })?;
                Ok(Finalized::Presented)
            }
            AcquiredTarget::Offscreen { view } => {
                drop(view);
                Ok(Finalized::HeadlessDone)
            }
        }
    }

    /// The offscreen texture, for headless targets.
    pub fn texture(&self) -> Option<&wgpu::Texture> {
        match self {
            RenderTarget::Windowed { .. } => None,
            RenderTarget::Headless { texture, .. } => Some(texture),
        }
    }
}

fn configure(
    surface: &wgpu::Surface<'_>,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> Result<(), wgpu::Error> {
    scope::capture(device, Scope::Validation, || surface.configure(device, config))
}

/// Reconfigures after a failed acquisition and builds the error for it.
fn reconfigure_after(
    surface: &wgpu::Surface<'_>,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    cause: &str,
) -> RendererError {
    match configure(surface, device, config) {
        Ok(()) => acquisition_error(format!("{cause}; surface reconfigured")),
        Err(err) => {
            log::error!("reconfiguring surface failed: {err}");
            acquisition_error(format!("{cause}; reconfiguration failed: {err}"))
        }
    }
}

fn acquisition_error(reason: impl Into<String>) -> RendererError {
    RendererError::FrameAcquisition {
        reason: reason.into(),
    }
}
