//! Adapter and device acquisition.
//!
//! wgpu hands out adapters and devices through futures that are resolved as the
//! instance processes its events. [`DeviceContext::acquire`] turns that into a
//! blocking call: the future is polled with a waker that raises a completion
//! flag, and while the flag is down the instance's event queue is pumped. An
//! optional deadline bounds the wait.
//!
//! Acquisition failure (no adapter, device request rejected) is distinct from
//! "still pending" and is returned immediately, without retry.

use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll, Wake, Waker};
use std::time::{Duration, Instant};

use crate::config::RendererConfig;
use crate::error::{InitError, InitStage};

/// The GPU handles owned by a renderer.
///
/// Fields are declared in release order: dropping a `DeviceContext` releases the
/// queue, then the device, then the adapter, then the instance.
pub struct DeviceContext {
    pub queue: wgpu::Queue,
    pub device: wgpu::Device,
    pub adapter: wgpu::Adapter,
    pub instance: wgpu::Instance,
}

impl DeviceContext {
    /// Acquires an adapter and a device from `instance`.
    ///
    /// `compatible_surface` restricts adapter selection to adapters that can
    /// present to it. Blocks until both requests complete, fail, or
    /// `config.acquire_timeout` elapses.
    pub fn acquire(
        instance: wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
        config: &RendererConfig,
    ) -> Result<Self, InitError> {
        let timeout = config.acquire_timeout;

        let adapter_request = instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: config.power_preference,
            compatible_surface,
            force_fallback_adapter: false,
        });
        let adapter = block_on_pumped(adapter_request, timeout, || {
            instance.poll_all(false);
        })
        .map_err(|err| InitError::new(InitStage::Adapter, err.to_string()))?
        .map_err(|err| InitError::new(InitStage::Adapter, err.to_string()))?;

        let info = adapter.get_info();
        log::info!(
            "using adapter '{}' ({:?}, {:?})",
            info.name,
            info.backend,
            info.device_type
        );

        let device_request = adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Raijin Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: Default::default(),
            experimental_features: Default::default(),
        });
        let (device, queue) = block_on_pumped(device_request, timeout, || {
            instance.poll_all(false);
        })
        .map_err(|err| InitError::new(InitStage::Device, err.to_string()))?
        .map_err(|err| InitError::new(InitStage::Device, err.to_string()))?;

        log::info!("device acquired");

        Ok(Self {
            queue,
            device,
            adapter,
            instance,
        })
    }

    /// Releases the queue, device and adapter, then acquires them again from
    /// the same instance.
    pub fn reacquire(
        self,
        compatible_surface: Option<&wgpu::Surface<'_>>,
        config: &RendererConfig,
    ) -> Result<Self, InitError> {
        let Self {
            queue,
            device,
            adapter,
            instance,
        } = self;
        drop(queue);
        drop(device);
        drop(adapter);
        Self::acquire(instance, compatible_surface, config)
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }
}

/// The wait for an acquisition future ran past its deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TimedOut(pub Duration);

impl std::fmt::Display for TimedOut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timed out after {:?}", self.0)
    }
}

/// Set by the waker when the future can make progress.
#[derive(Default)]
struct CompletionFlag(AtomicBool);

impl CompletionFlag {
    fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

impl Wake for CompletionFlag {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.0.store(true, Ordering::Release);
    }
}

/// Drives `future` to completion on the current thread.
///
/// With no timeout this is `pollster::block_on`. Otherwise the future is polled
/// whenever the completion flag is raised, calling `pump` in between, until it
/// resolves or the deadline passes.
pub(crate) fn block_on_pumped<F: Future>(
    future: F,
    timeout: Option<Duration>,
    mut pump: impl FnMut(),
) -> Result<F::Output, TimedOut> {
    let Some(timeout) = timeout else {
        return Ok(pollster::block_on(future));
    };

    let started = Instant::now();
    let flag = Arc::new(CompletionFlag::default());
    let waker = Waker::from(Arc::clone(&flag));
    let mut cx = Context::from_waker(&waker);
    let mut future = pin!(future);

    loop {
        if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
            return Ok(output);
        }

        while !flag.take() {
            if started.elapsed() >= timeout {
                return Err(TimedOut(timeout));
            }
            pump();
            std::thread::yield_now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Resolves after `remaining` pumps; wakes once it is ready.
    struct Countdown<'a> {
        remaining: &'a Cell<u32>,
        waker: &'a std::cell::RefCell<Option<Waker>>,
        result: Result<u32, &'static str>,
    }

    impl Future for Countdown<'_> {
        type Output = Result<u32, &'static str>;

        fn poll(self: std::pin::Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
            if self.remaining.get() == 0 {
                Poll::Ready(self.result)
            } else {
                *self.waker.borrow_mut() = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }

    fn pump_down<'a>(
        remaining: &'a Cell<u32>,
        waker: &'a std::cell::RefCell<Option<Waker>>,
        pumps: &'a Cell<u32>,
    ) -> impl FnMut() + 'a {
        move || {
            pumps.set(pumps.get() + 1);
            if remaining.get() > 0 {
                remaining.set(remaining.get() - 1);
                if remaining.get() == 0 {
                    if let Some(w) = waker.borrow_mut().take() {
                        w.wake();
                    }
                }
            }
        }
    }

    #[test]
    fn pending_then_ready_pumps_until_flag() {
        let remaining = Cell::new(3);
        let waker = Default::default();
        let pumps = Cell::new(0);
        let future = Countdown {
            remaining: &remaining,
            waker: &waker,
            result: Ok(7),
        };

        let out = block_on_pumped(
            future,
            Some(Duration::from_secs(5)),
            pump_down(&remaining, &waker, &pumps),
        );
        assert_eq!(out, Ok(Ok(7)));
        assert_eq!(pumps.get(), 3);
    }

    #[test]
    fn failure_is_returned_without_retry() {
        let remaining = Cell::new(1);
        let waker = Default::default();
        let pumps = Cell::new(0);
        let future = Countdown {
            remaining: &remaining,
            waker: &waker,
            result: Err("device request rejected"),
        };

        let out = block_on_pumped(
            future,
            Some(Duration::from_secs(5)),
            pump_down(&remaining, &waker, &pumps),
        );
        assert_eq!(out, Ok(Err("device request rejected")));
        assert_eq!(pumps.get(), 1);
    }

    #[test]
    fn never_ready_times_out() {
        let out = block_on_pumped(
            std::future::pending::<()>(),
            Some(Duration::from_millis(20)),
            || {},
        );
        assert_eq!(out, Err(TimedOut(Duration::from_millis(20))));
    }

    #[test]
    fn ready_future_needs_no_pump() {
        let mut pumped = false;
        let out = block_on_pumped(std::future::ready(1), Some(Duration::ZERO), || pumped = true);
        assert_eq!(out, Ok(1));
        assert!(!pumped);
    }

    #[test]
    fn no_timeout_blocks_until_ready() {
        assert_eq!(block_on_pumped(std::future::ready("ok"), None, || {}), Ok("ok"));
    }

    #[test]
    fn reacquire_hands_back_a_working_device() {
        let config = RendererConfig::default();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: config.backends,
            ..Default::default()
        });
        let context = match DeviceContext::acquire(instance, None, &config) {
            Ok(context) => context,
            Err(err) => {
                eprintln!("skipping GPU test: {err}");
                return;
            }
        };
        let first = context.adapter_info();

        let context = context
            .reacquire(None, &config)
            .expect("second acquisition from the same instance");
        assert_eq!(context.adapter_info().name, first.name);
        assert_eq!(context.adapter_info().backend, first.backend);

        let buffer = crate::scope::capture_all(&context.device, || {
            context.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Reacquired"),
                size: 16,
                usage: wgpu::BufferUsages::VERTEX,
                mapped_at_creation: false,
            })
        });
        assert!(buffer.is_ok());
    }
}
