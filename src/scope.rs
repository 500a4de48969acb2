//! Synchronous capture of wgpu device errors.
//!
//! wgpu reports allocation and validation failures asynchronously through the
//! device's error sink. Wrapping resource creation in [`capture`] turns those
//! into a plain `Result` at the call site instead of an uncaptured-error panic.

use std::fmt;

/// Which class of device error a scope captures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Scope {
    OutOfMemory,
    Validation,
}

impl Scope {
    fn filter(self) -> wgpu::ErrorFilter {
        match self {
            Scope::OutOfMemory => wgpu::ErrorFilter::OutOfMemory,
            Scope::Validation => wgpu::ErrorFilter::Validation,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::OutOfMemory => f.write_str("out of memory"),
            Scope::Validation => f.write_str("validation"),
        }
    }
}

/// Runs `f` inside an error scope and reports the first captured error.
///
/// The scope is always popped, even when `f` yields a value that is then
/// discarded because of an error.
pub(crate) fn capture<T>(
    device: &wgpu::Device,
    scope: Scope,
    f: impl FnOnce() -> T,
) -> Result<T, wgpu::Error> {
    device.push_error_scope(scope.filter());
    let value = f();
    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => {
            log::debug!("{scope} error scope captured: {err}");
            Err(err)
        }
        None => Ok(value),
    }
}

/// Runs `f` inside nested out-of-memory and validation scopes.
pub(crate) fn capture_all<T>(
    device: &wgpu::Device,
    f: impl FnOnce() -> T,
) -> Result<T, wgpu::Error> {
    capture(device, Scope::Validation, || {
        capture(device, Scope::OutOfMemory, f)
    })?
}
