//! Platform capability interface for window enumeration and pixel transfer.

use thiserror::Error;

use super::types::{Bounds, PixelBuffer, Rectangle, TopLevelWindow, WindowHandle};

/// A failed OS call inside a backend.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct BackendError(String);

impl BackendError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for BackendError {
    fn from(err: windows::core::Error) -> Self {
        Self(err.to_string())
    }
}

/// Everything the capture pipeline needs from the operating system.
///
/// Implementations hold no state between calls: every query goes to the OS.
pub trait CaptureBackend {
    /// All top-level windows in the order the OS reports them.
    ///
    /// A refused enumeration yields whatever was collected so far (possibly
    /// nothing) instead of an error.
    fn top_level_windows(&self) -> Vec<TopLevelWindow>;

    /// Screen-space bounds of a window.
    fn window_bounds(&self, handle: WindowHandle) -> Result<Bounds, BackendError>;

    /// Bounds of the virtual desktop spanning every monitor.
    fn virtual_screen(&self) -> Result<Bounds, BackendError>;

    /// Copies the given screen region into a new buffer of the same size.
    ///
    /// Any OS resources acquired here must be released before returning,
    /// on success and on failure.
    fn transfer(&self, rect: &Rectangle) -> Result<PixelBuffer, BackendError>;
}
