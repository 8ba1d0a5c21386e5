//! Screen capture of the virtual desktop or a single window.
//!
//! This module provides:
//! - The platform capability interface (`CaptureBackend`)
//! - Window enumeration and title matching (`enumerate_windows`, `find_window`)
//! - The capture engine (`capture`)
//! - The GDI backend on Windows (`GdiBackend`)

pub mod backend;
#[cfg(test)]
pub mod fake;
#[cfg(windows)]
pub mod gdi;
pub mod screenshot;
pub mod types;
pub mod window;

pub use backend::{BackendError, CaptureBackend};
pub use screenshot::capture;
pub use types::{Bounds, CaptureRequest, PixelBuffer};
pub use window::{enumerate_windows, format_window_list};

use crate::error::ScreenshotResult;

/// Returns the capture backend for the current platform.
#[cfg(windows)]
pub fn native_backend() -> ScreenshotResult<Box<dyn CaptureBackend>> {
    Ok(Box::new(gdi::GdiBackend::new()))
}

/// Returns the capture backend for the current platform.
#[cfg(not(windows))]
pub fn native_backend() -> ScreenshotResult<Box<dyn CaptureBackend>> {
    Err(crate::error::ScreenshotError::CaptureFailed {
        target: "display".to_string(),
        source: BackendError::new(format!(
            "no screen capture backend for {}",
            std::env::consts::OS
        )),
    })
}
