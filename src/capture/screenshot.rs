//! Screen capture engine: resolves the target rectangle and transfers its pixels.

use crate::error::{ScreenshotError, ScreenshotResult};

use super::backend::CaptureBackend;
use super::types::{Bounds, Capture, CaptureRequest, Rectangle};
use super::window::{enumerate_windows, find_window};

/// Captures the region selected by `request`.
///
/// Full-screen requests cover the whole virtual desktop. Window requests pick
/// the first enumerated window whose title contains the substring; a missing
/// match is an error and never falls back to a full-screen capture.
pub fn capture<B: CaptureBackend + ?Sized>(
    backend: &B,
    request: &CaptureRequest,
) -> ScreenshotResult<Capture> {
    match request {
        CaptureRequest::FullScreen => capture_full_screen(backend),
        CaptureRequest::WindowByTitle(title) => capture_window(backend, title),
    }
}

fn capture_full_screen<B: CaptureBackend + ?Sized>(backend: &B) -> ScreenshotResult<Capture> {
    log::info!("Capturing full screen...");
    let target = "virtual screen".to_string();

    let bounds = backend
        .virtual_screen()
        .map_err(|source| ScreenshotError::CaptureFailed {
            target: target.clone(),
            source,
        })?;
    log::debug!("Virtual screen: {}", bounds);

    capture_bounds(backend, target, bounds, None)
}

fn capture_window<B: CaptureBackend + ?Sized>(
    backend: &B,
    title: &str,
) -> ScreenshotResult<Capture> {
    log::info!("Searching for window: '{}'...", title);

    let windows = enumerate_windows(backend);
    let window = find_window(&windows, title).ok_or_else(|| ScreenshotError::WindowNotFound {
        title: title.to_string(),
    })?;
    log::info!("Found window: '{}' ({})", window.title, window.handle);

    let target = format!("window '{}'", window.title);
    let bounds = backend
        .window_bounds(window.handle)
        .map_err(|source| ScreenshotError::CaptureFailed {
            target: target.clone(),
            source,
        })?;
    log::debug!("Window bounds: {}", bounds);

    capture_bounds(backend, target, bounds, Some(window.title.clone()))
}

/// Validates the geometry, then performs the single pixel transfer.
fn capture_bounds<B: CaptureBackend + ?Sized>(
    backend: &B,
    target: String,
    bounds: Bounds,
    window_title: Option<String>,
) -> ScreenshotResult<Capture> {
    let Some(rect) = Rectangle::from_bounds(bounds) else {
        return Err(ScreenshotError::InvalidGeometry { target, bounds });
    };

    let buffer = backend
        .transfer(&rect)
        .map_err(|source| ScreenshotError::CaptureFailed {
            target: format!("{} ({})", target, rect),
            source,
        })?;

    if buffer.width() != rect.width() || buffer.height() != rect.height() {
        return Err(ScreenshotError::CaptureFailed {
            target: format!("{} ({})", target, rect),
            source: super::BackendError::new(format!(
                "transfer returned {}x{} pixels",
                buffer.width(),
                buffer.height()
            )),
        });
    }

    log::debug!("Captured {}", rect);
    Ok(Capture {
        buffer,
        rect,
        window_title,
    })
}
