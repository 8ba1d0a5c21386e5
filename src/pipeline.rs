//! One screenshot from request to file: delay, capture, encode, report.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use serde::Serialize;

use crate::capture::{self, CaptureBackend, CaptureRequest};
use crate::encode::{self, EncodeOptions, ImageFormat};
use crate::error::{ScreenshotError, ScreenshotResult};

/// Everything needed to take and save one screenshot.
#[derive(Clone, Debug)]
pub struct CaptureJob {
    pub request: CaptureRequest,
    /// Requested destination; the extension may be corrected on save.
    pub output: PathBuf,
    pub options: EncodeOptions,
    /// Wait before capturing. No backend call happens until it elapses.
    pub delay: Duration,
}

/// Report of a saved screenshot.
#[derive(Clone, Debug, Serialize)]
pub struct SavedScreenshot {
    pub path: PathBuf,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub file_size_bytes: u64,
    /// Title of the window that was captured, absent for full-screen captures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,
}

/// Runs the job against `backend`.
///
/// `on_tick` is called with the remaining whole seconds once per second of
/// the delay, so a caller can draw a countdown, then once with 0 when the
/// delay is over and the capture is about to start. Once the capture starts it
/// runs to completion or failure; the pixel buffer is released as soon as
/// encoding returns, whatever the outcome.
pub fn take_screenshot<B, F>(
    backend: &B,
    job: &CaptureJob,
    on_tick: F,
) -> ScreenshotResult<SavedScreenshot>
where
    B: CaptureBackend + ?Sized,
    F: FnMut(u64),
{
    wait(job.delay, on_tick);

    let mut captured = capture::capture(backend, &job.request)?;
    let (width, height) = (captured.buffer.width(), captured.buffer.height());

    let path = encode::save(&captured.buffer, &job.output, &job.options)?;
    let window = captured.window_title.take();
    drop(captured);

    let file_size_bytes = std::fs::metadata(&path)
        .map_err(|source| ScreenshotError::IoFailure {
            path: path.clone(),
            source,
        })?
        .len();

    log::info!(
        "Saved {}x{} {} screenshot to {} ({} bytes)",
        width,
        height,
        job.options.format,
        path.display(),
        file_size_bytes
    );

    Ok(SavedScreenshot {
        path,
        format: job.options.format,
        width,
        height,
        file_size_bytes,
        window,
    })
}

/// Sleeps for `delay`, reporting the remaining whole seconds before each one
/// and 0 once it has elapsed. A zero delay reports nothing.
fn wait<F: FnMut(u64)>(delay: Duration, mut on_tick: F) {
    if delay.is_zero() {
        return;
    }

    let whole_secs = delay.as_secs();
    for remaining in (1..=whole_secs).rev() {
        on_tick(remaining);
        thread::sleep(Duration::from_secs(1));
    }
    thread::sleep(delay - Duration::from_secs(whole_secs));
    on_tick(0);
}
