//! Failure taxonomy for the capture pipeline.
//!
//! Every variant is terminal for the current invocation and carries enough
//! context (title, rectangle, path) to diagnose the problem without rerunning.

use std::path::PathBuf;
use thiserror::Error;

use crate::capture::{BackendError, Bounds};
use crate::encode::ImageFormat;

#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error("Window containing '{title}' not found")]
    WindowNotFound { title: String },

    #[error("Invalid dimensions for {target}: {bounds}")]
    InvalidGeometry { target: String, bounds: Bounds },

    #[error("Failed to capture {target}")]
    CaptureFailed {
        target: String,
        #[source]
        source: BackendError,
    },

    #[error("Failed to encode {format} image for {}", .path.display())]
    EncodeFailure {
        path: PathBuf,
        format: ImageFormat,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot write {}", .path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ScreenshotResult<T> = Result<T, ScreenshotError>;
