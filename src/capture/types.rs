//! Data types shared by the window enumerator, the capture engine and the backends.

use image::{ImageBuffer, RgbaImage};
use std::fmt;

/// Opaque OS identifier of a top-level window.
///
/// Only meaningful while the window exists; never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowHandle(isize);

impl WindowHandle {
    pub fn from_raw(raw: isize) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> isize {
        self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A top-level window as reported by the OS, before any filtering.
#[derive(Clone, Debug)]
pub struct TopLevelWindow {
    pub handle: WindowHandle,
    pub title: String,
    pub visible: bool,
}

/// A visible, titled window eligible for listing and matching.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowInfo {
    pub handle: WindowHandle,
    pub title: String,
}

/// Screen-space edges as the OS reports them. May describe an empty or inverted area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    /// Builds bounds from an origin and a (possibly non-positive) size.
    pub fn from_origin_size(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            right: left.saturating_add(width),
            bottom: top.saturating_add(height),
        }
    }

    pub fn width(&self) -> i64 {
        self.right as i64 - self.left as i64
    }

    pub fn height(&self) -> i64 {
        self.bottom as i64 - self.top as i64
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width(),
            self.height(),
            self.left,
            self.top
        )
    }
}

/// A capturable screen rectangle. Width and height are always non-zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rectangle {
    left: i32,
    top: i32,
    width: u32,
    height: u32,
}

impl Rectangle {
    /// Returns `None` when the bounds have a non-positive width or height.
    pub fn from_bounds(bounds: Bounds) -> Option<Self> {
        let width = u32::try_from(bounds.width()).ok().filter(|w| *w > 0)?;
        let height = u32::try_from(bounds.height()).ok().filter(|h| *h > 0)?;
        Some(Self {
            left: bounds.left,
            top: bounds.top,
            width,
            height,
        })
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.left, self.top
        )
    }
}

/// Captured pixels in RGBA order, 4 bytes per pixel, rows top to bottom.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Wraps raw RGBA bytes. Returns `None` unless `pixels.len() == width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(Self::BYTES_PER_PIXEL)?;
        if pixels.len() != expected {
            return None;
        }
        ImageBuffer::from_raw(width, height, pixels).map(|image| Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        Self { image }
    }
}

/// What to capture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureRequest {
    FullScreen,
    /// First visible window whose title contains the substring, ignoring case.
    WindowByTitle(String),
}

impl fmt::Display for CaptureRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureRequest::FullScreen => write!(f, "full screen"),
            CaptureRequest::WindowByTitle(title) => write!(f, "window containing '{}'", title),
        }
    }
}

/// A successful capture: the pixels and the screen rectangle they came from.
#[derive(Debug)]
pub struct Capture {
    pub buffer: PixelBuffer,
    pub rect: Rectangle,
    /// Full title of the matched window, `None` for full-screen captures.
    pub window_title: Option<String>,
}
