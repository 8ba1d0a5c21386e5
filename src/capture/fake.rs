//! Deterministic in-memory backend for tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Instant;

use image::{ImageBuffer, Rgba};

use super::backend::{BackendError, CaptureBackend};
use super::types::{Bounds, PixelBuffer, Rectangle, TopLevelWindow, WindowHandle};

/// Screen contents are a pure function of absolute screen coordinates, so the
/// pixels of any captured region can be predicted by tests.
pub fn screen_pixel(x: i32, y: i32) -> Rgba<u8> {
    Rgba([
        (x.rem_euclid(256)) as u8,
        (y.rem_euclid(256)) as u8,
        ((x ^ y).rem_euclid(256)) as u8,
        255,
    ])
}

pub struct FakeBackend {
    screen: Bounds,
    windows: Vec<TopLevelWindow>,
    bounds: HashMap<WindowHandle, Bounds>,
    fail_transfer: bool,
    transfers: RefCell<Vec<(Rectangle, Instant)>>,
}

impl FakeBackend {
    pub fn single_monitor(width: i32, height: i32) -> Self {
        Self::with_screen(Bounds::from_origin_size(0, 0, width, height))
    }

    pub fn with_screen(screen: Bounds) -> Self {
        Self {
            screen,
            windows: Vec::new(),
            bounds: HashMap::new(),
            fail_transfer: false,
            transfers: RefCell::new(Vec::new()),
        }
    }

    /// Adds a window with default bounds of 800x600 at (100, 100).
    pub fn with_window(self, handle: isize, title: &str, visible: bool) -> Self {
        self.with_window_bounds(
            handle,
            title,
            visible,
            Bounds::from_origin_size(100, 100, 800, 600),
        )
    }

    pub fn with_window_bounds(
        mut self,
        handle: isize,
        title: &str,
        visible: bool,
        bounds: Bounds,
    ) -> Self {
        let handle = WindowHandle::from_raw(handle);
        self.windows.push(TopLevelWindow {
            handle,
            title: title.to_string(),
            visible,
        });
        self.bounds.insert(handle, bounds);
        self
    }

    /// Adds a visible window that is gone by the time its bounds are queried.
    pub fn with_closed_window(mut self, handle: isize, title: &str) -> Self {
        self.windows.push(TopLevelWindow {
            handle: WindowHandle::from_raw(handle),
            title: title.to_string(),
            visible: true,
        });
        self
    }

    /// Makes every pixel transfer fail, as when a window closes mid-capture.
    pub fn failing_transfers(mut self) -> Self {
        self.fail_transfer = true;
        self
    }

    /// Rectangles passed to `transfer`, with the instant of each call.
    pub fn transfers(&self) -> Vec<(Rectangle, Instant)> {
        self.transfers.borrow().clone()
    }
}

impl CaptureBackend for FakeBackend {
    fn top_level_windows(&self) -> Vec<TopLevelWindow> {
        self.windows.clone()
    }

    fn window_bounds(&self, handle: WindowHandle) -> Result<Bounds, BackendError> {
        self.bounds
            .get(&handle)
            .copied()
            .ok_or_else(|| BackendError::new(format!("invalid window handle {}", handle)))
    }

    fn virtual_screen(&self) -> Result<Bounds, BackendError> {
        Ok(self.screen)
    }

    fn transfer(&self, rect: &Rectangle) -> Result<PixelBuffer, BackendError> {
        self.transfers.borrow_mut().push((*rect, Instant::now()));
        if self.fail_transfer {
            return Err(BackendError::new("BitBlt failed: the window was destroyed"));
        }

        let (left, top) = (rect.left(), rect.top());
        let image = ImageBuffer::from_fn(rect.width(), rect.height(), |x, y| {
            screen_pixel(left + x as i32, top + y as i32)
        });
        Ok(PixelBuffer::from(image))
    }
}
