//! GDI capture backend for Windows.
//!
//! Window discovery uses `EnumWindows`; pixels are copied from the screen
//! device context with `BitBlt` and read back with `GetDIBits`. Every GDI
//! object is owned by a guard that releases it on drop, so early returns and
//! failed calls never leak device contexts or bitmaps.

use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;

use windows::Win32::Foundation::{BOOL, HWND, LPARAM, RECT, TRUE};
use windows::Win32::Graphics::Gdi::{
    BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BitBlt, CreateCompatibleBitmap, CreateCompatibleDC,
    DIB_RGB_COLORS, DeleteDC, DeleteObject, GetDC, GetDIBits, HBITMAP, HDC, HGDIOBJ, ReleaseDC,
    SRCCOPY, SelectObject,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetSystemMetrics, GetWindowRect, GetWindowTextLengthW, GetWindowTextW,
    IsWindowVisible, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN, SM_YVIRTUALSCREEN,
};

use super::backend::{BackendError, CaptureBackend};
use super::types::{Bounds, PixelBuffer, Rectangle, TopLevelWindow, WindowHandle};

/// Capture backend built on user32 and gdi32.
#[derive(Debug, Default)]
pub struct GdiBackend;

impl GdiBackend {
    pub fn new() -> Self {
        Self
    }
}

fn to_hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.as_raw() as *mut _)
}

/// Reads a window title, returning an empty string for untitled windows.
fn window_title(hwnd: HWND) -> String {
    unsafe {
        let title_len = GetWindowTextLengthW(hwnd);
        if title_len <= 0 {
            return String::new();
        }
        let mut title_buf: Vec<u16> = vec![0; (title_len + 1) as usize];
        let copied = GetWindowTextW(hwnd, &mut title_buf);
        let copied = copied.clamp(0, title_len) as usize;
        OsString::from_wide(&title_buf[..copied])
            .to_string_lossy()
            .to_string()
    }
}

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    unsafe {
        let windows = &mut *(lparam.0 as *mut Vec<TopLevelWindow>);
        windows.push(TopLevelWindow {
            handle: WindowHandle::from_raw(hwnd.0 as isize),
            title: window_title(hwnd),
            visible: IsWindowVisible(hwnd).as_bool(),
        });
    }
    TRUE
}

impl CaptureBackend for GdiBackend {
    fn top_level_windows(&self) -> Vec<TopLevelWindow> {
        let mut windows: Vec<TopLevelWindow> = Vec::new();
        let result = unsafe {
            EnumWindows(
                Some(collect_window),
                LPARAM(&mut windows as *mut Vec<TopLevelWindow> as isize),
            )
        };
        if let Err(e) = result {
            log::warn!("EnumWindows failed after {} windows: {}", windows.len(), e);
        }
        windows
    }

    fn window_bounds(&self, handle: WindowHandle) -> Result<Bounds, BackendError> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(to_hwnd(handle), &mut rect)? };
        Ok(Bounds {
            left: rect.left,
            top: rect.top,
            right: rect.right,
            bottom: rect.bottom,
        })
    }

    fn virtual_screen(&self) -> Result<Bounds, BackendError> {
        let (left, top, width, height) = unsafe {
            (
                GetSystemMetrics(SM_XVIRTUALSCREEN),
                GetSystemMetrics(SM_YVIRTUALSCREEN),
                GetSystemMetrics(SM_CXVIRTUALSCREEN),
                GetSystemMetrics(SM_CYVIRTUALSCREEN),
            )
        };
        Ok(Bounds::from_origin_size(left, top, width, height))
    }

    fn transfer(&self, rect: &Rectangle) -> Result<PixelBuffer, BackendError> {
        let width = i32::try_from(rect.width())
            .map_err(|_| BackendError::new(format!("width {} too large", rect.width())))?;
        let height = i32::try_from(rect.height())
            .map_err(|_| BackendError::new(format!("height {} too large", rect.height())))?;

        let screen = ScreenDc::acquire()?;
        let memory = MemoryDc::compatible_with(&screen)?;
        let bitmap = Bitmap::compatible_with(&screen, width, height)?;

        {
            let _selected = Selection::select(&memory, &bitmap)?;
            unsafe {
                BitBlt(
                    memory.0,
                    0,
                    0,
                    width,
                    height,
                    screen.0,
                    rect.left(),
                    rect.top(),
                    SRCCOPY,
                )?;
            }
        }

        // GetDIBits requires the bitmap to be deselected, hence the scope above.
        let mut info = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                // Negative height: top-down rows
                biHeight: -height,
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut pixels = vec![0u8; rect.width() as usize * rect.height() as usize * 4];
        let lines = unsafe {
            GetDIBits(
                memory.0,
                bitmap.0,
                0,
                rect.height(),
                Some(pixels.as_mut_ptr().cast()),
                &mut info,
                DIB_RGB_COLORS,
            )
        };
        if lines != height {
            return Err(BackendError::new(format!(
                "GetDIBits copied {} of {} rows",
                lines, height
            )));
        }

        // BGRX -> RGBA; GDI leaves the fourth byte undefined
        for px in pixels.chunks_exact_mut(4) {
            px.swap(0, 2);
            px[3] = 255;
        }

        PixelBuffer::from_rgba(rect.width(), rect.height(), pixels)
            .ok_or_else(|| BackendError::new("pixel buffer size mismatch"))
    }
}

/// Device context of the whole screen, released with `ReleaseDC`.
struct ScreenDc(HDC);

impl ScreenDc {
    fn acquire() -> Result<Self, BackendError> {
        let hdc = unsafe { GetDC(HWND::default()) };
        if hdc.is_invalid() {
            return Err(BackendError::new("GetDC failed for the screen"));
        }
        Ok(Self(hdc))
    }
}

impl Drop for ScreenDc {
    fn drop(&mut self) {
        unsafe {
            let _ = ReleaseDC(HWND::default(), self.0);
        }
    }
}

/// Memory device context, deleted with `DeleteDC`.
struct MemoryDc(HDC);

impl MemoryDc {
    fn compatible_with(screen: &ScreenDc) -> Result<Self, BackendError> {
        let hdc = unsafe { CreateCompatibleDC(screen.0) };
        if hdc.is_invalid() {
            return Err(BackendError::new("CreateCompatibleDC failed"));
        }
        Ok(Self(hdc))
    }
}

impl Drop for MemoryDc {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteDC(self.0);
        }
    }
}

/// Screen-compatible bitmap, deleted with `DeleteObject`.
struct Bitmap(HBITMAP);

impl Bitmap {
    fn compatible_with(screen: &ScreenDc, width: i32, height: i32) -> Result<Self, BackendError> {
        let bitmap = unsafe { CreateCompatibleBitmap(screen.0, width, height) };
        if bitmap.is_invalid() {
            return Err(BackendError::new(format!(
                "CreateCompatibleBitmap failed for {}x{}",
                width, height
            )));
        }
        Ok(Self(bitmap))
    }
}

impl Drop for Bitmap {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteObject(HGDIOBJ(self.0.0));
        }
    }
}

/// A bitmap selected into a memory DC; the previous object is restored on drop.
struct Selection<'a> {
    dc: &'a MemoryDc,
    previous: HGDIOBJ,
}

impl<'a> Selection<'a> {
    fn select(dc: &'a MemoryDc, bitmap: &Bitmap) -> Result<Self, BackendError> {
        let previous = unsafe { SelectObject(dc.0, HGDIOBJ(bitmap.0.0)) };
        if previous.is_invalid() {
            return Err(BackendError::new("SelectObject failed"));
        }
        Ok(Self { dc, previous })
    }
}

impl Drop for Selection<'_> {
    fn drop(&mut self) {
        unsafe {
            let _ = SelectObject(self.dc.0, self.previous);
        }
    }
}
