//! Window discovery: enumeration, title matching and the window listing.

use super::backend::CaptureBackend;
use super::types::WindowInfo;

/// Width of the title column in the window listing.
const TITLE_COLUMN_WIDTH: usize = 50;

/// Returns every visible top-level window with a non-empty title, in OS order.
///
/// Whitespace-only titles are kept, so they can still be matched by title.
/// The order is whatever the OS presents and is not stable across calls.
pub fn enumerate_windows<B: CaptureBackend + ?Sized>(backend: &B) -> Vec<WindowInfo> {
    let windows: Vec<WindowInfo> = backend
        .top_level_windows()
        .into_iter()
        .filter(|w| w.visible && !w.title.is_empty())
        .map(|w| WindowInfo {
            handle: w.handle,
            title: w.title,
        })
        .collect();

    log::debug!("Enumerated {} visible windows", windows.len());
    windows
}

/// Finds the first window, in enumeration order, whose title contains `needle`
/// ignoring case.
///
/// When several titles match, the earliest one wins even if a later title is a
/// closer match. Since enumeration order is unspecified by the OS, the chosen
/// window can differ between runs with the same set of windows open.
pub fn find_window<'a>(windows: &'a [WindowInfo], needle: &str) -> Option<&'a WindowInfo> {
    let needle = needle.to_lowercase();
    windows
        .iter()
        .find(|w| w.title.to_lowercase().contains(&needle))
}

/// Renders the window table printed by `--list-windows`.
///
/// Rows are sorted by title and windows with a blank title are left out.
/// With nothing to show a single message is returned instead of an empty
/// table.
pub fn format_window_list(windows: &[WindowInfo]) -> String {
    let mut sorted: Vec<&WindowInfo> = windows
        .iter()
        .filter(|w| !w.title.trim().is_empty())
        .collect();
    if sorted.is_empty() {
        return "No visible windows found.".to_string();
    }

    sorted.sort_by(|a, b| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.title.cmp(&b.title))
    });

    let mut out = String::new();
    out.push_str(&format!(
        "{:<width$} Handle\n",
        "Window Title",
        width = TITLE_COLUMN_WIDTH
    ));
    out.push_str(&"-".repeat(70));
    out.push('\n');

    let count = sorted.len();
    for w in sorted {
        out.push_str(&format!(
            "{:<width$} {}\n",
            fit_title(&w.title),
            w.handle,
            width = TITLE_COLUMN_WIDTH
        ));
    }

    out.push_str(&format!("\nFound {} visible windows", count));
    out
}

/// Truncates a title to the column width, marking the cut with "...".
fn fit_title(title: &str) -> String {
    if title.chars().count() <= TITLE_COLUMN_WIDTH {
        return title.to_string();
    }
    let mut cut: String = title.chars().take(TITLE_COLUMN_WIDTH - 3).collect();
    cut.push_str("...");
    cut
}
