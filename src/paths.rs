use chrono::{DateTime, Local};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::{CONFIG_FILE_NAME, Settings};

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the config file path: `<exe_dir>/config.json`
pub fn get_config_path() -> PathBuf {
    get_exe_dir().join(CONFIG_FILE_NAME)
}

/// Builds the default output path, e.g. `screenshots/screenshot_20240101_120000.png`.
/// An invalid `filename_template` falls back to the default template.
pub fn default_output_path(settings: &Settings, now: DateTime<Local>) -> PathBuf {
    let mut stem = String::new();
    if write!(stem, "{}", now.format(&settings.filename_template)).is_err() {
        log::warn!(
            "Invalid filename_template '{}'. Using default.",
            settings.filename_template
        );
        stem.clear();
        let fallback = Settings::default().filename_template;
        let _ = write!(stem, "{}", now.format(&fallback));
    }
    let filename = format!("{}.{}", stem, settings.format.extension());
    Path::new(&settings.output_dir).join(filename)
}

/// Creates the parent directory of `path` if it is missing.
pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            log::info!("Creating directory {}", parent.display());
            std::fs::create_dir_all(parent)
        }
        _ => Ok(()),
    }
}
