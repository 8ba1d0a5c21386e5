//! Launcher defaults loaded from config.json.
//!
//! The file is optional and read-only: command-line flags override every
//! value, and a missing or malformed file falls back to the built-in defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::encode::{DEFAULT_JPEG_QUALITY, ImageFormat};

/// Name of the config file looked up next to the executable.
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory for screenshots when no `--output` is given
    pub output_dir: String,
    /// chrono format string for generated file names, without extension
    pub filename_template: String,
    /// Format used when no `--format` is given
    pub format: ImageFormat,
    /// JPEG quality used when no `--quality` is given (1-100)
    pub jpeg_quality: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: "screenshots".to_string(),
            filename_template: "screenshot_%Y%m%d_%H%M%S".to_string(),
            format: ImageFormat::Png,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl Settings {
    /// Loads settings from `config_path`, or returns defaults.
    pub fn load(config_path: &Path) -> Self {
        if !config_path.exists() {
            log::debug!("{} not found. Using defaults.", config_path.display());
            return Self::default();
        }

        match fs::read_to_string(config_path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => {
                    log::debug!("Config loaded from {}", config_path.display());
                    settings
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse {}: {}. Using defaults.",
                        config_path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!(
                    "Failed to read {}: {}. Using defaults.",
                    config_path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    fn parse(contents: &str) -> serde_json::Result<Self> {
        let mut settings: Self = serde_json::from_str(contents)?;
        if !(1..=100).contains(&settings.jpeg_quality) {
            log::warn!(
                "jpeg_quality {} out of range 1-100. Using {}.",
                settings.jpeg_quality,
                DEFAULT_JPEG_QUALITY
            );
            settings.jpeg_quality = DEFAULT_JPEG_QUALITY;
        }
        Ok(settings)
    }
}
