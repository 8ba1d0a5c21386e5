//! Quick Screenshot
//!
//! A command-line tool that captures the whole virtual desktop or a single
//! window picked by title, and saves it as PNG, JPEG, BMP or GIF.

mod capture;
mod config;
mod encode;
mod error;
mod paths;
mod pipeline;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{ArgAction, Parser};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use capture::{CaptureRequest, enumerate_windows, format_window_list, native_backend};
use config::Settings;
use encode::{EncodeOptions, ImageFormat};
use pipeline::{CaptureJob, SavedScreenshot, take_screenshot};

#[derive(Parser, Debug)]
#[command(name = "quick-screenshot")]
#[command(version, about = "A fast CLI tool for taking screenshots")]
struct Cli {
    /// Output file path (default: screenshots/screenshot_[timestamp].png)
    #[arg(long, short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    /// Image format
    #[arg(long, short = 'f', value_enum, ignore_case = true)]
    format: Option<ImageFormat>,

    /// JPEG quality (1-100, only applies to JPEG format)
    #[arg(long, short = 'q', value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Capture a specific window by title (partial, case-insensitive match)
    #[arg(long, short = 'w', value_name = "TITLE")]
    window: Option<String>,

    /// List all available windows
    #[arg(long, short = 'l', action = ArgAction::SetTrue)]
    list_windows: bool,

    /// Delay in seconds before taking the screenshot
    #[arg(long, short = 'd', default_value_t = 0)]
    delay: u64,

    /// Print the result as JSON instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Log each capture step to stderr
    #[arg(long, short = 'v', action = ArgAction::SetTrue)]
    verbose: bool,
}

/// Sets up `log` output on stderr with millisecond timestamps.
///
/// `RUST_LOG` overrides the level picked from `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {:<5} {}",
                Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.list_windows {
        return list_windows();
    }

    let settings = Settings::load(&paths::get_config_path());
    let job = build_job(&cli, &settings);

    println!("QuickScreenshot - Taking Screenshot");
    println!("===================================");

    if let Some(parent) = job.output.parent() {
        paths::ensure_parent_dir(&job.output)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let backend = native_backend()?;

    if cli.delay > 0 {
        println!("Waiting {} seconds before capturing...", cli.delay);
    }
    let saved = take_screenshot(backend.as_ref(), &job, |remaining| {
        if remaining == 0 {
            println!("\rReady!                              ");
        } else {
            print!("\rTaking screenshot in {} seconds...", remaining);
            let _ = std::io::stdout().flush();
        }
    })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        print_report(&saved);
    }

    Ok(())
}

/// Combines command-line flags with config defaults.
fn build_job(cli: &Cli, settings: &Settings) -> CaptureJob {
    let format = cli.format.unwrap_or(settings.format);
    let quality = cli.quality.unwrap_or(settings.jpeg_quality);

    // An empty title means the whole screen
    let request = match cli.window.as_deref() {
        Some(title) if !title.is_empty() => CaptureRequest::WindowByTitle(title.to_string()),
        _ => CaptureRequest::FullScreen,
    };

    let output = cli.output.clone().unwrap_or_else(|| {
        let defaults = Settings {
            format,
            ..settings.clone()
        };
        paths::default_output_path(&defaults, Local::now())
    });

    CaptureJob {
        request,
        output,
        options: EncodeOptions::new(format, quality),
        delay: Duration::from_secs(cli.delay),
    }
}

/// Prints the table of visible windows. Finding none is not an error.
fn list_windows() -> Result<()> {
    println!("Available Windows");
    println!("=================");

    let backend = native_backend()?;
    let windows = enumerate_windows(backend.as_ref());
    let listing = format_window_list(&windows);
    if listing.starts_with("Window Title") {
        println!();
    }
    println!("{}", listing);
    Ok(())
}

fn print_report(saved: &SavedScreenshot) {
    println!("✓ Screenshot saved successfully!");
    if let Some(title) = &saved.window {
        println!("Window: '{}'", title);
    }
    println!("File Path: {}", saved.path.display());
    println!("Format: {}", saved.format);
    println!("Size: {}x{}", saved.width, saved.height);
    println!("File Size: {} KB", saved.file_size_bytes / 1024);
}
