//! Image encoding and saving.
//!
//! The image is encoded fully in memory, then written to a temporary file in
//! the destination directory and renamed over the final path. A codec error
//! therefore never leaves a partial file behind.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use image::codecs::bmp::BmpEncoder;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError, ImageResult};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::capture::PixelBuffer;
use crate::error::{ScreenshotError, ScreenshotResult};

/// JPEG quality used when none is given.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// NeuQuant sampling speed for GIF palette reduction (1 = best, 30 = fastest).
const GIF_QUANTIZE_SPEED: i32 = 10;

/// Supported output formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    #[value(alias = "jpg")]
    #[serde(alias = "jpg")]
    Jpeg,
    Bmp,
    Gif,
}

impl ImageFormat {
    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Gif => "gif",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Bmp => "BMP",
            ImageFormat::Gif => "GIF",
        };
        f.write_str(name)
    }
}

/// Output format and JPEG quality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    pub format: ImageFormat,
    /// 1..=100, only used for JPEG.
    pub quality: u8,
}

impl EncodeOptions {
    /// Builds options, clamping quality into 1..=100.
    pub fn new(format: ImageFormat, quality: u8) -> Self {
        Self {
            format,
            quality: quality.clamp(1, 100),
        }
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::new(ImageFormat::Png, DEFAULT_JPEG_QUALITY)
    }
}

/// Returns `path` with its extension replaced by the canonical one for `format`,
/// unless it already matches ignoring case.
///
/// `shot.jpg` requested as PNG becomes `shot.png`; `shot` becomes `shot.png`.
pub fn corrected_path(path: &Path, format: ImageFormat) -> PathBuf {
    let wanted = format.extension();
    let matches = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted));

    if matches {
        path.to_path_buf()
    } else {
        path.with_extension(wanted)
    }
}

/// Encodes the buffer into the bytes of an image file.
pub fn encode_to_vec(buffer: &PixelBuffer, options: &EncodeOptions) -> ImageResult<Vec<u8>> {
    let (width, height) = (buffer.width(), buffer.height());
    let mut bytes = Vec::new();

    match options.format {
        ImageFormat::Png => {
            PngEncoder::new(&mut bytes).write_image(
                buffer.pixels(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )?;
        }
        ImageFormat::Jpeg => {
            let quality = options.quality.clamp(1, 100);
            JpegEncoder::new_with_quality(&mut bytes, quality).write_image(
                &rgb_bytes(buffer),
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
        ImageFormat::Bmp => {
            BmpEncoder::new(&mut bytes).write_image(
                &rgb_bytes(buffer),
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
        ImageFormat::Gif => {
            let mut encoder = GifEncoder::new_with_speed(&mut bytes, GIF_QUANTIZE_SPEED);
            encoder.encode(buffer.pixels(), width, height, ExtendedColorType::Rgba8)?;
        }
    }

    Ok(bytes)
}

/// Drops the alpha channel for formats stored as RGB.
fn rgb_bytes(buffer: &PixelBuffer) -> Vec<u8> {
    buffer
        .pixels()
        .chunks_exact(PixelBuffer::BYTES_PER_PIXEL)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect()
}

/// Encodes the buffer and writes it next to `path`, with the extension
/// corrected to match the format.
///
/// An unusable destination directory is an `IoFailure`; codec errors and
/// failures while writing the file (disk full, rename refused) are an
/// `EncodeFailure`. Returns the path actually written.
pub fn save(
    buffer: &PixelBuffer,
    path: &Path,
    options: &EncodeOptions,
) -> ScreenshotResult<PathBuf> {
    let path = corrected_path(path, options.format);
    log::info!("Saving screenshot to {}...", path.display());

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.is_dir() {
        return Err(ScreenshotError::IoFailure {
            path,
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("directory {} does not exist", dir.display()),
            ),
        });
    }

    let encode_failure = |source: ImageError| ScreenshotError::EncodeFailure {
        path: path.clone(),
        format: options.format,
        source,
    };

    let bytes = encode_to_vec(buffer, options).map_err(encode_failure)?;
    log::debug!("Encoded {} bytes as {}", bytes.len(), options.format);

    let mut file = NamedTempFile::new_in(&dir).map_err(|source| ScreenshotError::IoFailure {
        path: path.clone(),
        source,
    })?;
    let write_failure = |e: std::io::Error| encode_failure(ImageError::IoError(e));
    file.write_all(&bytes).map_err(write_failure)?;
    file.as_file().sync_all().map_err(write_failure)?;
    file.persist(&path).map_err(|e| write_failure(e.error))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use tempfile::tempdir;

    /// Opaque buffer with enough detail to make lossy codecs work for it.
    fn noisy_buffer(width: u32, height: u32) -> PixelBuffer {
        let mut state: u32 = 0x1234_5678;
        let image = ImageBuffer::from_fn(width, height, |x, y| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let noise = (state >> 24) as u8;
            Rgba([(x * 3) as u8 ^ noise, (y * 5) as u8, noise, 255])
        });
        PixelBuffer::from(image)
    }

    #[test]
    fn test_corrected_path() {
        assert_eq!(
            corrected_path(Path::new("shot.jpg"), ImageFormat::Png),
            PathBuf::from("shot.png")
        );
        assert_eq!(
            corrected_path(Path::new("out.txt"), ImageFormat::Png),
            PathBuf::from("out.png")
        );
        assert_eq!(
            corrected_path(Path::new("dir/shot"), ImageFormat::Gif),
            PathBuf::from("dir/shot.gif")
        );
        assert_eq!(
            corrected_path(Path::new("SHOT.JPG"), ImageFormat::Jpeg),
            PathBuf::from("SHOT.JPG")
        );
        assert_eq!(
            corrected_path(Path::new("shot.jpeg"), ImageFormat::Jpeg),
            PathBuf::from("shot.jpg")
        );
    }

    #[test]
    fn test_save_rewrites_extension() {
        let dir = tempdir().unwrap();
        let requested = dir.path().join("shot.jpg");

        let written = save(&noisy_buffer(16, 16), &requested, &EncodeOptions::default()).unwrap();

        assert_eq!(written, dir.path().join("shot.png"));
        assert!(written.exists());
        assert!(!requested.exists());
    }

    #[test]
    fn test_png_round_trip_is_lossless() {
        let dir = tempdir().unwrap();
        let buffer = noisy_buffer(64, 48);

        let options = EncodeOptions::new(ImageFormat::Png, 90);
        let path = save(&buffer, &dir.path().join("a.png"), &options).unwrap();
        let decoded = image::open(&path).unwrap().to_rgba8();

        assert_eq!(decoded.dimensions(), (64, 48));
        assert_eq!(decoded.as_raw().as_slice(), buffer.pixels());
    }

    #[test]
    fn test_bmp_round_trip_is_lossless() {
        let dir = tempdir().unwrap();
        let buffer = noisy_buffer(37, 21);

        let options = EncodeOptions::new(ImageFormat::Bmp, 90);
        let path = save(&buffer, &dir.path().join("a.bmp"), &options).unwrap();
        let decoded = image::open(&path).unwrap().to_rgba8();

        assert_eq!(decoded.dimensions(), (37, 21));
        assert_eq!(decoded.as_raw().as_slice(), buffer.pixels());
    }

    #[test]
    fn test_jpeg_quality_affects_size() {
        let buffer = noisy_buffer(128, 128);

        let high = encode_to_vec(&buffer, &EncodeOptions::new(ImageFormat::Jpeg, 100)).unwrap();
        let low = encode_to_vec(&buffer, &EncodeOptions::new(ImageFormat::Jpeg, 10)).unwrap();

        assert!(high.len() >= low.len(), "q100={} q10={}", high.len(), low.len());
    }

    #[test]
    fn test_quality_ignored_for_lossless_formats() {
        let buffer = noisy_buffer(32, 32);

        for format in [ImageFormat::Png, ImageFormat::Bmp, ImageFormat::Gif] {
            let a = encode_to_vec(&buffer, &EncodeOptions::new(format, 10)).unwrap();
            let b = encode_to_vec(&buffer, &EncodeOptions::new(format, 100)).unwrap();
            assert_eq!(a, b, "{} output changed with quality", format);
        }
    }

    #[test]
    fn test_gif_decodes_with_same_dimensions() {
        let dir = tempdir().unwrap();
        let path = save(
            &noisy_buffer(40, 30),
            &dir.path().join("anim"),
            &EncodeOptions::new(ImageFormat::Gif, 90),
        )
        .unwrap();

        assert_eq!(path.extension().unwrap(), "gif");
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
    }

    #[test]
    fn test_missing_directory_is_io_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("shot.png");

        let err = save(&noisy_buffer(4, 4), &path, &EncodeOptions::default()).unwrap_err();

        assert!(matches!(err, ScreenshotError::IoFailure { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_codec_rejection_is_encode_failure() {
        let dir = tempdir().unwrap();

        // GIF frames are limited to 65535 pixels per side
        let err = save(
            &noisy_buffer(70_000, 1),
            &dir.path().join("wide"),
            &EncodeOptions::new(ImageFormat::Gif, 90),
        )
        .unwrap_err();

        match err {
            ScreenshotError::EncodeFailure { path, format, .. } => {
                assert_eq!(path, dir.path().join("wide.gif"));
                assert_eq!(format, ImageFormat::Gif);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_write_is_encode_failure() {
        let dir = tempdir().unwrap();
        // A directory occupying the target name makes the final rename fail
        let blocked = dir.path().join("shot.png");
        std::fs::create_dir(&blocked).unwrap();

        let err = save(&noisy_buffer(8, 8), &blocked, &EncodeOptions::default()).unwrap_err();

        match err {
            ScreenshotError::EncodeFailure { path, source, .. } => {
                assert_eq!(path, blocked);
                assert!(matches!(source, ImageError::IoError(_)));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(blocked.is_dir());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_quality_is_clamped() {
        assert_eq!(EncodeOptions::new(ImageFormat::Jpeg, 0).quality, 1);
        assert_eq!(EncodeOptions::new(ImageFormat::Jpeg, 255).quality, 100);
    }
}
