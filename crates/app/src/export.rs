//! Image export
//!
//! Pushes the flattened capture to its destination: the system
//! clipboard via the `arboard` crate, or a PNG/JPEG file on disk.

use std::borrow::Cow;
use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use arboard::{Clipboard, ImageData};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use log::{info, warn};

/// Clipboard write attempts before giving up on a busy clipboard.
const CLIPBOARD_RETRIES: usize = 3;

/// Pause between clipboard write attempts.
const CLIPBOARD_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Output encoding for file export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg { quality: u8 },
}

/// Where the flattened capture goes.
#[derive(Debug, Clone)]
pub enum ExportSink {
    /// System clipboard.
    Clipboard,
    /// File on disk with an explicit encoding.
    File { path: PathBuf, format: OutputFormat },
}

/// Error type for export operations.
#[derive(Debug)]
pub enum ExportError {
    /// Compositing failed before any sink was touched.
    CropFailed(String),
    /// The sink cannot be reached at all.
    SinkUnavailable(String),
    /// The sink exists but another process is holding it.
    SinkLocked(String),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::CropFailed(msg) => {
                write!(f, "Failed to crop the capture: {}", msg)
            }
            ExportError::SinkUnavailable(msg) => {
                write!(f, "Export sink unavailable: {}", msg)
            }
            ExportError::SinkLocked(msg) => {
                write!(f, "Export sink locked: {}", msg)
            }
        }
    }
}

impl std::error::Error for ExportError {}

/// Write `image` to `sink`.
///
/// Clipboard writes retry a bounded number of times when the clipboard
/// is held by another process; file writes create missing parent
/// directories. Safe to call again after a failure.
pub fn export_image(image: &RgbaImage, sink: &ExportSink) -> Result<(), ExportError> {
    match sink {
        ExportSink::Clipboard => copy_image_to_clipboard(image),
        ExportSink::File { path, format } => write_image_file(image, path, *format),
    }
}

fn copy_image_to_clipboard(image: &RgbaImage) -> Result<(), ExportError> {
    let mut clipboard =
        Clipboard::new().map_err(|e| ExportError::SinkUnavailable(e.to_string()))?;

    let data = ImageData {
        width: image.width() as usize,
        height: image.height() as usize,
        bytes: Cow::Borrowed(image.as_raw()),
    };

    with_clipboard_retries(|| clipboard.set_image(data.clone()))?;
    info!("copied {}x{} capture to the clipboard", image.width(), image.height());
    Ok(())
}

/// Run a clipboard write, waiting out a busy clipboard.
///
/// Only `ClipboardOccupied` counts as transient: the write is retried
/// after a pause, and exhaustion surfaces as `SinkLocked`. Any other
/// failure is `SinkUnavailable` immediately, with no retry.
fn with_clipboard_retries(
    mut write: impl FnMut() -> Result<(), arboard::Error>,
) -> Result<(), ExportError> {
    for attempt in 1..=CLIPBOARD_RETRIES {
        match write() {
            Ok(()) => return Ok(()),
            Err(arboard::Error::ClipboardOccupied) => {
                warn!("clipboard busy, attempt {}/{}", attempt, CLIPBOARD_RETRIES);
                if attempt < CLIPBOARD_RETRIES {
                    thread::sleep(CLIPBOARD_RETRY_DELAY);
                }
            }
            Err(e) => return Err(ExportError::SinkUnavailable(e.to_string())),
        }
    }

    Err(ExportError::SinkLocked(format!(
        "clipboard still busy after {} attempts",
        CLIPBOARD_RETRIES
    )))
}

fn write_image_file(
    image: &RgbaImage,
    path: &Path,
    format: OutputFormat,
) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| ExportError::SinkUnavailable(e.to_string()))?;
        }
    }

    match format {
        OutputFormat::Png => {
            image
                .save_with_format(path, image::ImageFormat::Png)
                .map_err(|e| ExportError::SinkUnavailable(e.to_string()))?;
        }
        OutputFormat::Jpeg { quality } => {
            // JPEG carries no alpha channel
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let file =
                File::create(path).map_err(|e| ExportError::SinkUnavailable(e.to_string()))?;
            let mut writer = BufWriter::new(file);
            JpegEncoder::new_with_quality(&mut writer, quality)
                .encode_image(&rgb)
                .map_err(|e| ExportError::SinkUnavailable(e.to_string()))?;
        }
    }

    info!("saved capture to {}", path.display());
    Ok(())
}
