//! Screen capture
//!
//! Captures the full virtual screen into a single raster using the
//! `xcap` crate. Monitors are stitched by their OS placement, shifted so
//! the stitched raster starts at (0, 0); the returned origin records
//! that shift so pointer coordinates can be normalized the same way.

use image::RgbaImage;
use log::{info, warn};
use xcap::Monitor;

/// Error type for capture operations.
#[derive(Debug)]
pub enum CaptureError {
    /// Monitor enumeration or geometry lookup failed.
    EnumerationFailed(String),
    /// No monitors are connected.
    NoMonitors,
    /// Every monitor refused to produce an image.
    CaptureFailed(String),
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::EnumerationFailed(msg) => {
                write!(f, "Failed to enumerate monitors: {}", msg)
            }
            CaptureError::NoMonitors => {
                write!(f, "No monitors found")
            }
            CaptureError::CaptureFailed(msg) => {
                write!(f, "Failed to capture the screen: {}", msg)
            }
        }
    }
}

impl std::error::Error for CaptureError {}

/// One monitor's placement inside the virtual screen.
#[derive(Debug, Clone)]
pub struct MonitorInfo {
    /// OS monitor name.
    pub name: String,
    /// Left edge in virtual-screen coordinates.
    pub x: i32,
    /// Top edge in virtual-screen coordinates.
    pub y: i32,
    /// Width in physical pixels.
    pub width: u32,
    /// Height in physical pixels.
    pub height: u32,
    /// Whether the OS marks this monitor primary.
    pub is_primary: bool,
}

/// The stitched capture plus the shift applied to reach it.
#[derive(Debug)]
pub struct VirtualScreen {
    /// Raster covering every monitor.
    pub raster: RgbaImage,
    /// Virtual-screen origin in OS coordinates; subtract it from an OS
    /// point to get the matching raster coordinate.
    pub origin: (i32, i32),
}

fn monitor_info(monitor: &Monitor) -> Result<MonitorInfo, xcap::XCapError> {
    Ok(MonitorInfo {
        name: monitor.name()?,
        x: monitor.x()?,
        y: monitor.y()?,
        width: monitor.width()?,
        height: monitor.height()?,
        is_primary: monitor.is_primary()?,
    })
}

/// List connected monitors with their virtual-screen placement.
pub fn list_monitors() -> Result<Vec<MonitorInfo>, CaptureError> {
    let monitors = Monitor::all().map_err(|e| CaptureError::EnumerationFailed(e.to_string()))?;
    monitors
        .iter()
        .map(|monitor| {
            monitor_info(monitor).map_err(|e| CaptureError::EnumerationFailed(e.to_string()))
        })
        .collect()
}

/// Capture the whole virtual screen into one raster.
///
/// A monitor that fails to capture is skipped with a warning; the call
/// fails only when no monitor produces an image.
pub fn capture_virtual_screen() -> Result<VirtualScreen, CaptureError> {
    let monitors = Monitor::all().map_err(|e| CaptureError::EnumerationFailed(e.to_string()))?;
    if monitors.is_empty() {
        return Err(CaptureError::NoMonitors);
    }

    let mut placed = Vec::with_capacity(monitors.len());
    for monitor in monitors {
        let info =
            monitor_info(&monitor).map_err(|e| CaptureError::EnumerationFailed(e.to_string()))?;
        placed.push((monitor, info));
    }

    let min_x = placed.iter().map(|(_, m)| m.x).min().unwrap_or(0);
    let min_y = placed.iter().map(|(_, m)| m.y).min().unwrap_or(0);
    let max_x = placed.iter().map(|(_, m)| m.x + m.width as i32).max().unwrap_or(0);
    let max_y = placed.iter().map(|(_, m)| m.y + m.height as i32).max().unwrap_or(0);

    let total_width = (max_x - min_x) as u32;
    let total_height = (max_y - min_y) as u32;

    let mut combined = RgbaImage::new(total_width, total_height);
    let mut captured = 0usize;
    for (monitor, info) in &placed {
        match monitor.capture_image() {
            Ok(img) => {
                let offset_x = (info.x - min_x) as u32;
                let offset_y = (info.y - min_y) as u32;
                for (x, y, pixel) in img.enumerate_pixels() {
                    let dest_x = offset_x + x;
                    let dest_y = offset_y + y;
                    if dest_x < total_width && dest_y < total_height {
                        combined.put_pixel(dest_x, dest_y, *pixel);
                    }
                }
                captured += 1;
            }
            Err(e) => {
                warn!("skipping monitor '{}': {}", info.name, e);
            }
        }
    }

    if captured == 0 {
        return Err(CaptureError::CaptureFailed(String::from(
            "no monitor produced an image",
        )));
    }

    info!(
        "captured {} monitor(s) into a {}x{} raster",
        captured, total_width, total_height
    );
    Ok(VirtualScreen {
        raster: combined,
        origin: (min_x, min_y),
    })
}
