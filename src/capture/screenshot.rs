use super::{render_into, save_jpeg, surface_to_rgb, CameraRig};
use crate::errors::RecorderError;
use crate::gallery::Gallery;
use crate::types::Resolution;
use chrono::NaiveDateTime;
use image::{RgbImage, RgbaImage};
use std::path::PathBuf;

/// Result of a screenshot, for callers that list it in the gallery.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenshotResult {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Renders the active camera at `resolution` and saves it as a JPEG in the gallery.
pub fn take_screenshot(
    rig: &mut CameraRig,
    gallery: &Gallery,
    resolution: Resolution,
    jpeg_quality: u8,
    taken_at: NaiveDateTime,
) -> Result<ScreenshotResult, RecorderError> {
    let camera = rig.active()?;

    let mut surface = RgbaImage::new(resolution.width, resolution.height);
    render_into(camera, &mut surface)?;

    let mut image = RgbImage::new(resolution.width, resolution.height);
    surface_to_rgb(&surface, &mut image);

    gallery.ensure()?;
    let path = gallery.screenshot_path(taken_at);
    save_jpeg(&path, &image, jpeg_quality)?;

    tracing::info!(target: "capture", "[SCREENSHOT] New screenshot taken with path: {:?}", path);

    Ok(ScreenshotResult {
        path,
        width: resolution.width,
        height: resolution.height,
    })
}
