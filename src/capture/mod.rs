//! Frame capture stage: renders the active camera into offscreen surfaces and
//! reads the pixels back for encoding or still images.
//!
//! Surfaces hold four bytes per pixel in B, G, R, A order, which is the order
//! the YUV converter and the native encoder expect. `image::RgbaImage` is used
//! only as a 4-channel container; its channel names do not apply.

pub mod screenshot;

use crate::errors::CaptureError;
use crate::shared::errors::StorageError;
use crate::types::Resolution;
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, Rgb, RgbImage, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A camera the engine can render on demand.
pub trait RenderSource {
    fn name(&self) -> &str;

    /// Renders the current scene into `target`, which is already sized to the
    /// capture resolution. Implementations must not resize it.
    fn render(&mut self, target: &mut RgbaImage) -> Result<(), CaptureError>;
}

/// Primary camera plus an optional fallback used when no primary is active.
#[derive(Default)]
pub struct CameraRig {
    primary: Option<Box<dyn RenderSource>>,
    fallback: Option<Box<dyn RenderSource>>,
}

impl CameraRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_primary(mut self, camera: impl RenderSource + 'static) -> Self {
        self.primary = Some(Box::new(camera));
        self
    }

    pub fn with_fallback(mut self, camera: impl RenderSource + 'static) -> Self {
        self.fallback = Some(Box::new(camera));
        self
    }

    /// Replaces the primary camera, e.g. when the engine switches its main camera.
    pub fn set_primary(&mut self, camera: Option<Box<dyn RenderSource>>) {
        self.primary = camera;
    }

    pub fn has_camera(&self) -> bool {
        self.primary.is_some() || self.fallback.is_some()
    }

    /// The camera to render from.
    pub fn active(&mut self) -> Result<&mut dyn RenderSource, CaptureError> {
        if let Some(camera) = self.primary.as_deref_mut() {
            return Ok(camera);
        }

        match self.fallback.as_deref_mut() {
            Some(camera) => {
                tracing::debug!(target: "capture", "[CAPTURE] No primary camera, using fallback '{}'", camera.name());
                Ok(camera)
            }
            None => {
                tracing::error!(target: "capture", "[CAPTURE] No camera object found");
                Err(CaptureError::NoCamera)
            }
        }
    }
}

/// Renders `camera` into `target` and checks it kept the surface size.
pub fn render_into(camera: &mut dyn RenderSource, target: &mut RgbaImage) -> Result<(), CaptureError> {
    let expected = target.dimensions();
    camera.render(target)?;

    let actual = target.dimensions();
    if actual != expected {
        return Err(CaptureError::SurfaceSizeMismatch { expected, actual });
    }
    Ok(())
}

/// Copies a B, G, R, A surface into an RGB image of the same size.
pub fn surface_to_rgb(surface: &RgbaImage, out: &mut RgbImage) {
    for (src, dst) in surface.pixels().zip(out.pixels_mut()) {
        let [b, g, r, _] = src.0;
        *dst = Rgb([r, g, b]);
    }
}

/// Encodes `image` as JPEG and writes it to `path`.
pub fn save_jpeg(path: &Path, image: &RgbImage, quality: u8) -> Result<(), StorageError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode_image(image)
        .map_err(|e| StorageError::image(e.to_string()))?;

    writer.flush()?;
    Ok(())
}

/// Offscreen surfaces owned by one recording session.
pub struct CaptureSurfaces {
    resolution: Resolution,
    render_target: RgbaImage,
    thumbnail: RgbImage,
}

impl CaptureSurfaces {
    pub fn allocate(resolution: Resolution) -> Self {
        tracing::debug!(target: "capture", "[CAPTURE] Allocating {} surfaces", resolution);

        Self {
            resolution,
            render_target: RgbaImage::new(resolution.width, resolution.height),
            thumbnail: RgbImage::new(resolution.width, resolution.height),
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Renders one frame, flips it vertically to match the encoder's row order
    /// and returns a fresh copy of its bytes.
    pub fn capture_frame(&mut self, rig: &mut CameraRig) -> Result<Vec<u8>, CaptureError> {
        let camera = rig.active()?;
        render_into(camera, &mut self.render_target)?;

        imageops::flip_vertical_in_place(&mut self.render_target);

        Ok(self.render_target.as_raw().clone())
    }

    /// Renders one frame into the thumbnail surface, without flipping.
    pub fn capture_thumbnail(&mut self, rig: &mut CameraRig) -> Result<(), CaptureError> {
        let camera = rig.active()?;
        render_into(camera, &mut self.render_target)?;

        surface_to_rgb(&self.render_target, &mut self.thumbnail);
        Ok(())
    }

    pub fn thumbnail(&self) -> &RgbImage {
        &self.thumbnail
    }
}
