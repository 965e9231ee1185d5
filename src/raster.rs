//! Raster primitives over the `image` crate: load, crop, resize, paste
//! and save.

use std::fs::{self, Permissions};
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbImage};
use tracing::debug;

use crate::error::{Error, Result};

/// Rectangle within an image, top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region spanning `(x0, y0)` up to (excluding) `(x1, y1)`.
    ///
    /// Corners are clamped into a `width` x `height` image first. Fails
    /// with `EmptyRegion` when nothing is left.
    pub fn from_corners(
        x0: i64,
        y0: i64,
        x1: i64,
        y1: i64,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let clamp_x = |v: i64| v.clamp(0, width as i64);
        let clamp_y = |v: i64| v.clamp(0, height as i64);
        let (x0, x1) = (clamp_x(x0), clamp_x(x1));
        let (y0, y1) = (clamp_y(y0), clamp_y(y1));

        if x1 <= x0 || y1 <= y0 {
            return Err(Error::EmptyRegion {
                width: (x1 - x0).max(0),
                height: (y1 - y0).max(0),
            });
        }

        Ok(Self::new(
            x0 as u32,
            y0 as u32,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
        ))
    }
}

/// Decode an image file into 8-bit RGB.
pub fn load(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), width = img.width(), height = img.height(), "loaded image");
    Ok(img.to_rgb8())
}

/// Copy a region out of `image`.
pub fn crop(image: &RgbImage, region: Region) -> RgbImage {
    imageops::crop_imm(image, region.x, region.y, region.width, region.height).to_image()
}

/// Resample `image` to `width` x `height`.
///
/// Takes signed sizes so callers can pass computed dimensions straight
/// through; anything below one pixel fails with `EmptyRegion`.
pub fn resize(image: &RgbImage, width: i64, height: i64, filter: FilterType) -> Result<RgbImage> {
    if width <= 0 || height <= 0 {
        return Err(Error::EmptyRegion { width, height });
    }
    Ok(imageops::resize(image, width as u32, height as u32, filter))
}

/// Copy `top` into `canvas` with its top-left corner at `(x, y)`.
pub fn paste(canvas: &mut RgbImage, top: &RgbImage, x: u32, y: u32) {
    imageops::replace(canvas, top, x as i64, y as i64);
}

/// Encode `image` to `path`, picking the format from its extension.
///
/// The bytes go to a temporary file next to `path` that is renamed into
/// place once encoding succeeded, so `path` is either absent or complete.
/// A replaced file keeps its permissions; a new one gets `rw-r--r--`.
pub fn save(image: &RgbImage, path: &Path) -> Result<()> {
    let format = ImageFormat::from_path(path).map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })?;

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    if let Some(perms) = output_permissions(path) {
        tmp.as_file().set_permissions(perms).map_err(io_err)?;
    }
    image
        .write_to(&mut tmp, format)
        .map_err(|source| Error::Image {
            path: path.to_path_buf(),
            source,
        })?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    debug!(path = %path.display(), ?format, "saved image");
    Ok(())
}

fn output_permissions(path: &Path) -> Option<Permissions> {
    match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => new_file_permissions(),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}
