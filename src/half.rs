use image::RgbImage;
use tracing::debug;

use crate::anchors;
use crate::error::Result;
use crate::raster::{self, Region};
use crate::types::{AnchorPair, LandmarkSet, Point, Side};

/// One half of a face, cut out of its source image.
///
/// The anchors are in the half's own frame: `(0, 0)` is the top-left
/// pixel of `image`, not of the source.
#[derive(Debug, Clone)]
pub struct HalfImage {
    pub image: RgbImage,
    pub anchors: AnchorPair,
    pub side: Side,
}

impl HalfImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Cut the `side` half of the face described by `landmarks` out of `image`.
pub fn extract(image: &RgbImage, landmarks: &LandmarkSet, side: Side) -> Result<HalfImage> {
    let (boundary, anchors) = anchors::derive(landmarks, side)?;
    let (width, height) = image.dimensions();
    let b = boundary as i64;
    let (w, h) = (width as i64, height as i64);

    let region = match side {
        Side::Left => Region::from_corners(0, 0, b, h, width, height)?,
        Side::Right => Region::from_corners(b, 0, w, h, width, height)?,
        Side::Up => Region::from_corners(0, 0, w, b, width, height)?,
        Side::Down => Region::from_corners(0, b, w, h, width, height)?,
    };

    let origin = Point::new(region.x as i32, region.y as i32);
    let anchors = anchors.localized(origin);
    debug!(%side, ?region, ?anchors, "extracted half");

    Ok(HalfImage {
        image: raster::crop(image, region),
        anchors,
        side,
    })
}
