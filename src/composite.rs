//! Joining two half faces into one portrait.
//!
//! A join runs in four steps:
//!
//! 1. Measure each half's anchor pair and take the ratio.
//! 2. Shrink whichever half shows the larger face so both pairs measure
//!    the same. The scale is uniform in both directions, so the face keeps
//!    its proportions even though only the seam direction is matched.
//! 3. Trim both halves along the seam so their first anchors sit at the
//!    same offset and the band past the second anchor is as long as the
//!    shorter half allows.
//! 4. Paste both halves side by side (or one above the other) onto a new
//!    canvas.

use std::path::Path;

use image::imageops::FilterType;
use image::RgbImage;
use serde::Serialize;
use tracing::{debug, info};

use crate::detector::{FaceSelection, LandmarkDetector};
use crate::error::{Error, Result};
use crate::geometry;
use crate::half::{self, HalfImage};
use crate::raster::{self, Region};
use crate::types::{AnchorPair, Axis, Point, Side};

/// How an anchor pair is measured to derive the scale ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMetric {
    /// Straight-line distance between the two anchors.
    Euclidean,
    /// Column distance between the two anchors, ignoring rows.
    HorizontalSpan,
}

impl ScaleMetric {
    pub fn measure(self, anchors: &AnchorPair) -> f64 {
        let (a, b) = (anchors.first(), anchors.second());
        match self {
            ScaleMetric::Euclidean => geometry::distance(a, b),
            ScaleMetric::HorizontalSpan => (b.x - a.x).abs() as f64,
        }
    }
}

/// Which way two halves are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrangement {
    /// Left half beside right half, meeting on a vertical seam.
    Horizontal,
    /// Upper half above lower half, meeting on a horizontal seam.
    Vertical,
}

impl Arrangement {
    pub fn sides(self) -> (Side, Side) {
        match self {
            Arrangement::Horizontal => (Side::Left, Side::Right),
            Arrangement::Vertical => (Side::Up, Side::Down),
        }
    }

    /// The metric each arrangement has always used. Left/right joins
    /// measure the full distance, up/down joins only the column span.
    pub fn metric(self) -> ScaleMetric {
        match self {
            Arrangement::Horizontal => ScaleMetric::Euclidean,
            Arrangement::Vertical => ScaleMetric::HorizontalSpan,
        }
    }

    /// Axis along the seam, where the halves get aligned and trimmed.
    fn seam_axis(self) -> Axis {
        match self {
            Arrangement::Horizontal => Axis::Y,
            Arrangement::Vertical => Axis::X,
        }
    }

    fn seam_name(self) -> &'static str {
        match self {
            Arrangement::Horizontal => "vertical",
            Arrangement::Vertical => "horizontal",
        }
    }
}

/// How a composite was put together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeLayout {
    pub arrangement: Arrangement,
    pub metric: ScaleMetric,
    /// First half's anchor measure over the second's, before rescaling.
    pub scale_ratio: f64,
    /// The half that was resampled, if any.
    pub resampled: Option<Side>,
    /// Offset along the seam at which each half was cut.
    pub offsets: [u32; 2],
    /// Length of the shared band along the seam.
    pub band: u32,
    pub width: u32,
    pub height: u32,
}

/// A finished portrait and its layout.
#[derive(Debug, Clone)]
pub struct Composite {
    pub image: RgbImage,
    pub layout: CompositeLayout,
}

impl Composite {
    pub fn save(&self, path: &Path) -> Result<()> {
        raster::save(&self.image, path)
    }
}

/// Loads, splits and joins source portraits.
///
/// ```ignore
/// let compositor = Compositor::new(LandmarkFiles::beside_images())
///     .filter(FilterType::Lanczos3);
/// compositor.compose_horizontal("a.jpg".as_ref(), "b.jpg".as_ref(), "out.jpg".as_ref())?;
/// ```
pub struct Compositor<D> {
    detector: D,
    filter: FilterType,
}

impl<D: LandmarkDetector> Compositor<D> {
    pub fn new(detector: D) -> Self {
        Self {
            detector,
            filter: FilterType::CatmullRom,
        }
    }

    /// Resampling filter for the half that gets rescaled.
    pub fn filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Load `path`, find its face and cut out the `side` half.
    ///
    /// Failures to split the face are reported against `path`.
    pub fn half(&self, path: &Path, side: Side) -> Result<HalfImage> {
        let image = raster::load(path)?;
        let faces = self.detector.face_landmarks(&image, path)?;
        debug!(path = %path.display(), faces = faces.len(), "detected faces");
        let face = FaceSelection::First.select(faces, path)?;
        half::extract(&image, &face, side).map_err(|e| e.in_image(path))
    }

    /// Left half of `left` beside the right half of `right`, saved to
    /// `output`.
    pub fn compose_horizontal(
        &self,
        left: &Path,
        right: &Path,
        output: &Path,
    ) -> Result<Composite> {
        self.compose(Arrangement::Horizontal, left, right, output)
    }

    /// Upper half of `up` above the lower half of `down`, saved to
    /// `output`.
    pub fn compose_vertical(&self, up: &Path, down: &Path, output: &Path) -> Result<Composite> {
        self.compose(Arrangement::Vertical, up, down, output)
    }

    pub fn compose(
        &self,
        arrangement: Arrangement,
        first_path: &Path,
        second_path: &Path,
        output: &Path,
    ) -> Result<Composite> {
        let (first_side, second_side) = arrangement.sides();
        let first = self.half(first_path, first_side)?;
        let second = self.half(second_path, second_side)?;

        let metric = arrangement.metric();
        for (half, path) in [(&first, first_path), (&second, second_path)] {
            if metric.measure(&half.anchors) == 0.0 {
                return Err(Error::DegenerateAnchors.in_image(path));
            }
        }

        let composite = join(arrangement, first, second, self.filter)?;
        composite.save(output)?;

        info!(
            output = %output.display(),
            width = composite.layout.width,
            height = composite.layout.height,
            ratio = composite.layout.scale_ratio,
            "composite written"
        );
        Ok(composite)
    }
}

/// Join a left half and a right half.
pub fn join_horizontal(
    left: HalfImage,
    right: HalfImage,
    filter: FilterType,
) -> Result<Composite> {
    join(Arrangement::Horizontal, left, right, filter)
}

/// Join an upper half and a lower half.
pub fn join_vertical(up: HalfImage, down: HalfImage, filter: FilterType) -> Result<Composite> {
    join(Arrangement::Vertical, up, down, filter)
}

pub fn join(
    arrangement: Arrangement,
    mut first: HalfImage,
    mut second: HalfImage,
    filter: FilterType,
) -> Result<Composite> {
    let seam = arrangement.seam_name();
    for half in [&first, &second] {
        if half.anchors.seam_name() != seam {
            return Err(Error::SeamMismatch {
                first: seam,
                second: half.anchors.seam_name(),
            });
        }
    }

    let metric = arrangement.metric();
    let first_measure = metric.measure(&first.anchors);
    let second_measure = metric.measure(&second.anchors);
    if first_measure == 0.0 || second_measure == 0.0 {
        return Err(Error::DegenerateAnchors);
    }
    let ratio = first_measure / second_measure;
    debug!(?metric, first_measure, second_measure, ratio, "scale ratio");

    let resampled = if ratio > 1.0 {
        shrink(&mut first, ratio, filter)?;
        Some(first.side)
    } else if ratio < 1.0 {
        grow(&mut second, ratio, filter)?;
        Some(second.side)
    } else {
        None
    };

    let axis = arrangement.seam_axis();
    let extent = |half: &HalfImage| match axis {
        Axis::Y => half.height() as i64,
        Axis::X => half.width() as i64,
    };
    let lead = |half: &HalfImage| half.anchors.first().coord(axis) as i64;
    let trail = |half: &HalfImage| half.anchors.second().coord(axis) as i64;

    let shared_lead = lead(&first).min(lead(&second));
    let shared_tail = (extent(&first) - trail(&first)).min(extent(&second) - trail(&second));

    let offsets = [lead(&first) - shared_lead, lead(&second) - shared_lead];
    let band = (trail(&first) + shared_tail - offsets[0])
        .min(trail(&second) + shared_tail - offsets[1]);
    debug!(?offsets, band, "seam alignment");

    let first = cut_band(first, axis, offsets[0], band)?;
    let second = cut_band(second, axis, offsets[1], band)?;

    let (width, height) = match arrangement {
        Arrangement::Horizontal => (first.width() + second.width(), first.height()),
        Arrangement::Vertical => (first.width(), first.height() + second.height()),
    };
    let mut canvas = RgbImage::new(width, height);
    raster::paste(&mut canvas, &first.image, 0, 0);
    match arrangement {
        Arrangement::Horizontal => raster::paste(&mut canvas, &second.image, first.width(), 0),
        Arrangement::Vertical => raster::paste(&mut canvas, &second.image, 0, first.height()),
    }

    Ok(Composite {
        image: canvas,
        layout: CompositeLayout {
            arrangement,
            metric,
            scale_ratio: ratio,
            resampled,
            offsets: [offsets[0] as u32, offsets[1] as u32],
            band: band as u32,
            width,
            height,
        },
    })
}

/// Divide the half's size and anchors by `ratio`.
fn shrink(half: &mut HalfImage, ratio: f64, filter: FilterType) -> Result<()> {
    let width = (half.width() as f64 / ratio) as i64;
    let height = (half.height() as f64 / ratio) as i64;
    half.image = raster::resize(&half.image, width, height, filter)?;
    half.anchors = half.anchors.divided(ratio);
    Ok(())
}

/// Multiply the half's size and anchors by `ratio`.
fn grow(half: &mut HalfImage, ratio: f64, filter: FilterType) -> Result<()> {
    let width = (half.width() as f64 * ratio) as i64;
    let height = (half.height() as f64 * ratio) as i64;
    half.image = raster::resize(&half.image, width, height, filter)?;
    half.anchors = half.anchors.scaled(ratio);
    Ok(())
}

/// Keep `len` pixels along `axis` starting at `offset`, everything across.
fn cut_band(half: HalfImage, axis: Axis, offset: i64, len: i64) -> Result<HalfImage> {
    let (w, h) = half.image.dimensions();
    let region = match axis {
        Axis::Y => Region::from_corners(0, offset, w as i64, offset + len, w, h)?,
        Axis::X => Region::from_corners(offset, 0, offset + len, h as i64, w, h)?,
    };
    let origin = Point::new(region.x as i32, region.y as i32);
    Ok(HalfImage {
        image: raster::crop(&half.image, region),
        anchors: half.anchors.localized(origin),
        side: half.side,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn vertical_half(side: Side, w: u32, h: u32, upper: i32, lower: i32, shade: u8) -> HalfImage {
        let x = if side == Side::Left { w as i32 } else { 0 };
        HalfImage {
            image: RgbImage::from_pixel(w, h, Rgb([shade, shade, shade])),
            anchors: AnchorPair::Vertical {
                upper: Point::new(x, upper),
                lower: Point::new(x, lower),
            },
            side,
        }
    }

    fn horizontal_half(side: Side, w: u32, h: u32, left: Point, right: Point) -> HalfImage {
        HalfImage {
            image: RgbImage::new(w, h),
            anchors: AnchorPair::Horizontal { left, right },
            side,
        }
    }

    #[test]
    fn aligned_halves_are_not_trimmed() {
        let left = vertical_half(Side::Left, 100, 300, 100, 200, 10);
        let right = vertical_half(Side::Right, 80, 300, 100, 200, 200);

        let out = join_horizontal(left, right, FilterType::Nearest).unwrap();
        assert_eq!(out.image.dimensions(), (180, 300));
        assert_eq!(out.layout.scale_ratio, 1.0);
        assert_eq!(out.layout.resampled, None);
        assert_eq!(out.layout.offsets, [0, 0]);
        assert_eq!(out.image.get_pixel(99, 150), &Rgb([10, 10, 10]));
        assert_eq!(out.image.get_pixel(100, 150), &Rgb([200, 200, 200]));
    }

    #[test]
    fn offset_rows_are_trimmed_to_line_up() {
        // Same scale, right face sits 20 rows lower.
        let left = vertical_half(Side::Left, 100, 300, 100, 200, 10);
        let right = vertical_half(Side::Right, 100, 320, 120, 220, 200);

        let out = join_horizontal(left, right, FilterType::Nearest).unwrap();
        assert_eq!(out.layout.offsets, [0, 20]);
        // 100 rows above the eyes, 100 between, 100 below.
        assert_eq!(out.layout.band, 300);
        assert_eq!(out.image.dimensions(), (200, 300));
    }

    #[test]
    fn larger_left_face_is_shrunk() {
        // Left anchors 200 apart, right 100 apart: ratio 2.
        let left = vertical_half(Side::Left, 200, 600, 200, 400, 10);
        let right = vertical_half(Side::Right, 100, 300, 100, 200, 200);

        let out = join_horizontal(left, right, FilterType::Triangle).unwrap();
        assert_eq!(out.layout.scale_ratio, 2.0);
        assert_eq!(out.layout.resampled, Some(Side::Left));
        assert_eq!(out.image.dimensions(), (200, 300));
    }

    #[test]
    fn larger_right_face_is_scaled_by_ratio() {
        let left = vertical_half(Side::Left, 100, 300, 100, 200, 10);
        let right = vertical_half(Side::Right, 100, 600, 200, 400, 200);

        let out = join_horizontal(left, right, FilterType::Triangle).unwrap();
        assert_eq!(out.layout.scale_ratio, 0.5);
        assert_eq!(out.layout.resampled, Some(Side::Right));
        // Right half becomes 50x300.
        assert_eq!(out.image.dimensions(), (150, 300));
    }

    #[test]
    fn output_height_is_smaller_crop() {
        // Anchor spacing 100 vs 101 after scaling leaves crops one row apart.
        let left = vertical_half(Side::Left, 50, 250, 60, 160, 1);
        let right = vertical_half(Side::Right, 50, 260, 50, 151, 2);

        let out = join_horizontal(left, right, FilterType::Nearest).unwrap();
        let ratio = 100.0 / 101.0;
        assert!((out.layout.scale_ratio - ratio).abs() < 1e-12);
        // Right half: 49x257, anchors at rows 49 and 149.
        // Shared lead 49, left offset 11. Tail below lower: left 90, right 108 -> 90.
        // Left band: 160 + 90 - 11 = 239. Right band: 149 + 90 - 0 = 239.
        assert_eq!(out.layout.offsets, [11, 0]);
        assert_eq!(out.layout.band, 239);
        assert_eq!(out.image.dimensions(), (50 + 49, 239));
    }

    #[test]
    fn vertical_join_uses_column_span() {
        // Up anchors span 100 columns but differ in rows; the row gap
        // must not influence the ratio.
        let up = horizontal_half(Side::Up, 200, 120, Point::new(50, 110), Point::new(150, 130));
        let down = horizontal_half(Side::Down, 200, 90, Point::new(50, 0), Point::new(150, 4));

        let out = join_vertical(up, down, FilterType::Nearest).unwrap();
        assert_eq!(out.layout.metric, ScaleMetric::HorizontalSpan);
        assert_eq!(out.layout.scale_ratio, 1.0);
        assert_eq!(out.image.dimensions(), (200, 210));
    }

    #[test]
    fn vertical_join_trims_columns() {
        let up = horizontal_half(Side::Up, 200, 120, Point::new(50, 118), Point::new(150, 118));
        let down = horizontal_half(Side::Down, 220, 90, Point::new(70, 2), Point::new(170, 2));

        let out = join_vertical(up, down, FilterType::Nearest).unwrap();
        assert_eq!(out.layout.offsets, [0, 20]);
        // Right of the right anchor: up 50, down 50.
        assert_eq!(out.layout.band, 200);
        assert_eq!(out.image.dimensions(), (200, 210));
    }

    #[test]
    fn zero_length_anchors_are_rejected() {
        let left = vertical_half(Side::Left, 100, 300, 100, 100, 1);
        let right = vertical_half(Side::Right, 100, 300, 100, 200, 2);
        assert!(matches!(
            join_horizontal(left, right, FilterType::Nearest),
            Err(Error::DegenerateAnchors)
        ));
    }

    #[test]
    fn mismatched_seams_are_rejected() {
        let left = vertical_half(Side::Left, 100, 300, 100, 200, 1);
        let down = horizontal_half(Side::Down, 200, 90, Point::new(50, 0), Point::new(150, 0));
        let err = join_horizontal(left, down, FilterType::Nearest).unwrap_err();
        assert!(matches!(
            err,
            Error::SeamMismatch {
                first: "vertical",
                second: "horizontal"
            }
        ));
    }

    #[test]
    fn euclidean_metric() {
        let pair = AnchorPair::Horizontal {
            left: Point::new(0, 0),
            right: Point::new(30, 40),
        };
        assert_eq!(ScaleMetric::Euclidean.measure(&pair), 50.0);
        assert_eq!(ScaleMetric::HorizontalSpan.measure(&pair), 30.0);
    }
}
