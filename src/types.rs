use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Named facial features, spelled the way face_recognition dumps them.
pub mod feature {
    pub const CHIN: &str = "chin";
    pub const LEFT_EYEBROW: &str = "left_eyebrow";
    pub const RIGHT_EYEBROW: &str = "right_eyebrow";
    pub const NOSE_BRIDGE: &str = "nose_bridge";
    pub const NOSE_TIP: &str = "nose_tip";
    pub const LEFT_EYE: &str = "left_eye";
    pub const RIGHT_EYE: &str = "right_eye";
    pub const TOP_LIP: &str = "top_lip";
    pub const BOTTOM_LIP: &str = "bottom_lip";
}

/// A pixel position with integer coordinates.
///
/// Serializes as a `[x, y]` pair so landmark dumps stay compact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate along `axis`.
    pub fn coord(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Multiply both coordinates by `factor`, truncating toward zero.
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            x: (self.x as f64 * factor) as i32,
            y: (self.y as f64 * factor) as i32,
        }
    }

    /// Divide both coordinates by `divisor`, truncating toward zero.
    pub fn divided(self, divisor: f64) -> Self {
        Self {
            x: (self.x as f64 / divisor) as i32,
            y: (self.y as f64 / divisor) as i32,
        }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (i32, i32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// Image axis. `X` runs along columns, `Y` along rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn orthogonal(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Min,
    Max,
}

/// Which half of a source image is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    #[serde(rename = "upside")]
    Up,
    #[serde(rename = "downside")]
    Down,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Up, Side::Down];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::Up => "upside",
            Side::Down => "downside",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            "up" | "upside" => Ok(Side::Up),
            "down" | "downside" => Ok(Side::Down),
            _ => Err(Error::UnsupportedSide(s.to_string())),
        }
    }
}

/// Landmarks of one face: feature name to contour points.
///
/// A feature the detector did not report reads as an empty contour.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    features: BTreeMap<String, Vec<Point>>,
}

impl LandmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feature(mut self, name: &str, points: Vec<Point>) -> Self {
        self.insert(name, points);
        self
    }

    pub fn insert(&mut self, name: &str, points: Vec<Point>) {
        self.features.insert(name.to_string(), points);
    }

    pub fn feature(&self, name: &str) -> &[Point] {
        self.features.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Point])> {
        self.features
            .iter()
            .map(|(name, points)| (name.as_str(), points.as_slice()))
    }

    pub fn num_features(&self) -> usize {
        self.features.len()
    }

    /// Group a 68-point iBUG/dlib shape into named features.
    ///
    /// The lip contours follow face_recognition: each lip runs along its
    /// outer edge, then back along the inner edge. Returns `None` if fewer
    /// than 68 points are given.
    pub fn from_ibug_68(points: &[Point]) -> Option<Self> {
        if points.len() < 68 {
            return None;
        }

        let pick = |indices: &[usize]| indices.iter().map(|&i| points[i]).collect::<Vec<_>>();

        let mut top_lip = points[48..=54].to_vec();
        top_lip.extend(pick(&[64, 63, 62, 61, 60]));

        let mut bottom_lip = points[54..=59].to_vec();
        bottom_lip.extend(pick(&[48, 60, 67, 66, 65, 64]));

        Some(
            Self::new()
                .with_feature(feature::CHIN, points[0..=16].to_vec())
                .with_feature(feature::LEFT_EYEBROW, points[17..=21].to_vec())
                .with_feature(feature::RIGHT_EYEBROW, points[22..=26].to_vec())
                .with_feature(feature::NOSE_BRIDGE, points[27..=30].to_vec())
                .with_feature(feature::NOSE_TIP, points[31..=35].to_vec())
                .with_feature(feature::LEFT_EYE, points[36..=41].to_vec())
                .with_feature(feature::RIGHT_EYE, points[42..=47].to_vec())
                .with_feature(feature::TOP_LIP, top_lip)
                .with_feature(feature::BOTTOM_LIP, bottom_lip),
        )
    }
}

/// The two ends of a seam, tagged by which end is which.
///
/// Left/right halves meet on a vertical seam and carry `Vertical`
/// anchors; up/down halves meet on a horizontal seam and carry
/// `Horizontal` anchors. Two halves can only be joined when they carry
/// the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "seam", rename_all = "lowercase")]
pub enum AnchorPair {
    Vertical { upper: Point, lower: Point },
    Horizontal { left: Point, right: Point },
}

impl AnchorPair {
    /// Upper anchor for a vertical seam, left anchor for a horizontal one.
    pub fn first(&self) -> Point {
        match *self {
            AnchorPair::Vertical { upper, .. } => upper,
            AnchorPair::Horizontal { left, .. } => left,
        }
    }

    pub fn second(&self) -> Point {
        match *self {
            AnchorPair::Vertical { lower, .. } => lower,
            AnchorPair::Horizontal { right, .. } => right,
        }
    }

    pub fn seam_name(&self) -> &'static str {
        match self {
            AnchorPair::Vertical { .. } => "vertical",
            AnchorPair::Horizontal { .. } => "horizontal",
        }
    }

    /// Apply `f` to both anchors, keeping the tag.
    pub fn map(self, f: impl Fn(Point) -> Point) -> Self {
        match self {
            AnchorPair::Vertical { upper, lower } => AnchorPair::Vertical {
                upper: f(upper),
                lower: f(lower),
            },
            AnchorPair::Horizontal { left, right } => AnchorPair::Horizontal {
                left: f(left),
                right: f(right),
            },
        }
    }

    pub fn scaled(self, factor: f64) -> Self {
        self.map(|p| p.scaled(factor))
    }

    pub fn divided(self, divisor: f64) -> Self {
        self.map(|p| p.divided(divisor))
    }

    /// Re-express both anchors relative to `origin`.
    pub fn localized(self, origin: Point) -> Self {
        self.map(|p| p - origin)
    }
}
