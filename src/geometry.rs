//! Point-set helpers used to turn landmark contours into split points and
//! anchors.

use thiserror::Error;

use crate::types::{Axis, Direction, Point};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    #[error("no points given")]
    EmptyInput,

    #[error("points do not lie on both sides of the split point")]
    NoPartition,
}

/// Arithmetic mean of the points, truncated toward zero.
pub fn centroid(points: &[Point]) -> Result<Point, GeometryError> {
    if points.is_empty() {
        return Err(GeometryError::EmptyInput);
    }

    let n = points.len() as i64;
    let (sx, sy) = points.iter().fold((0i64, 0i64), |(sx, sy), p| {
        (sx + p.x as i64, sy + p.y as i64)
    });

    Ok(Point::new((sx / n) as i32, (sy / n) as i32))
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// The point with the smallest or largest coordinate along `axis`.
///
/// Ties go to the earliest point in `points`.
pub fn extremal(
    points: &[Point],
    axis: Axis,
    direction: Direction,
) -> Result<Point, GeometryError> {
    let mut iter = points.iter().copied();
    let mut best = iter.next().ok_or(GeometryError::EmptyInput)?;

    for p in iter {
        let better = match direction {
            Direction::Max => p.coord(axis) > best.coord(axis),
            Direction::Min => p.coord(axis) < best.coord(axis),
        };
        if better {
            best = p;
        }
    }

    Ok(best)
}

/// Where a contour crosses the line through `origin` orthogonal to `axis`.
///
/// Points strictly before `origin` along `axis` form one group and points
/// strictly after form the other. From each group the point closest to
/// `origin` on the orthogonal axis is returned, first occurrence winning
/// ties. With `Axis::X` this finds the chin contour points at the nose
/// tip's row, left one first.
pub fn nearest_intersections(
    origin: Point,
    points: &[Point],
    axis: Axis,
) -> Result<(Point, Point), GeometryError> {
    let across = axis.orthogonal();
    let gap = |p: &Point| (p.coord(across) - origin.coord(across)).abs();

    let nearest = |side: &dyn Fn(&Point) -> bool| {
        points
            .iter()
            .filter(|&p| side(p))
            .fold(None, |best: Option<Point>, p| match best {
                Some(b) if gap(&b) <= gap(p) => Some(b),
                _ => Some(*p),
            })
    };

    let before = nearest(&|p| p.coord(axis) < origin.coord(axis));
    let after = nearest(&|p| p.coord(axis) > origin.coord(axis));

    match (before, after) {
        (Some(b), Some(a)) => Ok((b, a)),
        _ => Err(GeometryError::NoPartition),
    }
}
