//! Drawing landmarks, split lines and anchors over a portrait, for checking
//! what a composite will be built from.

use image::{Rgb, RgbImage};
use tracing::debug;

use crate::anchors;
use crate::geometry;
use crate::types::{feature, LandmarkSet, Point, Side};

const CONTOUR: Rgb<u8> = Rgb([0, 255, 0]);
const LANDMARK: Rgb<u8> = Rgb([255, 0, 0]);
const BRIDGE_CENTRE: Rgb<u8> = Rgb([255, 255, 0]);
const SPLIT: Rgb<u8> = Rgb([0, 255, 255]);
const ANCHOR: Rgb<u8> = Rgb([255, 0, 255]);

/// Copy of `image` with `landmarks` and every side's split drawn on it.
///
/// Sides whose anchors cannot be derived from these landmarks are skipped.
pub fn annotate(image: &RgbImage, landmarks: &LandmarkSet) -> RgbImage {
    let mut out = image.clone();
    let (w, h) = out.dimensions();

    for (_, points) in landmarks.iter() {
        for pair in points.windows(2) {
            draw_line(&mut out, pair[0], pair[1], CONTOUR);
        }
        for &p in points {
            draw_circle(&mut out, p, 2, LANDMARK);
        }
    }

    for side in Side::ALL {
        match anchors::derive(landmarks, side) {
            Ok((boundary, pair)) => {
                let (a, b) = match side {
                    Side::Left | Side::Right => {
                        (Point::new(boundary, 0), Point::new(boundary, h as i32 - 1))
                    }
                    Side::Up | Side::Down => {
                        (Point::new(0, boundary), Point::new(w as i32 - 1, boundary))
                    }
                };
                draw_line(&mut out, a, b, SPLIT);
                draw_circle(&mut out, pair.first(), 4, ANCHOR);
                draw_circle(&mut out, pair.second(), 4, ANCHOR);
            }
            Err(e) => debug!(%side, error = %e, "no split to draw"),
        }
    }

    if let Ok(centre) = geometry::centroid(landmarks.feature(feature::NOSE_BRIDGE)) {
        draw_circle(&mut out, centre, 3, BRIDGE_CENTRE);
    }

    out
}

fn put(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    let (w, h) = img.dimensions();
    if x >= 0 && y >= 0 && (x as u32) < w && (y as u32) < h {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn draw_circle(img: &mut RgbImage, centre: Point, radius: i32, color: Rgb<u8>) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put(img, centre.x + dx, centre.y + dy, color);
            }
        }
    }
}

/// Bresenham line, clipped to the image first so far-off landmarks
/// cost no more than an on-frame line.
fn draw_line(img: &mut RgbImage, from: Point, to: Point, color: Rgb<u8>) {
    let Some((from, to)) = clip(from, to, img.width(), img.height()) else {
        return;
    };

    let dx = (to.x - from.x).abs();
    let dy = (to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx - dy;
    let (mut x, mut y) = (from.x, from.y);

    loop {
        put(img, x, y, color);
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

/// Liang-Barsky clip of a segment to a `w` x `h` pixel grid. `None` when
/// the segment misses the image.
fn clip(from: Point, to: Point, w: u32, h: u32) -> Option<(Point, Point)> {
    if w == 0 || h == 0 {
        return None;
    }
    let (x0, y0) = (from.x as f64, from.y as f64);
    let (dx, dy) = (to.x as f64 - x0, to.y as f64 - y0);
    let (xmax, ymax) = ((w - 1) as f64, (h - 1) as f64);

    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [(-dx, x0), (dx, xmax - x0), (-dy, y0), (dy, ymax - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let t = q / p;
            if p < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
        }
    }
    if t0 > t1 {
        return None;
    }

    let at = |t: f64| {
        Point::new(
            (x0 + t * dx).round().clamp(0.0, xmax) as i32,
            (y0 + t * dy).round().clamp(0.0, ymax) as i32,
        )
    };
    Some((at(t0), at(t1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchors::tests::frontal_face;

    #[test]
    fn draws_splits_and_anchors() {
        let image = RgbImage::new(200, 300);
        let out = annotate(&image, &frontal_face());

        assert_eq!(out.dimensions(), (200, 300));
        // Vertical split through the nose bridge.
        assert_eq!(out.get_pixel(100, 5), &SPLIT);
        // Horizontal split at the bottom of the nose.
        assert_eq!(out.get_pixel(5, 180), &SPLIT);
        // Jaw anchor of the up/down split.
        assert_eq!(out.get_pixel(44, 185), &ANCHOR);
        // Source is untouched.
        assert_eq!(image.get_pixel(100, 5), &Rgb([0, 0, 0]));
    }

    #[test]
    fn incomplete_landmarks_still_draw() {
        let face = LandmarkSet::new()
            .with_feature(feature::CHIN, vec![Point::new(1, 1), Point::new(8, 1)]);
        let out = annotate(&RgbImage::new(10, 10), &face);
        assert_eq!(out.get_pixel(4, 1), &CONTOUR);
        assert_eq!(out.get_pixel(8, 1), &LANDMARK);
    }

    #[test]
    fn lines_clip_at_edges() {
        let mut img = RgbImage::new(5, 5);
        draw_line(&mut img, Point::new(-10, 2), Point::new(10, 2), SPLIT);
        assert!((0..5).all(|x| img.get_pixel(x, 2) == &SPLIT));
    }

    #[test]
    fn far_off_frame_lines_are_cheap() {
        let mut img = RgbImage::new(8, 8);
        draw_line(
            &mut img,
            Point::new(-1_000_000_000, 3),
            Point::new(1_000_000_000, 3),
            SPLIT,
        );
        assert!((0..8).all(|x| img.get_pixel(x, 3) == &SPLIT));

        // Entirely outside: nothing drawn.
        let mut blank = RgbImage::new(8, 8);
        draw_line(
            &mut blank,
            Point::new(-2_000_000_000, -5),
            Point::new(2_000_000_000, -5),
            SPLIT,
        );
        assert!(blank.pixels().all(|p| p == &Rgb([0, 0, 0])));
    }

    #[test]
    fn clipped_diagonal_keeps_its_slope() {
        assert_eq!(
            clip(Point::new(-5, -5), Point::new(20, 20), 10, 10),
            Some((Point::new(0, 0), Point::new(9, 9)))
        );
        assert_eq!(clip(Point::new(-5, 3), Point::new(-1, 8), 10, 10), None);
    }
}
