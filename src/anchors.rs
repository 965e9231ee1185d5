//! Split boundaries and seam anchors derived from a face's landmarks.

use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::{self, GeometryError};
use crate::types::{feature, AnchorPair, Axis, Direction, LandmarkSet, Point, Side};

/// Where to cut a face and which two points must meet the other half.
///
/// Returns the split boundary (an x for `Left`/`Right`, a y for
/// `Up`/`Down`) and the anchors, both in source image coordinates.
///
/// Left and right halves split at the nose bridge and anchor on the eye
/// line and lip line. The eye on the kept side is used, so a turned head
/// still gets an eye row from its own half. Up and down halves split at
/// the bottom of the nose and anchor where the jaw line crosses that row.
pub fn derive(landmarks: &LandmarkSet, side: Side) -> Result<(i32, AnchorPair)> {
    match side {
        Side::Left | Side::Right => {
            let bridge = centroid_of(landmarks, feature::NOSE_BRIDGE)?;
            let eye_feature = if side == Side::Left {
                feature::LEFT_EYE
            } else {
                feature::RIGHT_EYE
            };
            let eye = centroid_of(landmarks, eye_feature)?;
            let lip = centroid_of(landmarks, feature::TOP_LIP)?;

            let anchors = AnchorPair::Vertical {
                upper: Point::new(bridge.x, eye.y),
                lower: Point::new(bridge.x, lip.y),
            };
            debug!(%side, boundary = bridge.x, ?anchors, "derived vertical seam");
            Ok((bridge.x, anchors))
        }
        Side::Up | Side::Down => {
            let tip = geometry::extremal(
                landmarks.feature(feature::NOSE_TIP),
                Axis::Y,
                Direction::Max,
            )
            .map_err(tag(feature::NOSE_TIP))?;
            let (left, right) =
                geometry::nearest_intersections(tip, landmarks.feature(feature::CHIN), Axis::X)
                    .map_err(tag(feature::CHIN))?;

            let anchors = AnchorPair::Horizontal { left, right };
            debug!(%side, boundary = tip.y, ?anchors, "derived horizontal seam");
            Ok((tip.y, anchors))
        }
    }
}

fn centroid_of(landmarks: &LandmarkSet, name: &'static str) -> Result<Point> {
    geometry::centroid(landmarks.feature(name)).map_err(tag(name))
}

fn tag(feature: &'static str) -> impl Fn(GeometryError) -> Error {
    move |source| Error::Landmark { feature, source }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn pts(raw: &[(i32, i32)]) -> Vec<Point> {
        raw.iter().map(|&p| Point::from(p)).collect()
    }

    /// A frontal face roughly centred in a 200x300 frame.
    pub(crate) fn frontal_face() -> LandmarkSet {
        LandmarkSet::new()
            .with_feature(
                feature::CHIN,
                pts(&[
                    (30, 90),
                    (34, 140),
                    (44, 185),
                    (70, 230),
                    (100, 245),
                    (130, 230),
                    (156, 185),
                    (166, 140),
                    (170, 90),
                ]),
            )
            .with_feature(
                feature::NOSE_BRIDGE,
                pts(&[(100, 95), (100, 110), (100, 125), (100, 140)]),
            )
            .with_feature(
                feature::NOSE_TIP,
                pts(&[(88, 175), (94, 178), (100, 180), (106, 178), (112, 175)]),
            )
            .with_feature(
                feature::LEFT_EYE,
                pts(&[(60, 100), (70, 96), (80, 96), (90, 100), (80, 104), (70, 104)]),
            )
            .with_feature(
                feature::RIGHT_EYE,
                pts(&[(110, 104), (120, 100), (130, 100), (140, 104), (130, 108), (120, 108)]),
            )
            .with_feature(
                feature::TOP_LIP,
                pts(&[(80, 205), (100, 200), (120, 205), (100, 210)]),
            )
    }

    #[test]
    fn left_uses_left_eye_and_bridge() {
        let (boundary, anchors) = derive(&frontal_face(), Side::Left).unwrap();
        assert_eq!(boundary, 100);
        assert_eq!(
            anchors,
            AnchorPair::Vertical {
                upper: Point::new(100, 100),
                lower: Point::new(100, 205),
            }
        );
    }

    #[test]
    fn right_uses_right_eye() {
        let (boundary, anchors) = derive(&frontal_face(), Side::Right).unwrap();
        assert_eq!(boundary, 100);
        assert_eq!(anchors.first(), Point::new(100, 104));
        assert_eq!(anchors.second(), Point::new(100, 205));
    }

    #[test]
    fn up_and_down_anchor_on_the_jaw() {
        for side in [Side::Up, Side::Down] {
            let (boundary, anchors) = derive(&frontal_face(), side).unwrap();
            assert_eq!(boundary, 180);
            assert_eq!(
                anchors,
                AnchorPair::Horizontal {
                    left: Point::new(44, 185),
                    right: Point::new(156, 185),
                }
            );
        }
    }

    #[test]
    fn missing_bridge_is_reported_by_name() {
        let mut face = frontal_face();
        face.insert(feature::NOSE_BRIDGE, Vec::new());
        let err = derive(&face, Side::Left).unwrap_err();
        assert!(matches!(
            err,
            Error::Landmark {
                feature: "nose_bridge",
                source: GeometryError::EmptyInput
            }
        ));
    }

    #[test]
    fn jaw_on_one_side_only_fails() {
        let face = frontal_face().with_feature(feature::CHIN, pts(&[(130, 230), (156, 185)]));
        let err = derive(&face, Side::Down).unwrap_err();
        assert!(matches!(
            err,
            Error::Landmark {
                feature: "chin",
                source: GeometryError::NoPartition
            }
        ));
    }
}
