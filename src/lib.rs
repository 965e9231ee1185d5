//! # face-splice
//!
//! Build one portrait out of two: keep one half of each face and join the
//! halves so the eyes, lips or jaw line meet across the seam.
//!
//! This crate provides:
//! - **Anchors**: split boundaries and seam anchors derived from named facial
//!   landmarks (`nose_bridge`, `left_eye`, `top_lip`, `nose_tip`, `chin`, ...)
//! - **Half extraction**: cropping a source image to one side of its face
//! - **Compositing**: scale normalisation, seam alignment and pasting
//! - **Landmark files**: a JSON landmark source, plus conversion from the
//!   68-point iBUG layout
//!
//! ## Algorithm Overview
//!
//! 1. Find the face in each source image and derive the split boundary:
//!    - left/right: the x of the nose bridge centre
//!    - up/down: the row of the lowest nose tip point
//! 2. Derive two anchors per face on that boundary:
//!    - left/right: eye line and upper lip line
//!    - up/down: where the jaw line crosses the nose tip row
//! 3. Crop each image to its kept half and move the anchors into the crop
//! 4. Shrink the half with the larger anchor spacing so both match
//! 5. Trim both halves so their anchors line up, then paste them together
//!
//! ## Quick Start
//!
//! ```rust
//! use face_splice::{extract, join_horizontal, feature, FilterType, LandmarkSet, Point, Side};
//! use image::RgbImage;
//!
//! let face = LandmarkSet::new()
//!     .with_feature(feature::NOSE_BRIDGE, vec![Point::new(50, 40), Point::new(50, 60)])
//!     .with_feature(feature::LEFT_EYE, vec![Point::new(30, 45), Point::new(40, 45)])
//!     .with_feature(feature::RIGHT_EYE, vec![Point::new(60, 45), Point::new(70, 45)])
//!     .with_feature(feature::TOP_LIP, vec![Point::new(45, 80), Point::new(55, 80)]);
//! let image = RgbImage::new(100, 120);
//!
//! let left = extract(&image, &face, Side::Left).unwrap();
//! let right = extract(&image, &face, Side::Right).unwrap();
//! let composite = join_horizontal(left, right, FilterType::CatmullRom).unwrap();
//! assert_eq!(composite.image.dimensions(), (100, 120));
//! ```
//!
//! ## Custom Landmark Sources
//!
//! Implement [`LandmarkDetector`] to feed landmarks from your own model:
//!
//! ```rust
//! use std::path::Path;
//! use face_splice::{LandmarkDetector, LandmarkSet, Result};
//! use image::RgbImage;
//!
//! struct MyModel;
//!
//! impl LandmarkDetector for MyModel {
//!     fn face_landmarks(&self, _image: &RgbImage, _source: &Path) -> Result<Vec<LandmarkSet>> {
//!         // Run the model on the image; one LandmarkSet per face.
//!         Ok(Vec::new())
//!     }
//! }
//! ```

pub mod anchors;
pub mod annotate;
mod composite;
pub mod detector;
mod error;
pub mod geometry;
mod half;
pub mod raster;
mod types;

pub use annotate::annotate;
pub use composite::{
    join, join_horizontal, join_vertical, Arrangement, Composite, CompositeLayout, Compositor,
    ScaleMetric,
};
pub use detector::{read_landmarks, write_landmarks, FaceSelection, LandmarkDetector, LandmarkFiles};
pub use error::{Error, Result};
pub use geometry::GeometryError;
pub use half::{extract, HalfImage};
pub use image::imageops::FilterType;
pub use types::{feature, AnchorPair, Axis, Direction, LandmarkSet, Point, Side};
