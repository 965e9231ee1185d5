use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::geometry::GeometryError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no face detected in {}", path.display())]
    DetectionFailed { path: PathBuf },

    #[error("landmark feature `{feature}`: {source}")]
    Landmark {
        feature: &'static str,
        #[source]
        source: GeometryError,
    },

    #[error("unsupported side `{0}` (expected left, right, upside or downside)")]
    UnsupportedSide(String),

    #[error("region of {width}x{height} pixels is empty")]
    EmptyRegion { width: i64, height: i64 },

    #[error("anchor pair has zero length, cannot derive a scale ratio")]
    DegenerateAnchors,

    #[error("cannot join a {first} seam with a {second} seam")]
    SeamMismatch {
        first: &'static str,
        second: &'static str,
    },

    #[error("{}: {source}", path.display())]
    Face {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image error on {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid landmark file {}: {source}", path.display())]
    Landmarks {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Attach the image whose face caused this error.
    pub fn in_image(self, path: &Path) -> Self {
        Error::Face {
            path: path.to_path_buf(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
