//! Where landmark sets come from, and which one gets used.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use image::RgbImage;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::{LandmarkSet, Point};

/// Pluggable landmark source.
///
/// Implement this to hook up a landmark model. `source` is the file the
/// image was decoded from, for backends that key results by path.
pub trait LandmarkDetector {
    /// All faces found in `image`, in detector order. An empty list means
    /// no face was found.
    fn face_landmarks(&self, image: &RgbImage, source: &Path) -> Result<Vec<LandmarkSet>>;
}

impl<D: LandmarkDetector + ?Sized> LandmarkDetector for &D {
    fn face_landmarks(&self, image: &RgbImage, source: &Path) -> Result<Vec<LandmarkSet>> {
        (**self).face_landmarks(image, source)
    }
}

impl<D: LandmarkDetector + ?Sized> LandmarkDetector for Box<D> {
    fn face_landmarks(&self, image: &RgbImage, source: &Path) -> Result<Vec<LandmarkSet>> {
        (**self).face_landmarks(image, source)
    }
}

/// Which face to use when a detector reports several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaceSelection {
    /// The first face in detector order. Others are ignored.
    #[default]
    First,
}

impl FaceSelection {
    pub fn select(self, faces: Vec<LandmarkSet>, source: &Path) -> Result<LandmarkSet> {
        let count = faces.len();
        let face = match self {
            FaceSelection::First => faces.into_iter().next(),
        };
        let face = face.ok_or_else(|| Error::DetectionFailed {
            path: source.to_path_buf(),
        })?;
        if count > 1 {
            warn!(path = %source.display(), faces = count, "several faces found, using the first");
        }
        Ok(face)
    }
}

/// Landmarks read from JSON files prepared ahead of time.
///
/// The file for `portrait.jpg` is `portrait.json`, either next to the
/// image or in a shared directory. It holds a JSON array with one entry
/// per face. An entry is either an object from feature name to `[x, y]`
/// points, or a flat list of 68 `[x, y]` points in iBUG order.
#[derive(Debug, Clone, Default)]
pub struct LandmarkFiles {
    dir: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FaceRecord {
    Named(LandmarkSet),
    Ibug(Vec<Point>),
}

impl LandmarkFiles {
    /// Look for each landmark file next to its image.
    pub fn beside_images() -> Self {
        Self { dir: None }
    }

    /// Look for landmark files in `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn path_for(&self, image: &Path) -> PathBuf {
        let mut file_name = image.file_stem().unwrap_or(image.as_os_str()).to_os_string();
        file_name.push(".json");
        match &self.dir {
            Some(dir) => dir.join(file_name),
            None => image.with_file_name(file_name),
        }
    }
}

impl LandmarkDetector for LandmarkFiles {
    fn face_landmarks(&self, _image: &RgbImage, source: &Path) -> Result<Vec<LandmarkSet>> {
        let path = self.path_for(source);
        debug!(image = %source.display(), landmarks = %path.display(), "reading landmark file");
        read_landmarks(&path)
    }
}

/// Parse a landmark file.
pub fn read_landmarks(path: &Path) -> Result<Vec<LandmarkSet>> {
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let landmarks_err = |source| Error::Landmarks {
        path: path.to_path_buf(),
        source,
    };

    let records: Vec<FaceRecord> =
        serde_json::from_reader(BufReader::new(file)).map_err(landmarks_err)?;

    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| match record {
            FaceRecord::Named(set) => Ok(set),
            FaceRecord::Ibug(points) => LandmarkSet::from_ibug_68(&points).ok_or_else(|| {
                landmarks_err(serde::de::Error::custom(format!(
                    "face {} has {} points, expected 68",
                    i,
                    points.len()
                )))
            }),
        })
        .collect()
}

/// Write faces in the named-feature layout `read_landmarks` accepts.
pub fn write_landmarks(path: &Path, faces: &[LandmarkSet]) -> Result<()> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    serde_json::to_writer_pretty(&mut writer, faces).map_err(|source| Error::Landmarks {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::feature;

    #[test]
    fn landmark_file_location() {
        let beside = LandmarkFiles::beside_images();
        assert_eq!(
            beside.path_for(Path::new("faces/alice.jpg")),
            PathBuf::from("faces/alice.json")
        );

        let shared = LandmarkFiles::in_dir("/tmp/marks");
        assert_eq!(
            shared.path_for(Path::new("faces/bob.final.png")),
            PathBuf::from("/tmp/marks/bob.final.json")
        );
    }

    #[test]
    fn reads_named_and_ibug_faces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("group.json");
        let ibug: Vec<[i32; 2]> = (0..68).map(|i| [i, 2 * i]).collect();
        let json = serde_json::json!([
            { "nose_bridge": [[10, 20], [10, 30]], "chin": [] },
            ibug,
        ]);
        std::fs::write(&path, json.to_string()).unwrap();

        let faces = read_landmarks(&path).unwrap();
        assert_eq!(faces.len(), 2);
        assert_eq!(
            faces[0].feature(feature::NOSE_BRIDGE),
            &[Point::new(10, 20), Point::new(10, 30)]
        );
        assert!(faces[0].feature(feature::CHIN).is_empty());
        assert_eq!(faces[1].feature(feature::NOSE_TIP)[0], Point::new(31, 62));
    }

    #[test]
    fn short_ibug_face_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.json");
        std::fs::write(&path, "[[[1, 2], [3, 4]]]").unwrap();

        let err = read_landmarks(&path).unwrap_err();
        assert!(matches!(err, Error::Landmarks { .. }));
        assert!(err.to_string().contains("expected 68"));
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.json");
        let face = LandmarkSet::new().with_feature(feature::TOP_LIP, vec![Point::new(1, 2)]);

        write_landmarks(&path, &[face.clone()]).unwrap();
        assert_eq!(read_landmarks(&path).unwrap(), vec![face]);
    }

    #[test]
    fn missing_file_names_path() {
        let err = read_landmarks(Path::new("/nonexistent/face.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/face.json"));
    }

    #[test]
    fn first_face_policy() {
        let a = LandmarkSet::new().with_feature(feature::CHIN, vec![Point::new(1, 1)]);
        let b = LandmarkSet::new().with_feature(feature::CHIN, vec![Point::new(2, 2)]);
        let picked = FaceSelection::First
            .select(vec![a.clone(), b], Path::new("x.jpg"))
            .unwrap();
        assert_eq!(picked, a);

        let err = FaceSelection::default()
            .select(Vec::new(), Path::new("empty.jpg"))
            .unwrap_err();
        assert!(matches!(err, Error::DetectionFailed { ref path } if path == Path::new("empty.jpg")));
    }
}
