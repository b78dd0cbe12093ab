//! Where accepted artifacts end up on disk.
//!
//! ```text
//! <root>/<keyword>/<keyword>_<n>.jpg
//! <root>/<keyword>/faces/<keyword>_face_<n>_<face>.jpg
//! ```
//!
//! `n` is the 1-based position of the source image among the keyword's
//! accepted images; `face` is the 1-based face position within that image.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Config, PolicyMode};
use crate::policy::Artifact;

const FACES_DIR: &str = "faces";

#[derive(Debug, Error)]
#[error("failed to write {}: {source}", path.display())]
pub struct PersistError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl PersistError {
    fn new(path: &Path, source: impl Into<std::io::Error>) -> Self {
        Self {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}

/// Pure path computations for the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn keyword_dir(&self, keyword: &str) -> PathBuf {
        self.root.join(keyword)
    }

    pub fn faces_dir(&self, keyword: &str) -> PathBuf {
        self.keyword_dir(keyword).join(FACES_DIR)
    }

    /// Path of a whole accepted image.
    pub fn image_path(&self, keyword: &str, accepted_index: usize) -> PathBuf {
        self.keyword_dir(keyword)
            .join(format!("{keyword}_{accepted_index}.jpg"))
    }

    /// Path of one face crop.
    pub fn face_path(&self, keyword: &str, accepted_index: usize, face_index: usize) -> PathBuf {
        self.faces_dir(keyword)
            .join(format!("{keyword}_face_{accepted_index}_{face_index}.jpg"))
    }

    /// Path for `artifact`, given how many images were accepted before it.
    pub fn artifact_path(
        &self,
        keyword: &str,
        accepted_so_far: usize,
        artifact: &Artifact,
    ) -> PathBuf {
        let accepted_index = accepted_so_far + 1;
        match artifact.face_index {
            Some(face_index) => self.face_path(keyword, accepted_index, face_index),
            None => self.image_path(keyword, accepted_index),
        }
    }
}

/// Writes artifacts as JPEG files under an [`OutputLayout`].
#[derive(Debug, Clone)]
pub struct JpegSink {
    layout: OutputLayout,
    quality: u8,
}

impl JpegSink {
    pub fn new(layout: OutputLayout, quality: u8) -> Self {
        Self { layout, quality }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(OutputLayout::new(config.output_dir()), config.jpeg_quality())
    }

    /// Create the keyword directory, and the faces directory in face mode.
    /// Safe to call repeatedly.
    pub fn ensure_dirs(&self, keyword: &str, mode: PolicyMode) -> Result<(), PersistError> {
        let dir = match mode {
            PolicyMode::Aspect => self.layout.keyword_dir(keyword),
            PolicyMode::Face => self.layout.faces_dir(keyword),
        };
        fs::create_dir_all(&dir).map_err(|e| PersistError::new(&dir, e))
    }

    /// Write every artifact of one accepted image, all or nothing. On the
    /// first failure the files already written for this image are removed.
    pub fn persist(
        &self,
        keyword: &str,
        accepted_so_far: usize,
        artifacts: &[Artifact],
    ) -> Result<Vec<PathBuf>, PersistError> {
        let mut written = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let path = self.layout.artifact_path(keyword, accepted_so_far, artifact);
            if let Err(e) = self.write_jpeg(&path, artifact) {
                discard(written.iter().map(PathBuf::as_path));
                return Err(e);
            }
            debug!(path = %path.display(), "artifact written");
            written.push(path);
        }
        Ok(written)
    }

    fn write_jpeg(&self, path: &Path, artifact: &Artifact) -> Result<(), PersistError> {
        let file = File::create(path).map_err(|e| PersistError::new(path, e))?;
        self.encode_into(file, artifact).map_err(|e| {
            discard([path]);
            PersistError::new(path, e)
        })
    }

    fn encode_into(&self, file: File, artifact: &Artifact) -> std::io::Result<()> {
        let mut writer = BufWriter::new(file);

        let image = &artifact.image;
        JpegEncoder::new_with_quality(&mut writer, self.quality)
            .encode(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::L8,
            )
            .map_err(std::io::Error::other)?;

        writer.into_inner().map_err(|e| e.into_error())?.sync_all()
    }
}

/// Best-effort removal of files from an image that could not be saved whole.
fn discard<'a>(paths: impl IntoIterator<Item = &'a Path>) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "could not remove partial artifact");
        }
    }
}
