use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::GrayImage;
use tracing::debug;

use crate::config::DetectionParams;
use crate::policy::PolicyError;
use crate::policy::detector::{FaceBounds, FaceDetector};

/// The funnel cascade has no neighbour-merging step; its score threshold is
/// the knob that trades recall for precision. Each required confirmation is
/// worth this much score.
const SCORE_PER_NEIGHBOR: f64 = 1.0 / 3.0;

/// Face detector backed by the `rustface` crate (SeetaFace engine).
pub struct RustfaceDetector {
    model: rustface::Model,
}

impl RustfaceDetector {
    /// Load a SeetaFace frontal model from disk.
    pub fn from_path(path: &Path) -> Result<Self, PolicyError> {
        let model_error = |reason: String| PolicyError::ModelLoad {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|e| model_error(e.to_string()))?;
        let model =
            rustface::read_model(BufReader::new(file)).map_err(|e| model_error(e.to_string()))?;

        debug!(path = %path.display(), "loaded face detection model");
        Ok(Self { model })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, gray: &GrayImage, params: &DetectionParams) -> Vec<FaceBounds> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(params.min_size);
        detector.set_max_face_size(params.max_size);
        detector.set_pyramid_scale_factor((1.0 / params.scale_factor) as f32);
        detector.set_score_thresh(params.min_neighbors as f64 * SCORE_PER_NEIGHBOR);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(
            gray.as_raw(),
            gray.width(),
            gray.height(),
        ));

        faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceBounds {
                    x: bbox.x() as f64,
                    y: bbox.y() as f64,
                    width: bbox.width() as f64,
                    height: bbox.height() as f64,
                    confidence: face.score(),
                }
            })
            .collect()
    }
}
