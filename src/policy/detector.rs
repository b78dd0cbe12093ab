use image::GrayImage;

use crate::config::DetectionParams;

/// Bounding box of a detected face within an image.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceBounds {
    /// X coordinate of the top-left corner (pixels).
    pub x: f64,
    /// Y coordinate of the top-left corner (pixels).
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Detector-specific confidence score.
    pub confidence: f64,
}

impl FaceBounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence: 0.0,
        }
    }

    /// Whether the box side lengths lie within the detector size limits.
    pub fn within_size(&self, params: &DetectionParams) -> bool {
        let side = self.width.max(self.height);
        side >= params.min_size as f64 && side <= params.max_size as f64
    }
}

/// Pluggable face detection backend.
///
/// The detector only sees the prepared (grayscale, equalized) image and the
/// tuning parameters; cropping happens in [`super::FacePolicy`].
pub trait FaceDetector: Send + Sync {
    fn detect(&self, gray: &GrayImage, params: &DetectionParams) -> Vec<FaceBounds>;
}
