use image::{DynamicImage, GrayImage};
use tracing::debug;

use crate::config::{DetectionParams, FaceCropSettings};
use crate::decoder::DecodedImage;
use crate::policy::detector::{FaceBounds, FaceDetector};
use crate::policy::{AcceptancePolicy, Artifact, Decision, RejectReason, enhance};

/// Crop region within the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Grow a face box by `padding × face width` on every side and clamp it to
/// the image. Returns `None` when nothing of the box lies inside the image.
pub fn padded_region(
    face: &FaceBounds,
    padding: f64,
    image_width: u32,
    image_height: u32,
) -> Option<CropRegion> {
    let pad = (face.width * padding).floor();
    let (max_x, max_y) = (image_width as f64, image_height as f64);

    let left = (face.x - pad).clamp(0.0, max_x);
    let top = (face.y - pad).clamp(0.0, max_y);
    let right = (face.x + face.width + pad).clamp(0.0, max_x);
    let bottom = (face.y + face.height + pad).clamp(0.0, max_y);

    let (x, y) = (left.floor() as u32, top.floor() as u32);
    let (x_end, y_end) = (right.floor() as u32, bottom.floor() as u32);
    if x_end <= x || y_end <= y {
        return None;
    }

    Some(CropRegion {
        x,
        y,
        width: x_end - x,
        height: y_end - y,
    })
}

/// Keeps one enhanced grayscale crop per detected face.
pub struct FacePolicy {
    detector: Box<dyn FaceDetector>,
    params: DetectionParams,
    crop: FaceCropSettings,
}

impl FacePolicy {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        params: DetectionParams,
        crop: FaceCropSettings,
    ) -> Self {
        Self {
            detector,
            params,
            crop,
        }
    }

    /// Grayscale plus histogram equalization, the detector's input.
    fn prepare(image: &DynamicImage) -> GrayImage {
        enhance::equalize_histogram(&image.to_luma8())
    }

    fn face_artifact(&self, image: &DynamicImage, region: CropRegion) -> GrayImage {
        let crop = image
            .crop_imm(region.x, region.y, region.width, region.height)
            .to_luma8();
        let contrasted = enhance::adjust_contrast(&crop, self.crop.contrast);
        enhance::adjust_sharpness(&contrasted, self.crop.sharpness)
    }
}

impl AcceptancePolicy for FacePolicy {
    fn evaluate(&self, decoded: &DecodedImage) -> Decision {
        let (width, height) = decoded.dimensions();
        let prepared = Self::prepare(&decoded.image);

        let faces: Vec<FaceBounds> = self
            .detector
            .detect(&prepared, &self.params)
            .into_iter()
            .filter(|face| face.within_size(&self.params))
            .collect();
        debug!(faces = faces.len(), width, height, "face detection finished");

        let artifacts: Vec<Artifact> = faces
            .iter()
            .filter_map(|face| padded_region(face, self.crop.padding, width, height))
            .enumerate()
            .map(|(i, region)| Artifact::face(self.face_artifact(&decoded.image, region), i + 1))
            .collect();

        if artifacts.is_empty() {
            return Decision::Reject(RejectReason::NoFaces);
        }
        Decision::Accept(artifacts)
    }

    fn name(&self) -> &'static str {
        "face"
    }
}
