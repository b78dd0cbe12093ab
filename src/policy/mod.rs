//! Acceptance policies: decide whether a decoded candidate is kept and what
//! gets written for it.

pub mod aspect;
pub mod detector;
pub mod enhance;
pub mod face;
pub mod rustface_backend;

pub use aspect::AspectRatioPolicy;
pub use detector::{FaceBounds, FaceDetector};
pub use face::{CropRegion, FacePolicy};
pub use rustface_backend::RustfaceDetector;

use std::fmt;
use std::path::PathBuf;

use image::GrayImage;
use thiserror::Error;

use crate::config::{Config, PolicyMode};
use crate::decoder::DecodedImage;

/// One image buffer to persist.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub image: GrayImage,
    /// 1-based position of the face within its source image, for face crops.
    pub face_index: Option<usize>,
}

impl Artifact {
    pub fn whole(image: GrayImage) -> Self {
        Self {
            image,
            face_index: None,
        }
    }

    pub fn face(image: GrayImage, face_index: usize) -> Self {
        Self {
            image,
            face_index: Some(face_index),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    TooSmall { width: u32, height: u32 },
    WrongAspectRatio { ratio: f64 },
    NoFaces,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall { width, height } => write!(f, "too small ({width}x{height})"),
            Self::WrongAspectRatio { ratio } => write!(f, "wrong aspect ratio ({ratio:.2})"),
            Self::NoFaces => f.write_str("no faces detected"),
        }
    }
}

/// Outcome of running a policy on one image. Accepting always carries at
/// least one artifact.
#[derive(Debug, Clone)]
pub enum Decision {
    Accept(Vec<Artifact>),
    Reject(RejectReason),
}

impl Decision {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept(_))
    }

    pub fn artifact_count(&self) -> usize {
        match self {
            Self::Accept(artifacts) => artifacts.len(),
            Self::Reject(_) => 0,
        }
    }
}

/// Turns a decoded image into zero or more artifacts.
pub trait AcceptancePolicy: Send + Sync {
    fn evaluate(&self, decoded: &DecodedImage) -> Decision;

    /// Short label used in logs.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to load face model from {}: {reason}", path.display())]
    ModelLoad { path: PathBuf, reason: String },
}

/// The policy a deployment runs with, chosen once from [`PolicyMode`].
pub enum Policy {
    Aspect(AspectRatioPolicy),
    Face(FacePolicy),
}

impl Policy {
    /// Build the configured policy. Face mode loads the rustface model.
    pub fn from_config(config: &Config) -> Result<Self, PolicyError> {
        match config.mode() {
            PolicyMode::Aspect => Ok(Self::Aspect(AspectRatioPolicy::new(*config.aspect()))),
            PolicyMode::Face => {
                let detector = RustfaceDetector::from_path(config.face_model_path())?;
                Ok(Self::with_detector(config, Box::new(detector)))
            }
        }
    }

    /// Face policy with a caller-supplied detector.
    pub fn with_detector(config: &Config, detector: Box<dyn FaceDetector>) -> Self {
        Self::Face(FacePolicy::new(
            detector,
            *config.detection(),
            *config.face_crop(),
        ))
    }

    pub fn mode(&self) -> PolicyMode {
        match self {
            Self::Aspect(_) => PolicyMode::Aspect,
            Self::Face(_) => PolicyMode::Face,
        }
    }
}

impl AcceptancePolicy for Policy {
    fn evaluate(&self, decoded: &DecodedImage) -> Decision {
        match self {
            Self::Aspect(policy) => policy.evaluate(decoded),
            Self::Face(policy) => policy.evaluate(decoded),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Aspect(policy) => policy.name(),
            Self::Face(policy) => policy.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AspectThresholds, DetectionParams};
    use image::{DynamicImage, ImageFormat, RgbImage};

    fn decoded(width: u32, height: u32) -> DecodedImage {
        DecodedImage {
            format: ImageFormat::Png,
            image: DynamicImage::ImageRgb8(RgbImage::new(width, height)),
        }
    }

    struct OneFace(f64);

    impl FaceDetector for OneFace {
        fn detect(&self, _gray: &GrayImage, _params: &DetectionParams) -> Vec<FaceBounds> {
            vec![FaceBounds::new(10.0, 10.0, self.0, self.0)]
        }
    }

    #[test]
    fn reject_reasons_are_distinguishable() {
        assert_eq!(
            RejectReason::TooSmall {
                width: 400,
                height: 480
            }
            .to_string(),
            "too small (400x480)"
        );
        assert_eq!(
            RejectReason::WrongAspectRatio { ratio: 1.6667 }.to_string(),
            "wrong aspect ratio (1.67)"
        );
        assert_eq!(RejectReason::NoFaces.to_string(), "no faces detected");
    }

    #[test]
    fn aspect_mode_needs_no_model() {
        let config = Config::new(["cat"]).with_face_model_path("/nonexistent/model.bin");
        let policy = Policy::from_config(&config).unwrap();
        assert_eq!(policy.mode(), PolicyMode::Aspect);
        assert_eq!(policy.name(), "aspect");
    }

    #[test]
    fn aspect_policy_uses_configured_thresholds() {
        let config = Config::new(["cat"]).with_aspect_thresholds(AspectThresholds {
            min_width: 200,
            min_height: 200,
            min_ratio: 0.5,
            max_ratio: 2.0,
        });
        let policy = Policy::from_config(&config).unwrap();

        assert!(policy.evaluate(&decoded(300, 200)).is_accept());
        assert!(!Policy::from_config(&Config::new(["cat"]))
            .unwrap()
            .evaluate(&decoded(300, 200))
            .is_accept());
    }

    #[test]
    fn face_policy_uses_configured_size_bounds() {
        let params = DetectionParams {
            min_size: 20,
            max_size: 60,
            ..DetectionParams::default()
        };
        let config = Config::new(["cat"])
            .with_mode(PolicyMode::Face)
            .with_detection_params(params);

        let small_face = Policy::with_detector(&config, Box::new(OneFace(40.0)));
        assert_eq!(small_face.evaluate(&decoded(200, 200)).artifact_count(), 1);

        let large_face = Policy::with_detector(&config, Box::new(OneFace(80.0)));
        assert!(matches!(
            large_face.evaluate(&decoded(200, 200)),
            Decision::Reject(RejectReason::NoFaces)
        ));
    }

    #[test]
    fn face_mode_reports_missing_model() {
        let config = Config::new(["cat"])
            .with_mode(PolicyMode::Face)
            .with_face_model_path("/nonexistent/model.bin");
        let err = Policy::from_config(&config).err().unwrap();
        assert!(matches!(err, PolicyError::ModelLoad { .. }));
        assert!(err.to_string().contains("/nonexistent/model.bin"));
    }
}
