use crate::config::AspectThresholds;
use crate::decoder::DecodedImage;
use crate::policy::{AcceptancePolicy, Artifact, Decision, RejectReason};

/// Keeps large, portrait-leaning images whole.
#[derive(Debug, Clone)]
pub struct AspectRatioPolicy {
    thresholds: AspectThresholds,
}

impl AspectRatioPolicy {
    pub fn new(thresholds: AspectThresholds) -> Self {
        Self { thresholds }
    }
}

impl Default for AspectRatioPolicy {
    fn default() -> Self {
        Self::new(AspectThresholds::default())
    }
}

impl AcceptancePolicy for AspectRatioPolicy {
    fn evaluate(&self, decoded: &DecodedImage) -> Decision {
        let (width, height) = decoded.dimensions();
        let t = &self.thresholds;

        if width < t.min_width || height < t.min_height {
            return Decision::Reject(RejectReason::TooSmall { width, height });
        }

        let ratio = height as f64 / width as f64;
        if !(t.min_ratio..=t.max_ratio).contains(&ratio) {
            return Decision::Reject(RejectReason::WrongAspectRatio { ratio });
        }

        Decision::Accept(vec![Artifact::whole(decoded.image.to_luma8())])
    }

    fn name(&self) -> &'static str {
        "aspect"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};

    fn decoded(width: u32, height: u32) -> DecodedImage {
        DecodedImage {
            format: ImageFormat::Png,
            image: DynamicImage::ImageRgb8(RgbImage::new(width, height)),
        }
    }

    fn evaluate(width: u32, height: u32) -> Decision {
        AspectRatioPolicy::default().evaluate(&decoded(width, height))
    }

    #[test]
    fn accepts_large_portrait() {
        let Decision::Accept(artifacts) = evaluate(600, 720) else {
            panic!("expected accept");
        };
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].image.dimensions(), (600, 720));
        assert_eq!(artifacts[0].face_index, None);
    }

    #[test]
    fn rejects_small_images() {
        assert!(matches!(
            evaluate(400, 480),
            Decision::Reject(RejectReason::TooSmall {
                width: 400,
                height: 480
            })
        ));
        // Size is checked before the ratio
        assert!(matches!(
            evaluate(100, 900),
            Decision::Reject(RejectReason::TooSmall { .. })
        ));
    }

    #[test]
    fn rejects_tall_ratio() {
        assert!(matches!(
            evaluate(600, 1000),
            Decision::Reject(RejectReason::WrongAspectRatio { .. })
        ));
    }

    #[test]
    fn rejects_landscape() {
        assert!(matches!(
            evaluate(800, 600),
            Decision::Reject(RejectReason::WrongAspectRatio { .. })
        ));
    }

    #[test]
    fn ratio_bounds_are_inclusive() {
        assert!(evaluate(500, 500).is_accept());
        assert!(evaluate(1000, 1300).is_accept());
        assert!(!evaluate(1000, 1310).is_accept());
        assert!(!evaluate(1000, 999).is_accept());
    }
}
