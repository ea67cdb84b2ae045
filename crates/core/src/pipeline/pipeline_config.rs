use crate::shared::constants::{
    DEFAULT_FPS, FACE_CONFIDENCE_THRESHOLD, FACE_IOU_THRESHOLD, MATCH_TOLERANCE,
    OBJECT_CONFIDENCE_THRESHOLD, OBJECT_IOU_THRESHOLD,
};

/// Default number of frames between progress log lines.
pub const DEFAULT_PROGRESS_EVERY: usize = 30;

/// Thresholds handed to the annotator at construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionConfig {
    /// Minimum score for a network detection to be kept.
    pub confidence_threshold: f64,
    /// Overlap above which the lower-scored of two boxes is suppressed.
    pub iou_threshold: f64,
    /// Maximum cosine distance for a recognition match.
    pub match_tolerance: f64,
}

impl DetectionConfig {
    pub fn face() -> Self {
        Self {
            confidence_threshold: FACE_CONFIDENCE_THRESHOLD,
            iou_threshold: FACE_IOU_THRESHOLD,
            match_tolerance: MATCH_TOLERANCE,
        }
    }

    pub fn object() -> Self {
        Self {
            confidence_threshold: OBJECT_CONFIDENCE_THRESHOLD,
            iou_threshold: OBJECT_IOU_THRESHOLD,
            match_tolerance: MATCH_TOLERANCE,
        }
    }

    /// Checks every threshold is inside its meaningful range.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "confidence must be between 0 and 1, got {}",
                self.confidence_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(format!(
                "iou must be between 0 and 1, got {}",
                self.iou_threshold
            ));
        }
        if !(self.match_tolerance > 0.0 && self.match_tolerance <= 2.0) {
            return Err(format!(
                "tolerance must be in (0, 2], got {}",
                self.match_tolerance
            ));
        }
        Ok(())
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self::face()
    }
}

/// Run-wide tunables, fixed before the pipeline starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineConfig {
    pub detection: DetectionConfig,
    /// Output frame rate when the source reports none.
    pub fallback_fps: f64,
    pub progress_every: usize,
    /// Stop after this many frames. `None` runs until the source ends, which
    /// for a camera means until the run is cancelled.
    pub max_frames: Option<usize>,
}

impl PipelineConfig {
    pub fn new(detection: DetectionConfig) -> Self {
        Self {
            detection,
            ..Self::default()
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            fallback_fps: DEFAULT_FPS,
            progress_every: DEFAULT_PROGRESS_EVERY,
            max_frames: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_variant_defaults() {
        let face = DetectionConfig::face();
        assert_relative_eq!(face.confidence_threshold, 0.5);
        assert_relative_eq!(face.iou_threshold, 0.3);

        let object = DetectionConfig::object();
        assert_relative_eq!(object.confidence_threshold, 0.25);
        assert_relative_eq!(object.iou_threshold, 0.7);
        assert_relative_eq!(object.match_tolerance, 0.5);
    }

    #[test]
    fn test_pipeline_defaults() {
        let config = PipelineConfig::new(DetectionConfig::object());
        assert_relative_eq!(config.fallback_fps, 25.0);
        assert_eq!(config.progress_every, DEFAULT_PROGRESS_EVERY);
        assert_eq!(config.detection, DetectionConfig::object());
        assert_eq!(config.max_frames, None);
    }

    #[rstest]
    #[case::defaults(0.5, 0.3, 0.5, true)]
    #[case::bounds(0.0, 1.0, 2.0, true)]
    #[case::confidence_above_one(1.5, 0.3, 0.5, false)]
    #[case::negative_iou(0.5, -0.1, 0.5, false)]
    #[case::zero_tolerance(0.5, 0.3, 0.0, false)]
    #[case::tolerance_above_two(0.5, 0.3, 2.5, false)]
    #[case::nan_confidence(f64::NAN, 0.3, 0.5, false)]
    fn test_validate(
        #[case] confidence: f64,
        #[case] iou: f64,
        #[case] tolerance: f64,
        #[case] ok: bool,
    ) {
        let config = DetectionConfig {
            confidence_threshold: confidence,
            iou_threshold: iou,
            match_tolerance: tolerance,
        };
        assert_eq!(config.validate().is_ok(), ok);
    }
}
