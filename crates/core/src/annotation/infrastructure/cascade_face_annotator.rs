/// Classical cascade face annotator backed by `rustface` (SeetaFace funnel
/// cascade). Runs on the grayscale frame and returns plain boxes with no
/// caption.
use std::path::Path;

use crate::annotation::domain::annotator::Annotator;
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

/// Smallest face side, in pixels, the cascade will report.
pub const MIN_FACE_SIZE: u32 = 30;

/// Pyramid step between scales; 0.8 shrinks the image by 20% per level.
const PYRAMID_SCALE_FACTOR: f32 = 0.8;

const SCORE_THRESHOLD: f64 = 2.0;
const SLIDE_WINDOW_STEP: u32 = 4;

pub struct CascadeFaceAnnotator {
    detector: Box<dyn rustface::Detector>,
}

impl CascadeFaceAnnotator {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let path = model_path
            .to_str()
            .ok_or_else(|| format!("Model path is not valid UTF-8: {}", model_path.display()))?;
        let mut detector = rustface::create_detector(path)?;
        detector.set_min_face_size(MIN_FACE_SIZE);
        detector.set_score_thresh(SCORE_THRESHOLD);
        detector.set_pyramid_scale_factor(PYRAMID_SCALE_FACTOR);
        detector.set_slide_window_step(SLIDE_WINDOW_STEP, SLIDE_WINDOW_STEP);
        log::debug!("Loaded cascade model {}", model_path.display());
        Ok(Self { detector })
    }
}

/// Grayscale copy of an RGB frame.
fn to_luma(frame: &Frame) -> Result<image::GrayImage, Box<dyn std::error::Error>> {
    let rgb = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or("Frame data does not match its dimensions")?;
    Ok(image::imageops::grayscale(&rgb))
}

impl Annotator for CascadeFaceAnnotator {
    fn annotate(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let luma = to_luma(frame)?;
        let (width, height) = luma.dimensions();
        let mut image = rustface::ImageData::new(luma.as_raw(), width, height);

        let faces = self
            .detector
            .detect(&mut image)
            .into_iter()
            .map(|face| {
                let bbox = face.bbox();
                let x1 = bbox.x() as f64;
                let y1 = bbox.y() as f64;
                Detection::new(x1, y1, x1 + bbox.width() as f64, y1 + bbox.height() as f64)
            })
            .collect();
        Ok(faces)
    }
}
