use std::path::{Path, PathBuf};

use image::Rgb;

use crate::annotation::domain::annotator::Annotator;
use crate::annotation::domain::face_embedder::FaceEmbedder;
use crate::annotation::domain::recognition_annotator::RecognitionAnnotator;
use crate::annotation::infrastructure::cascade_face_annotator::CascadeFaceAnnotator;
use crate::annotation::infrastructure::gallery_loader::GalleryLoader;
use crate::annotation::infrastructure::onnx_arcface_embedder::OnnxArcfaceEmbedder;
use crate::annotation::infrastructure::onnx_yolo_face_annotator::OnnxYoloFaceAnnotator;
use crate::annotation::infrastructure::onnx_yolo_object_annotator::OnnxYoloObjectAnnotator;
use crate::drawing::infrastructure::box_painter::{BoxPainter, BLUE, GREEN, RED};
use crate::pipeline::pipeline_config::{DetectionConfig, PipelineConfig};
use crate::shared::error::AnnotateError;

/// Which model family annotates the frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnnotatorKind {
    /// Classical cascade face detector.
    Cascade,
    /// YOLO face network.
    Face,
    /// YOLO multi-class object network.
    Object,
    /// Face network plus ArcFace embeddings matched against a gallery.
    Recognize,
}

impl AnnotatorKind {
    pub fn box_color(self) -> Rgb<u8> {
        match self {
            AnnotatorKind::Cascade | AnnotatorKind::Face => GREEN,
            AnnotatorKind::Object => BLUE,
            AnnotatorKind::Recognize => RED,
        }
    }
}

/// Resolved files an annotator needs. `embedder` and `known_dir` are only
/// read for [`AnnotatorKind::Recognize`].
#[derive(Clone, Debug, Default)]
pub struct AnnotatorInputs {
    pub model: PathBuf,
    pub embedder: Option<PathBuf>,
    pub known_dir: Option<PathBuf>,
}

/// Loads the annotator for `kind` with the thresholds in `pipeline.detection`.
/// For recognition this also builds the gallery, which is the slowest part
/// of start-up.
pub fn create_annotator(
    kind: AnnotatorKind,
    inputs: &AnnotatorInputs,
    pipeline: &PipelineConfig,
) -> Result<Box<dyn Annotator>, AnnotateError> {
    let config = &pipeline.detection;
    config
        .validate()
        .map_err(|reason| AnnotateError::model_load(&inputs.model, reason))?;
    log::info!("Loading {kind:?} annotator from {}", inputs.model.display());
    match kind {
        AnnotatorKind::Cascade => {
            let model = existing(&inputs.model)?;
            let annotator =
                CascadeFaceAnnotator::new(model).map_err(|e| AnnotateError::model_load(model, e))?;
            Ok(Box::new(annotator))
        }
        AnnotatorKind::Face => Ok(Box::new(load_face(&inputs.model, config)?)),
        AnnotatorKind::Object => {
            let model = existing(&inputs.model)?;
            let annotator = OnnxYoloObjectAnnotator::new(
                model,
                config.confidence_threshold,
                config.iou_threshold,
            )
            .map_err(|e| AnnotateError::model_load(model, e))?;
            Ok(Box::new(annotator))
        }
        AnnotatorKind::Recognize => {
            let embedder_path = inputs.embedder.as_deref().ok_or_else(|| {
                AnnotateError::model_load(&inputs.model, "recognition needs an embedding model")
            })?;
            let known_dir = inputs.known_dir.as_deref().ok_or_else(|| {
                AnnotateError::GalleryUnavailable {
                    path: PathBuf::new(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "no known-faces directory given",
                    ),
                }
            })?;

            let mut locator = load_face(&inputs.model, config)?;
            let embedder_path = existing(embedder_path)?;
            let mut embedder = OnnxArcfaceEmbedder::new(embedder_path)
                .map_err(|e| AnnotateError::model_load(embedder_path, e))?;

            let gallery = GalleryLoader::new(&mut locator, &mut embedder).load(known_dir)?;
            Ok(Box::new(RecognitionAnnotator::new(
                Box::new(locator),
                Box::new(embedder) as Box<dyn FaceEmbedder>,
                gallery,
                config.match_tolerance,
            )))
        }
    }
}

/// Painter in the colour that belongs to `kind`.
pub fn create_painter(kind: AnnotatorKind) -> Result<BoxPainter, ab_glyph::InvalidFont> {
    BoxPainter::new(kind.box_color())
}

fn load_face(model: &Path, config: &DetectionConfig) -> Result<OnnxYoloFaceAnnotator, AnnotateError> {
    let model = existing(model)?;
    OnnxYoloFaceAnnotator::new(model, config.confidence_threshold, config.iou_threshold)
        .map_err(|e| AnnotateError::model_load(model, e))
}

fn existing(path: &Path) -> Result<&Path, AnnotateError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(AnnotateError::model_load(path, "file not found"))
    }
}
