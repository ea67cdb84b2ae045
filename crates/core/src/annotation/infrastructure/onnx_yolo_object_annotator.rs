/// YOLO multi-class object annotator using ONNX Runtime via `ort`.
///
/// Boxes are captioned `"{class} {confidence:.2}"`. NMS runs per class.
use std::path::Path;

use crate::annotation::domain::annotator::Annotator;
use crate::annotation::infrastructure::class_names::{ClassNames, NAMES_METADATA_KEY};
use crate::annotation::infrastructure::math::nms;
use crate::annotation::infrastructure::onnx_session::{self, DEFAULT_INPUT_SIZE};
use crate::annotation::infrastructure::yolo_decoder::{self, Letterbox, ScoreLayout};
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

pub struct OnnxYoloObjectAnnotator {
    session: ort::session::Session,
    class_names: ClassNames,
    confidence: f64,
    iou_threshold: f64,
    input_size: u32,
}

impl OnnxYoloObjectAnnotator {
    pub fn new(
        model_path: &Path,
        confidence: f64,
        iou_threshold: f64,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let session = onnx_session::load_session(model_path)?;
        let input_size = onnx_session::input_size(&session).unwrap_or(DEFAULT_INPUT_SIZE);
        let raw_names = onnx_session::custom_metadata(&session, NAMES_METADATA_KEY);
        let class_names = ClassNames::from_metadata(raw_names.as_deref());
        log::debug!("Object model has {} classes", class_names.len());
        Ok(Self {
            session,
            class_names,
            confidence,
            iou_threshold,
            input_size,
        })
    }

    pub fn class_names(&self) -> &ClassNames {
        &self.class_names
    }
}

impl Annotator for OnnxYoloObjectAnnotator {
    fn annotate(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let (input_tensor, placement) = yolo_decoder::letterbox(frame, self.input_size);

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("YOLO object model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;

        postprocess(
            data,
            tensor.shape(),
            placement,
            &self.class_names,
            self.confidence,
            self.iou_threshold,
        )
    }
}

/// Raw `[1, 4 + classes, anchors]` output (either orientation) to labelled
/// boxes in source coordinates, suppressed per class.
pub(crate) fn postprocess(
    data: &[f32],
    shape: &[usize],
    placement: Letterbox,
    class_names: &ClassNames,
    confidence: f64,
    iou_threshold: f64,
) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
    // Rows are 4 box values followed by one score per class
    let num_feats = shape.get(1..3).map_or(0, |s| s[0].min(s[1]));
    let num_classes = num_feats.saturating_sub(4);

    let candidates = yolo_decoder::decode(
        data,
        shape,
        ScoreLayout::MultiClass { num_classes },
        placement,
        confidence,
    )?;

    let labelled = candidates
        .into_iter()
        .map(|c| c.detection.with_label(class_names.name(c.class_id)))
        .collect();
    Ok(nms(labelled, iou_threshold))
}
