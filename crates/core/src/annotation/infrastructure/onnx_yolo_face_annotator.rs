/// YOLO face annotator using ONNX Runtime via `ort`.
///
/// Letterboxes the frame, runs the network, keeps faces at or above the
/// confidence threshold and suppresses overlaps with greedy NMS. Each box is
/// captioned with its confidence only.
use std::path::Path;

use crate::annotation::domain::annotator::Annotator;
use crate::annotation::infrastructure::math::nms;
use crate::annotation::infrastructure::onnx_session::{self, DEFAULT_INPUT_SIZE};
use crate::annotation::infrastructure::yolo_decoder::{self, Letterbox, ScoreLayout};
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

pub struct OnnxYoloFaceAnnotator {
    session: ort::session::Session,
    confidence: f64,
    iou_threshold: f64,
    input_size: u32,
}

impl OnnxYoloFaceAnnotator {
    pub fn new(
        model_path: &Path,
        confidence: f64,
        iou_threshold: f64,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let session = onnx_session::load_session(model_path)?;
        let input_size = onnx_session::input_size(&session).unwrap_or(DEFAULT_INPUT_SIZE);
        Ok(Self {
            session,
            confidence,
            iou_threshold,
            input_size,
        })
    }
}

impl Annotator for OnnxYoloFaceAnnotator {
    fn annotate(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let (input_tensor, placement) = yolo_decoder::letterbox(frame, self.input_size);

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("YOLO face model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;

        postprocess(
            data,
            tensor.shape(),
            placement,
            self.confidence,
            self.iou_threshold,
        )
    }
}

/// Raw network output to face boxes in source coordinates. Columns past the
/// face score (pose keypoints) are ignored.
pub(crate) fn postprocess(
    data: &[f32],
    shape: &[usize],
    placement: Letterbox,
    confidence: f64,
    iou_threshold: f64,
) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
    let candidates =
        yolo_decoder::decode(data, shape, ScoreLayout::SingleClass, placement, confidence)?;
    let faces = candidates.into_iter().map(|c| c.detection).collect();
    Ok(nms(faces, iou_threshold))
}
