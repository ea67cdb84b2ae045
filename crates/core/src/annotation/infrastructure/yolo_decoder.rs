//! YOLO letterbox preprocessing and raw output decoding.
//!
//! Supports both export layouts: `[1, features, anchors]` (the default
//! ultralytics export) and `[1, anchors, features]`. Each row starts with
//! `cx, cy, w, h` in letterboxed input pixels. Single-class face models put
//! the score at index 4 (keypoints may follow and are ignored); multi-class
//! models carry one score per class from index 4 on.

use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

/// Placement of the source frame inside the square network input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Letterbox {
    pub scale: f64,
    pub pad_x: u32,
    pub pad_y: u32,
}

impl Letterbox {
    /// Map a point from network input coordinates back to the source frame.
    fn unmap(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.pad_x as f64) / self.scale,
            (y - self.pad_y as f64) / self.scale,
        )
    }
}

/// How a row's scores are laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreLayout {
    /// One score at index 4; anything after it is ignored.
    SingleClass,
    /// `num_classes` scores from index 4; the best one picks the class.
    MultiClass { num_classes: usize },
}

/// A decoded candidate before thresholding and NMS.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub detection: Detection,
    pub class_id: usize,
}

/// Letterbox-resize a frame to `target_size` × `target_size`.
///
/// Returns the NCHW float32 tensor (pad value 114/255) and the placement.
pub fn letterbox(frame: &Frame, target_size: u32) -> (ndarray::Array4<f32>, Letterbox) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).min(target_size);
    let new_h = ((fh * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let gray = 114.0f32 / 255.0;
    let mut tensor =
        ndarray::Array4::<f32>::from_elem((1, 3, target_size as usize, target_size as usize), gray);

    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    // Nearest-neighbour resize into the padded region
    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    (tensor, Letterbox { scale, pad_x, pad_y })
}

/// Decode a raw `[1, a, b]` YOLO output into candidates in frame coordinates.
///
/// Candidates scoring below `min_confidence` are dropped here so the NMS
/// input stays small.
pub fn decode(
    data: &[f32],
    shape: &[usize],
    layout: ScoreLayout,
    placement: Letterbox,
    min_confidence: f64,
) -> Result<Vec<Candidate>, Box<dyn std::error::Error>> {
    if shape.len() != 3 {
        return Err(format!("Unexpected YOLO output shape: {shape:?}").into());
    }
    let transposed = shape[1] < shape[2];
    let (num_rows, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if data.len() < num_rows * num_feats {
        return Err(format!(
            "YOLO output has {} values, shape {shape:?} needs {}",
            data.len(),
            num_rows * num_feats
        )
        .into());
    }

    let min_feats = match layout {
        ScoreLayout::SingleClass => 5,
        ScoreLayout::MultiClass { num_classes } => 4 + num_classes.max(1),
    };
    if num_feats < min_feats {
        return Err(format!("YOLO rows have {num_feats} values, need at least {min_feats}").into());
    }

    let value = |row: usize, feat: usize| -> f64 {
        if transposed {
            data[feat * num_rows + row] as f64
        } else {
            data[row * num_feats + feat] as f64
        }
    };

    let mut candidates = Vec::new();
    for i in 0..num_rows {
        let (class_id, conf) = match layout {
            ScoreLayout::SingleClass => (0, value(i, 4)),
            ScoreLayout::MultiClass { num_classes } => (0..num_classes)
                .map(|c| (c, value(i, 4 + c)))
                .fold((0, f64::NEG_INFINITY), |best, cur| {
                    if cur.1 > best.1 {
                        cur
                    } else {
                        best
                    }
                }),
        };
        if !(conf >= min_confidence) {
            continue;
        }

        let cx = value(i, 0);
        let cy = value(i, 1);
        let w = value(i, 2);
        let h = value(i, 3);
        let (x1, y1) = placement.unmap(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = placement.unmap(cx + w / 2.0, cy + h / 2.0);

        candidates.push(Candidate {
            detection: Detection::new(x1, y1, x2, y2).with_confidence(conf),
            class_id,
        });
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const IDENTITY: Letterbox = Letterbox {
        scale: 1.0,
        pad_x: 0,
        pad_y: 0,
    };

    #[test]
    fn test_letterbox_preserves_aspect_ratio() {
        // scale = min(640/200, 640/100) = 3.2 → 640x320, pad_y = 160
        let frame = Frame::new(vec![128u8; 200 * 100 * 3], 200, 100, 3, 0);
        let (tensor, placement) = letterbox(&frame, 640);

        assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
        assert_relative_eq!(placement.scale, 3.2, epsilon = 1e-9);
        assert_eq!(placement.pad_x, 0);
        assert_eq!(placement.pad_y, 160);
    }

    #[test]
    fn test_letterbox_values_and_padding() {
        let frame = Frame::new(vec![255u8; 100 * 50 * 3], 100, 50, 3, 0);
        let (tensor, placement) = letterbox(&frame, 640);

        let y = placement.pad_y as usize + 1;
        assert!((tensor[[0, 0, y, 1]] - 1.0).abs() < 0.01);
        assert!((tensor[[0, 0, 0, 0]] - 114.0 / 255.0).abs() < 0.01);
    }

    /// Pads `rows` with zero-score anchors until anchors outnumber features,
    /// which is how real exports look, and returns `(data, shape)` in either
    /// layout.
    fn output(rows: &[&[f32]], transposed: bool) -> (Vec<f32>, Vec<usize>) {
        let feats = rows[0].len();
        let mut rows: Vec<Vec<f32>> = rows.iter().map(|r| r.to_vec()).collect();
        while rows.len() <= feats {
            rows.push(vec![0.0; feats]);
        }
        let n = rows.len();
        if transposed {
            let data = (0..feats)
                .flat_map(|f| rows.iter().map(move |r| r[f]).collect::<Vec<_>>())
                .collect();
            (data, vec![1, feats, n])
        } else {
            (rows.concat(), vec![1, n, feats])
        }
    }

    #[test]
    fn test_decode_row_major_layout() {
        let (data, shape) = output(
            &[
                &[50.0, 50.0, 20.0, 10.0, 0.9],
                &[10.0, 10.0, 4.0, 4.0, 0.2],
                &[80.0, 80.0, 10.0, 10.0, 0.6],
            ],
            false,
        );
        let out = decode(&data, &shape, ScoreLayout::SingleClass, IDENTITY, 0.5).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].detection.bbox(), [40.0, 45.0, 60.0, 55.0]);
        assert_relative_eq!(out[0].detection.confidence.unwrap(), 0.9, epsilon = 1e-6);
        assert_eq!(out[0].class_id, 0);
    }

    #[test]
    fn test_decode_transposed_layout() {
        let (data, shape) = output(
            &[&[50.0, 50.0, 20.0, 10.0, 0.9], &[10.0, 10.0, 4.0, 4.0, 0.2]],
            true,
        );
        assert!(shape[1] < shape[2]);
        let out = decode(&data, &shape, ScoreLayout::SingleClass, IDENTITY, 0.5).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].detection.bbox(), [40.0, 45.0, 60.0, 55.0]);
    }

    #[test]
    fn test_decode_ignores_trailing_keypoints_for_faces() {
        let row: [f32; 20] = [
            50.0, 50.0, 20.0, 10.0, 0.9, 1.0, 1.0, 0.9, 2.0, 2.0, 0.9, 3.0, 3.0, 0.9, 4.0, 4.0,
            0.9, 5.0, 5.0, 0.9,
        ];
        let (data, shape) = output(&[&row], true);
        let out = decode(&data, &shape, ScoreLayout::SingleClass, IDENTITY, 0.5).unwrap();
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0].detection.confidence.unwrap(), 0.9, epsilon = 1e-6);
    }

    #[test]
    fn test_decode_multi_class_picks_best_class() {
        let (data, shape) = output(
            &[
                &[50.0, 50.0, 10.0, 10.0, 0.1, 0.8, 0.3],
                &[20.0, 20.0, 10.0, 10.0, 0.05, 0.1, 0.2],
            ],
            true,
        );
        let out = decode(
            &data,
            &shape,
            ScoreLayout::MultiClass { num_classes: 3 },
            IDENTITY,
            0.25,
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].class_id, 1);
        assert_relative_eq!(out[0].detection.confidence.unwrap(), 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_decode_maps_back_through_letterbox() {
        let placement = Letterbox {
            scale: 2.0,
            pad_x: 0,
            pad_y: 100,
        };
        let (data, shape) = output(&[&[100.0, 200.0, 40.0, 20.0, 0.9]], false);
        let out = decode(&data, &shape, ScoreLayout::SingleClass, placement, 0.5).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].detection.bbox(), [40.0, 45.0, 60.0, 55.0]);
    }

    #[test]
    fn test_decode_rejects_bad_shapes() {
        assert!(decode(&[0.0; 4], &[1, 4], ScoreLayout::SingleClass, IDENTITY, 0.5).is_err());
        // four features per row is too few for a score
        assert!(decode(&[0.0; 40], &[1, 4, 10], ScoreLayout::SingleClass, IDENTITY, 0.5).is_err());
        // data shorter than the shape claims
        assert!(decode(&[0.0; 3], &[1, 5, 10], ScoreLayout::SingleClass, IDENTITY, 0.5).is_err());
        assert!(decode(
            &[0.0; 60],
            &[1, 6, 10],
            ScoreLayout::MultiClass { num_classes: 3 },
            IDENTITY,
            0.5
        )
        .is_err());
    }

    #[test]
    fn test_decode_no_candidates_above_threshold() {
        let (data, shape) = output(&[&[50.0, 50.0, 20.0, 10.0, 0.3]], true);
        let out = decode(&data, &shape, ScoreLayout::SingleClass, IDENTITY, 0.5).unwrap();
        assert!(out.is_empty());
    }
}
