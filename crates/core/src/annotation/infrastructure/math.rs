//! Post-processing shared by the network annotators.
//!
//! Greedy IoU suppression over [`Detection`]s.

use crate::shared::detection::Detection;

/// IoU between two bounding boxes represented as `[x1, y1, x2, y2]`.
pub fn bbox_iou(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }

    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    inter / (area_a + area_b - inter)
}

/// Greedy NMS: sort by confidence descending, then suppress any later box of
/// the same label whose IoU with a kept box exceeds `iou_thresh`.
pub fn nms(mut dets: Vec<Detection>, iou_thresh: f64) -> Vec<Detection> {
    dets.sort_by(|a, b| {
        b.confidence
            .unwrap_or(0.0)
            .partial_cmp(&a.confidence.unwrap_or(0.0))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<Detection> = Vec::with_capacity(dets.len());
    for det in dets {
        let suppressed = keep
            .iter()
            .any(|k| k.label == det.label && bbox_iou(&k.bbox(), &det.bbox()) > iou_thresh);
        if !suppressed {
            keep.push(det);
        }
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn scored(x1: f64, y1: f64, x2: f64, y2: f64, conf: f64) -> Detection {
        Detection::new(x1, y1, x2, y2).with_confidence(conf)
    }

    #[test]
    fn test_bbox_iou_no_overlap() {
        let a = [0.0, 0.0, 10.0, 10.0];
        let b = [20.0, 20.0, 30.0, 30.0];
        assert_eq!(bbox_iou(&a, &b), 0.0);
    }

    #[test]
    fn test_bbox_iou_partial_overlap() {
        let a = [0.0, 0.0, 10.0, 10.0];
        let b = [5.0, 5.0, 15.0, 15.0];
        assert_relative_eq!(bbox_iou(&a, &b), 25.0 / 175.0);
    }

    #[rstest]
    #[case::zero_width([0.0, 0.0, 0.0, 100.0], [0.0, 0.0, 50.0, 50.0])]
    #[case::inverted([50.0, 50.0, 0.0, 0.0], [0.0, 0.0, 50.0, 50.0])]
    #[case::touching_edges([0.0, 0.0, 50.0, 50.0], [50.0, 0.0, 100.0, 50.0])]
    fn test_bbox_iou_degenerate(#[case] a: [f64; 4], #[case] b: [f64; 4]) {
        assert_relative_eq!(bbox_iou(&a, &b), 0.0);
    }

    #[test]
    fn test_bbox_iou_identical() {
        let a = [10.0, 10.0, 110.0, 110.0];
        assert_relative_eq!(bbox_iou(&a, &a), 1.0);
    }

    #[test]
    fn test_nms_suppresses_overlapping() {
        let dets = vec![
            scored(0.0, 0.0, 100.0, 100.0, 0.9),
            scored(5.0, 5.0, 105.0, 105.0, 0.8),
        ];
        let kept = nms(dets, 0.3);
        assert_eq!(kept.len(), 1);
        assert_relative_eq!(kept[0].confidence.unwrap(), 0.9);
    }

    #[test]
    fn test_nms_keeps_non_overlapping() {
        let dets = vec![
            scored(0.0, 0.0, 50.0, 50.0, 0.9),
            scored(200.0, 200.0, 250.0, 250.0, 0.8),
        ];
        assert_eq!(nms(dets, 0.3).len(), 2);
    }

    #[test]
    fn test_nms_higher_confidence_wins() {
        let dets = vec![
            scored(0.0, 0.0, 100.0, 100.0, 0.5),
            scored(2.0, 2.0, 102.0, 102.0, 0.9),
        ];
        let kept = nms(dets, 0.3);
        assert_eq!(kept.len(), 1);
        assert_relative_eq!(kept[0].confidence.unwrap(), 0.9);
        assert_relative_eq!(kept[0].x1, 2.0);
    }

    #[test]
    fn test_nms_is_per_label() {
        let dets = vec![
            scored(0.0, 0.0, 100.0, 100.0, 0.9).with_label("person"),
            scored(1.0, 1.0, 101.0, 101.0, 0.8).with_label("dog"),
            scored(2.0, 2.0, 102.0, 102.0, 0.7).with_label("person"),
        ];
        let kept = nms(dets, 0.5);
        let labels: Vec<_> = kept.iter().map(|d| d.label.as_deref().unwrap()).collect();
        assert_eq!(labels, vec!["person", "dog"]);
    }

    #[test]
    fn test_nms_threshold_is_strict() {
        // IoU of exactly 1/3 is not above a 1/3 threshold
        let dets = vec![
            scored(0.0, 0.0, 100.0, 100.0, 0.9),
            scored(50.0, 0.0, 150.0, 100.0, 0.8),
        ];
        assert_eq!(nms(dets.clone(), 1.0 / 3.0).len(), 2);
        assert_eq!(nms(dets, 0.3).len(), 1);
    }

    #[test]
    fn test_nms_empty_input() {
        assert!(nms(Vec::new(), 0.3).is_empty());
    }
}
