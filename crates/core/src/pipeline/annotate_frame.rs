use std::time::Instant;

use crate::annotation::domain::annotator::Annotator;
use crate::drawing::domain::frame_painter::FramePainter;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::frame::Frame;

/// Result of annotating and painting one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FrameOutcome {
    Painted { detections: usize },
    /// The annotator failed; the frame is left as decoded.
    Unannotated,
}

pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Annotate `frame` and draw the result onto it.
///
/// An annotator error is logged and downgraded so the frame can still be
/// written.
pub(crate) fn annotate_and_paint(
    annotator: &mut dyn Annotator,
    painter: &dyn FramePainter,
    frame: &mut Frame,
    logger: &mut dyn PipelineLogger,
) -> FrameOutcome {
    let t = Instant::now();
    let result = annotator.annotate(frame);
    logger.timing("annotate", elapsed_ms(t));

    match result {
        Ok(detections) => {
            let t = Instant::now();
            painter.paint(frame, &detections);
            logger.timing("draw", elapsed_ms(t));
            logger.metric("detections", detections.len() as f64);
            FrameOutcome::Painted {
                detections: detections.len(),
            }
        }
        Err(e) => {
            log::warn!(
                "Frame {}: annotation failed, writing it unannotated: {e}",
                frame.index()
            );
            FrameOutcome::Unannotated
        }
    }
}

impl crate::pipeline::pipeline_report::PipelineReport {
    pub(crate) fn record(&mut self, outcome: FrameOutcome) {
        match outcome {
            FrameOutcome::Painted { detections } => self.detections_drawn += detections,
            FrameOutcome::Unannotated => self.frames_failed += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::pipeline::pipeline_report::{MediaKind, PipelineReport};
    use crate::shared::detection::Detection;
    use std::cell::Cell;
    use std::path::Path;

    struct FixedAnnotator(Result<usize, ()>);

    impl Annotator for FixedAnnotator {
        fn annotate(&mut self, _frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
            match self.0 {
                Ok(n) => Ok(vec![Detection::new(0.0, 0.0, 2.0, 2.0); n]),
                Err(()) => Err("model exploded".into()),
            }
        }
    }

    struct CountingPainter {
        calls: Cell<usize>,
    }

    impl FramePainter for CountingPainter {
        fn paint(&self, _frame: &mut Frame, _detections: &[Detection]) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    fn frame() -> Frame {
        Frame::new(vec![0; 12], 2, 2, 3, 7)
    }

    #[test]
    fn test_successful_annotation_is_painted() {
        let painter = CountingPainter { calls: Cell::new(0) };
        let outcome = annotate_and_paint(
            &mut FixedAnnotator(Ok(2)),
            &painter,
            &mut frame(),
            &mut NullPipelineLogger,
        );
        assert_eq!(outcome, FrameOutcome::Painted { detections: 2 });
        assert_eq!(painter.calls.get(), 1);
    }

    #[test]
    fn test_failed_annotation_skips_painting() {
        let painter = CountingPainter { calls: Cell::new(0) };
        let outcome = annotate_and_paint(
            &mut FixedAnnotator(Err(())),
            &painter,
            &mut frame(),
            &mut NullPipelineLogger,
        );
        assert_eq!(outcome, FrameOutcome::Unannotated);
        assert_eq!(painter.calls.get(), 0);
    }

    #[test]
    fn test_report_records_outcomes() {
        let mut report = PipelineReport::new(Path::new("out.mp4"), MediaKind::Video);
        report.record(FrameOutcome::Painted { detections: 3 });
        report.record(FrameOutcome::Unannotated);
        report.record(FrameOutcome::Painted { detections: 1 });
        assert_eq!(report.detections_drawn, 4);
        assert_eq!(report.frames_failed, 1);
    }
}
