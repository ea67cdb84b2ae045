use std::path::Path;
use std::time::Instant;

use crate::annotation::domain::annotator::Annotator;
use crate::drawing::domain::frame_painter::FramePainter;
use crate::pipeline::annotate_frame::{annotate_and_paint, elapsed_ms};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::pipeline_report::{MediaKind, PipelineReport, PipelineState, StateTracker};
use crate::shared::error::AnnotateError;
use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;

/// Single-image pipeline: read → annotate → draw → write.
pub struct AnnotateImageUseCase {
    reader: Box<dyn VideoReader>,
    image_writer: Box<dyn ImageWriter>,
    annotator: Box<dyn Annotator>,
    painter: Box<dyn FramePainter>,
    logger: Box<dyn PipelineLogger>,
    states: StateTracker,
}

impl AnnotateImageUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        image_writer: Box<dyn ImageWriter>,
        annotator: Box<dyn Annotator>,
        painter: Box<dyn FramePainter>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            reader,
            image_writer,
            annotator,
            painter,
            logger,
            states: StateTracker::new(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.states.current()
    }

    /// Reads one image, annotates it and writes exactly one image to
    /// `output_path` in the format its extension implies.
    pub fn execute(
        &mut self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<PipelineReport, AnnotateError> {
        let decoded = self.decode(input_path);
        self.reader.close();

        let result = decoded.and_then(|frame| self.annotate_and_write(frame, output_path));
        match &result {
            Ok(_) => {
                self.states.advance(PipelineState::Draining);
                self.states.advance(PipelineState::Done);
                self.logger.summary();
            }
            Err(_) => self.states.advance(PipelineState::Failed),
        }
        result
    }

    fn decode(&mut self, input_path: &Path) -> Result<Frame, AnnotateError> {
        let t = Instant::now();
        self.reader
            .open(input_path)
            .map_err(|e| AnnotateError::source_unreadable(input_path, e))?;
        let frame = self
            .reader
            .frames()
            .next()
            .ok_or_else(|| AnnotateError::source_unreadable(input_path, "image has no frames"))?
            .map_err(|e| AnnotateError::source_unreadable(input_path, e))?;
        self.logger.timing("decode", elapsed_ms(t));
        Ok(frame)
    }

    fn annotate_and_write(
        &mut self,
        mut frame: Frame,
        output_path: &Path,
    ) -> Result<PipelineReport, AnnotateError> {
        self.states.advance(PipelineState::Streaming);
        let mut report = PipelineReport::new(output_path, MediaKind::Image);

        let outcome = annotate_and_paint(
            self.annotator.as_mut(),
            self.painter.as_ref(),
            &mut frame,
            self.logger.as_mut(),
        );
        report.record(outcome);

        let t = Instant::now();
        self.image_writer
            .write(output_path, &frame)
            .map_err(|e| AnnotateError::sink_write(output_path, e))?;
        self.logger.timing("encode", elapsed_ms(t));
        self.logger.progress(1, 1);
        report.frames_written = 1;
        Ok(report)
    }
}
