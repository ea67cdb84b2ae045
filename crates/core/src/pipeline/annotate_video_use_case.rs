use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::annotation::domain::annotator::Annotator;
use crate::drawing::domain::frame_painter::FramePainter;
use crate::pipeline::annotate_frame::{annotate_and_paint, elapsed_ms};
use crate::pipeline::pipeline_config::PipelineConfig;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::pipeline_report::{MediaKind, PipelineReport, PipelineState, StateTracker};
use crate::shared::error::AnnotateError;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

/// Frame-by-frame video pipeline: decode → annotate → draw → encode.
///
/// Strictly sequential: each frame is written before the next is decoded.
/// The writer is opened on the first decoded frame, so an empty source
/// produces no output file. On every exit path the writer is closed first,
/// then the reader.
///
/// Unbounded sources such as cameras end when `max_frames` is reached or the
/// cancel flag is raised; both finish the output like a normal end of stream.
pub struct AnnotateVideoUseCase {
    reader: Box<dyn VideoReader>,
    writer: Box<dyn VideoWriter>,
    annotator: Box<dyn Annotator>,
    painter: Box<dyn FramePainter>,
    config: PipelineConfig,
    logger: Box<dyn PipelineLogger>,
    cancelled: Arc<AtomicBool>,
    states: StateTracker,
}

impl AnnotateVideoUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        annotator: Box<dyn Annotator>,
        painter: Box<dyn FramePainter>,
        config: PipelineConfig,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            reader,
            writer,
            annotator,
            painter,
            config,
            logger,
            cancelled: Arc::new(AtomicBool::new(false)),
            states: StateTracker::new(),
        }
    }

    /// Stop before the next frame once `cancelled` is set.
    pub fn with_cancel_flag(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.states.current()
    }

    pub fn execute(
        &mut self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<PipelineReport, AnnotateError> {
        let streamed = self.stream(input_path, output_path);

        self.states.advance(PipelineState::Draining);
        let closed = self.writer.close();
        self.reader.close();

        match (streamed, closed) {
            (Ok(report), Ok(())) => {
                self.states.advance(PipelineState::Done);
                self.logger.summary();
                Ok(report)
            }
            (Ok(_), Err(e)) => {
                self.states.advance(PipelineState::Failed);
                Err(AnnotateError::sink_write(output_path, e))
            }
            (Err(e), close_result) => {
                if let Err(close_err) = close_result {
                    log::debug!("Ignoring writer close error after failure: {close_err}");
                }
                self.states.advance(PipelineState::Failed);
                Err(e)
            }
        }
    }

    fn stream(
        &mut self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<PipelineReport, AnnotateError> {
        let metadata = self
            .reader
            .open(input_path)
            .map_err(|e| AnnotateError::source_unreadable(input_path, e))?;
        let fps = metadata.effective_fps(self.config.fallback_fps);
        let total = metadata.total_frames;
        log::info!(
            "{}: {}x{} @ {fps:.2} fps, {} frames ({})",
            input_path.display(),
            metadata.width,
            metadata.height,
            total,
            metadata.codec
        );

        self.states.advance(PipelineState::Streaming);
        let mut report = PipelineReport::new(output_path, MediaKind::Video);
        let mut writer_open = false;
        let mut frames = self.reader.frames();

        loop {
            if self.cancelled.load(Ordering::Relaxed) {
                log::info!("Cancelled after {} frames", report.frames_written);
                break;
            }
            if self
                .config
                .max_frames
                .is_some_and(|max| report.frames_written >= max)
            {
                log::info!("Reached the {} frame limit", report.frames_written);
                break;
            }

            let t = Instant::now();
            let Some(next) = frames.next() else {
                break;
            };
            let mut frame = next.map_err(|e| AnnotateError::source_unreadable(input_path, e))?;
            self.logger.timing("decode", elapsed_ms(t));

            if !writer_open {
                let out_meta = VideoMetadata {
                    width: frame.width(),
                    height: frame.height(),
                    fps,
                    ..metadata.clone()
                };
                self.writer
                    .open(output_path, &out_meta)
                    .map_err(|e| AnnotateError::sink_write(output_path, e))?;
                writer_open = true;
            }

            let outcome = annotate_and_paint(
                self.annotator.as_mut(),
                self.painter.as_ref(),
                &mut frame,
                self.logger.as_mut(),
            );
            report.record(outcome);

            let t = Instant::now();
            self.writer
                .write(&frame)
                .map_err(|e| AnnotateError::sink_write(output_path, e))?;
            self.logger.timing("encode", elapsed_ms(t));

            report.frames_written += 1;
            self.logger.progress(report.frames_written, total);
        }

        if report.frames_written == 0 {
            log::warn!(
                "{} yielded no frames; no video was written",
                input_path.display()
            );
        }
        Ok(report)
    }
}
