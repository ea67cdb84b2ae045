use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::annotation::domain::annotator::Annotator;
use crate::drawing::domain::frame_painter::FramePainter;
use crate::pipeline::annotate_image_use_case::AnnotateImageUseCase;
use crate::pipeline::annotate_video_use_case::AnnotateVideoUseCase;
use crate::pipeline::pipeline_config::PipelineConfig;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::pipeline_report::PipelineReport;
use crate::shared::constants::is_image_path;
use crate::shared::error::AnnotateError;
use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;
use crate::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use crate::video::infrastructure::image_file_reader::ImageFileReader;
use crate::video::infrastructure::image_file_writer::ImageFileWriter;

/// Entry point for one annotation run.
///
/// Picks the image or video pipeline from the **source** extension and wires
/// it to the file-backed readers and writers. The output extension plays no
/// part in that choice.
pub struct AnnotateMediaUseCase {
    annotator: Box<dyn Annotator>,
    painter: Box<dyn FramePainter>,
    config: PipelineConfig,
    logger: Box<dyn PipelineLogger>,
    cancelled: Arc<AtomicBool>,
}

impl AnnotateMediaUseCase {
    pub fn new(
        annotator: Box<dyn Annotator>,
        painter: Box<dyn FramePainter>,
        config: PipelineConfig,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            annotator,
            painter,
            config,
            logger,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shares a flag that stops a video run before its next frame.
    pub fn with_cancel_flag(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// Runs the pipeline once. Consumes the use case so the annotator is
    /// dropped after the source and sink have been released.
    pub fn execute(self, source: &Path, output: &Path) -> Result<PipelineReport, AnnotateError> {
        if !source.exists() {
            return Err(AnnotateError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }

        if is_image_path(source) {
            log::debug!("{} is an image source", source.display());
            AnnotateImageUseCase::new(
                Box::new(ImageFileReader::new()),
                Box::new(ImageFileWriter::new()),
                self.annotator,
                self.painter,
                self.logger,
            )
            .execute(source, output)
        } else {
            log::debug!("{} is a video source", source.display());
            AnnotateVideoUseCase::new(
                Box::new(FfmpegReader::new()),
                Box::new(FfmpegWriter::new()),
                self.annotator,
                self.painter,
                self.config,
                self.logger,
            )
            .with_cancel_flag(self.cancelled)
            .execute(source, output)
        }
    }
}
