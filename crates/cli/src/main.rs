use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::process;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use framemark_core::pipeline::annotate_media_use_case::AnnotateMediaUseCase;
use framemark_core::pipeline::infrastructure::annotator_factory::{
    create_annotator, create_painter, AnnotatorInputs, AnnotatorKind,
};
use framemark_core::pipeline::pipeline_config::{DetectionConfig, PipelineConfig};
use framemark_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use framemark_core::shared::constants::{
    CASCADE_MODEL_NAME, CASCADE_MODEL_URL, EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL,
    FACE_CONFIDENCE_THRESHOLD, FACE_IOU_THRESHOLD, MATCH_TOLERANCE, OBJECT_CONFIDENCE_THRESHOLD,
    OBJECT_IOU_THRESHOLD, YOLO_FACE_MODEL_NAME, YOLO_FACE_MODEL_URL,
};
use framemark_core::shared::error::AnnotateError;
use framemark_core::shared::model_resolver::{self, ModelSpec, ProgressFn};

/// Draw face and object detections onto images and videos.
#[derive(Parser)]
#[command(name = "framemark", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct MediaArgs {
    /// Input image (.jpg, .jpeg, .png), video file, or V4L2 camera such as /dev/video0.
    #[arg(long)]
    source: PathBuf,

    /// Where the annotated result is written. Videos are always encoded as mp4.
    #[arg(long)]
    output: PathBuf,

    /// Stop a video or camera run after this many frames. Ctrl-C also stops
    /// a run; either way the mp4 is finished and playable.
    #[arg(long)]
    max_frames: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Detect faces with the classical cascade detector.
    Cascade {
        #[command(flatten)]
        media: MediaArgs,

        /// Cascade model file (downloaded on first use if omitted).
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Detect faces with a YOLO face network.
    Face {
        #[command(flatten)]
        media: MediaArgs,

        /// ONNX face model (downloaded on first use if omitted).
        #[arg(long)]
        model: Option<PathBuf>,

        /// Minimum detection confidence (0.0-1.0).
        #[arg(long, default_value_t = FACE_CONFIDENCE_THRESHOLD)]
        confidence: f64,

        /// IoU above which overlapping boxes are suppressed (0.0-1.0).
        #[arg(long, default_value_t = FACE_IOU_THRESHOLD)]
        iou: f64,
    },

    /// Detect and label objects with a YOLO network.
    Object {
        #[command(flatten)]
        media: MediaArgs,

        /// ONNX object model.
        #[arg(long)]
        model: PathBuf,

        /// Minimum detection confidence (0.0-1.0).
        #[arg(long, default_value_t = OBJECT_CONFIDENCE_THRESHOLD)]
        confidence: f64,

        /// IoU above which overlapping boxes of one class are suppressed (0.0-1.0).
        #[arg(long, default_value_t = OBJECT_IOU_THRESHOLD)]
        iou: f64,
    },

    /// Name faces by matching them against a directory of known people.
    Recognize {
        #[command(flatten)]
        media: MediaArgs,

        /// Directory of reference images; each file stem is an identity.
        #[arg(long = "known_dir", alias = "known-dir")]
        known_dir: PathBuf,

        /// ONNX face model (downloaded on first use if omitted).
        #[arg(long)]
        model: Option<PathBuf>,

        /// ONNX ArcFace embedding model (downloaded on first use if omitted).
        #[arg(long)]
        embedder: Option<PathBuf>,

        /// Maximum cosine distance for a match (0.0-2.0].
        #[arg(long, default_value_t = MATCH_TOLERANCE)]
        tolerance: f64,
    },
}

impl Command {
    fn kind(&self) -> AnnotatorKind {
        match self {
            Command::Cascade { .. } => AnnotatorKind::Cascade,
            Command::Face { .. } => AnnotatorKind::Face,
            Command::Object { .. } => AnnotatorKind::Object,
            Command::Recognize { .. } => AnnotatorKind::Recognize,
        }
    }

    fn media(&self) -> &MediaArgs {
        match self {
            Command::Cascade { media, .. }
            | Command::Face { media, .. }
            | Command::Object { media, .. }
            | Command::Recognize { media, .. } => media,
        }
    }

    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_frames: self.media().max_frames,
            ..PipelineConfig::new(self.detection_config())
        }
    }

    fn detection_config(&self) -> DetectionConfig {
        match self {
            Command::Cascade { .. } => DetectionConfig::face(),
            Command::Face {
                confidence, iou, ..
            } => DetectionConfig {
                confidence_threshold: *confidence,
                iou_threshold: *iou,
                ..DetectionConfig::face()
            },
            Command::Object {
                confidence, iou, ..
            } => DetectionConfig {
                confidence_threshold: *confidence,
                iou_threshold: *iou,
                ..DetectionConfig::object()
            },
            Command::Recognize { tolerance, .. } => DetectionConfig {
                match_tolerance: *tolerance,
                ..DetectionConfig::face()
            },
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    validate(&cli.command)?;

    let kind = cli.command.kind();
    let config = cli.command.pipeline_config();
    let inputs = resolve_inputs(&cli.command)?;

    let annotator = create_annotator(kind, &inputs, &config)?;
    let painter = create_painter(kind)?;

    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);
    ctrlc::set_handler(move || {
        log::info!("Interrupt received, finishing output");
        flag.store(true, Ordering::Relaxed);
    })?;

    let logger = StdoutPipelineLogger::new(config.progress_every);
    let media = cli.command.media();
    let report = AnnotateMediaUseCase::new(annotator, Box::new(painter), config, Box::new(logger))
        .with_cancel_flag(cancelled)
        .execute(&media.source, &media.output)?;

    if report.frames_failed > 0 {
        log::warn!("{} frame(s) were written unannotated", report.frames_failed);
    }
    println!("{}", report.success_message());
    Ok(())
}

fn validate(command: &Command) -> Result<(), Box<dyn std::error::Error>> {
    let media = command.media();
    if !media.source.exists() {
        return Err(AnnotateError::SourceNotFound {
            path: media.source.clone(),
        }
        .into());
    }
    command.detection_config().validate()?;
    Ok(())
}

fn resolve_inputs(command: &Command) -> Result<AnnotatorInputs, AnnotateError> {
    match command {
        Command::Cascade { model, .. } => Ok(AnnotatorInputs {
            model: resolve_model(model.as_deref(), CASCADE_MODEL_NAME, CASCADE_MODEL_URL)?,
            ..AnnotatorInputs::default()
        }),
        Command::Face { model, .. } => Ok(AnnotatorInputs {
            model: resolve_model(model.as_deref(), YOLO_FACE_MODEL_NAME, YOLO_FACE_MODEL_URL)?,
            ..AnnotatorInputs::default()
        }),
        Command::Object { model, .. } => Ok(AnnotatorInputs {
            model: model.clone(),
            ..AnnotatorInputs::default()
        }),
        Command::Recognize {
            model,
            embedder,
            known_dir,
            ..
        } => Ok(AnnotatorInputs {
            model: resolve_model(model.as_deref(), YOLO_FACE_MODEL_NAME, YOLO_FACE_MODEL_URL)?,
            embedder: Some(resolve_model(
                embedder.as_deref(),
                EMBEDDING_MODEL_NAME,
                EMBEDDING_MODEL_URL,
            )?),
            known_dir: Some(known_dir.clone()),
        }),
    }
}

fn resolve_model(
    explicit: Option<&Path>,
    name: &'static str,
    url: &'static str,
) -> Result<PathBuf, AnnotateError> {
    log::info!("Resolving model: {name}");
    let downloading = Rc::new(Cell::new(false));
    let seen = Rc::clone(&downloading);
    let progress: ProgressFn = Box::new(move |done, total| {
        seen.set(true);
        download_progress(name, done, total);
    });

    let resolved =
        model_resolver::resolve_or_explicit(explicit, &ModelSpec { name, url }, Some(progress));
    if downloading.get() {
        eprintln!();
    }
    resolved.map_err(|e| {
        let path = explicit.map_or_else(|| PathBuf::from(name), Path::to_path_buf);
        AnnotateError::model_load(path, e)
    })
}

fn download_progress(name: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {name}... {pct}%");
    } else {
        eprint!("\rDownloading {name}... {downloaded} bytes");
    }
}
