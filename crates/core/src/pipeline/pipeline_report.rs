use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// What a finished run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineReport {
    pub output_path: PathBuf,
    pub media: MediaKind,
    pub frames_written: usize,
    pub detections_drawn: usize,
    /// Frames written without annotations because the annotator failed.
    pub frames_failed: usize,
}

impl PipelineReport {
    pub fn new(output_path: &Path, media: MediaKind) -> Self {
        Self {
            output_path: output_path.to_path_buf(),
            media,
            frames_written: 0,
            detections_drawn: 0,
            frames_failed: 0,
        }
    }

    /// The line printed on success.
    pub fn success_message(&self) -> String {
        format!(
            "Annotated {} saved to {}",
            self.media,
            self.output_path.display()
        )
    }
}

/// Driver lifecycle. `Failed` is reachable from every other state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Initializing,
    Streaming,
    Draining,
    Done,
    Failed,
}

/// Tracks the current [`PipelineState`] and logs every transition.
#[derive(Debug)]
pub(crate) struct StateTracker {
    state: PipelineState,
}

impl StateTracker {
    pub(crate) fn new() -> Self {
        log::debug!("Pipeline state: {:?}", PipelineState::Initializing);
        Self {
            state: PipelineState::Initializing,
        }
    }

    pub(crate) fn advance(&mut self, next: PipelineState) {
        if next != self.state {
            log::debug!("Pipeline state: {:?} -> {next:?}", self.state);
            self.state = next;
        }
    }

    pub(crate) fn current(&self) -> PipelineState {
        self.state
    }
}
