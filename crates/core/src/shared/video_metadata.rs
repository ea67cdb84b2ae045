use std::path::PathBuf;

use crate::shared::constants::DEFAULT_FPS;

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Frame rate to encode with: the reported rate, or `fallback` when the
    /// source reports zero or something non-finite.
    pub fn effective_fps(&self, fallback: f64) -> f64 {
        if self.fps.is_finite() && self.fps > 0.0 {
            self.fps
        } else if fallback.is_finite() && fallback > 0.0 {
            fallback
        } else {
            DEFAULT_FPS
        }
    }
}
