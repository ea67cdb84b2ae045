use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

/// Domain interface for anything that turns a frame into boxes.
///
/// Implementations may keep model state between calls, hence `&mut self`.
/// The returned list is finite and belongs to this frame only.
pub trait Annotator {
    fn annotate(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>>;
}
