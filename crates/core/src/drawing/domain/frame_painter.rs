use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

/// Domain interface for drawing detections onto a frame in place.
///
/// Painting cannot fail: geometry outside the frame is clipped.
pub trait FramePainter {
    fn paint(&self, frame: &mut Frame, detections: &[Detection]);
}
