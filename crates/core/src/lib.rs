//! Annotates still images and videos with the output of a vision model.
//!
//! A run reads a source, asks an [`annotation::domain::annotator::Annotator`]
//! for boxes on every frame, draws them with a
//! [`drawing::domain::frame_painter::FramePainter`] and writes the result.

pub mod annotation;
pub mod drawing;
pub mod pipeline;
pub mod shared;
pub mod video;
