use crate::shared::frame::Frame;

/// Domain interface for turning a face crop into an identity embedding.
///
/// Returned vectors are L2-normalized so that a dot product is a cosine
/// similarity.
pub trait FaceEmbedder {
    fn embed(&mut self, face: &Frame) -> Result<Vec<f32>, Box<dyn std::error::Error>>;
}
