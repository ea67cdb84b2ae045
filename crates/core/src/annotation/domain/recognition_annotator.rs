use crate::annotation::domain::annotator::Annotator;
use crate::annotation::domain::face_embedder::FaceEmbedder;
use crate::annotation::domain::gallery::Gallery;
use crate::shared::constants::UNKNOWN_IDENTITY;
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

/// Labels every located face with the first gallery identity it matches.
///
/// Faces that match nobody are labelled `"Unknown"`. The output boxes carry
/// the identity only; the locator's confidence is dropped so the caption is
/// just the name.
pub struct RecognitionAnnotator {
    locator: Box<dyn Annotator>,
    embedder: Box<dyn FaceEmbedder>,
    gallery: Gallery,
    tolerance: f64,
}

impl RecognitionAnnotator {
    pub fn new(
        locator: Box<dyn Annotator>,
        embedder: Box<dyn FaceEmbedder>,
        gallery: Gallery,
        tolerance: f64,
    ) -> Self {
        Self {
            locator,
            embedder,
            gallery,
            tolerance,
        }
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    fn identify(&mut self, frame: &Frame, face: &Detection) -> Result<String, Box<dyn std::error::Error>> {
        let Some(crop) = frame.crop(face.x1, face.y1, face.x2, face.y2) else {
            return Ok(UNKNOWN_IDENTITY.to_string());
        };
        let query = self.embedder.embed(&crop)?;
        Ok(self
            .gallery
            .first_match(&query, self.tolerance)
            .map(|entry| entry.name.clone())
            .unwrap_or_else(|| UNKNOWN_IDENTITY.to_string()))
    }
}

impl Annotator for RecognitionAnnotator {
    fn annotate(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let faces = self.locator.annotate(frame)?;
        let mut labelled = Vec::with_capacity(faces.len());
        for face in faces {
            let name = self.identify(frame, &face)?;
            labelled.push(Detection::new(face.x1, face.y1, face.x2, face.y2).with_label(name));
        }
        Ok(labelled)
    }
}
