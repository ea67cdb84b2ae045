pub mod annotator;
pub mod face_embedder;
pub mod gallery;
pub mod recognition_annotator;
