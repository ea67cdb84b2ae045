pub mod cascade_face_annotator;
pub mod class_names;
pub mod gallery_loader;
pub mod math;
pub mod onnx_arcface_embedder;
pub mod onnx_session;
pub mod onnx_yolo_face_annotator;
pub mod onnx_yolo_object_annotator;
pub mod yolo_decoder;
