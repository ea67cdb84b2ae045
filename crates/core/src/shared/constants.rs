pub const YOLO_FACE_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_FACE_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const EMBEDDING_MODEL_NAME: &str = "w600k_r50.onnx";
pub const EMBEDDING_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/w600k_r50.onnx";

pub const CASCADE_MODEL_NAME: &str = "seeta_fd_frontal_v1.0.bin";
pub const CASCADE_MODEL_URL: &str =
    "https://github.com/atomashpolskiy/rustface/raw/master/model/seeta_fd_frontal_v1.0.bin";

/// Source extensions treated as still images; everything else is decoded as video.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Frame rate used when the source reports zero or an unknown rate.
pub const DEFAULT_FPS: f64 = 25.0;

pub const FACE_CONFIDENCE_THRESHOLD: f64 = 0.5;
pub const FACE_IOU_THRESHOLD: f64 = 0.3;

pub const OBJECT_CONFIDENCE_THRESHOLD: f64 = 0.25;
pub const OBJECT_IOU_THRESHOLD: f64 = 0.7;

/// Maximum cosine distance at which a query face matches a gallery entry.
pub const MATCH_TOLERANCE: f64 = 0.5;

pub const UNKNOWN_IDENTITY: &str = "Unknown";

/// Sources under this prefix are opened as V4L2 capture devices.
pub const CAMERA_DEVICE_PREFIX: &str = "/dev/video";
pub const CAMERA_INPUT_FORMAT: &str = "v4l2";

/// Returns true when the path's extension marks it as a still image.
pub fn is_image_path(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Returns true when the path names a V4L2 camera such as `/dev/video0`.
pub fn is_camera_path(path: &std::path::Path) -> bool {
    path.to_str()
        .and_then(|p| p.strip_prefix(CAMERA_DEVICE_PREFIX))
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}
