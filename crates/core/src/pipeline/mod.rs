pub(crate) mod annotate_frame;
pub mod annotate_image_use_case;
pub mod annotate_media_use_case;
pub mod annotate_video_use_case;
pub mod infrastructure;
pub mod pipeline_config;
pub mod pipeline_logger;
pub mod pipeline_report;
