use std::path::Path;

use image::{DynamicImage, ImageDecoder, ImageReader};

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

/// Serves a still image as a one-frame source.
///
/// The format is sniffed from the file contents, so a mislabelled extension
/// still decodes. EXIF orientation is applied before the frame is handed out,
/// which keeps boxes aligned with what an image viewer shows.
pub struct ImageFileReader {
    pending: Option<Frame>,
}

impl ImageFileReader {
    pub fn new() -> Self {
        Self { pending: None }
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes `path` upright and returns the image with its format name.
fn decode_upright(path: &Path) -> Result<(DynamicImage, String), Box<dyn std::error::Error>> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader
        .format()
        .map(|f| format!("{f:?}").to_lowercase())
        .ok_or("unrecognised image format")?;

    let mut decoder = reader.into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);
    Ok((image, format))
}

impl VideoReader for ImageFileReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        let (image, format) = decode_upright(path)?;
        if image.width() == 0 || image.height() == 0 {
            return Err("Image reports zero dimensions".into());
        }

        let frame = Frame::from_rgb_image(image.into_rgb8(), 0);
        let metadata = VideoMetadata {
            width: frame.width(),
            height: frame.height(),
            fps: 0.0,
            total_frames: 1,
            codec: format,
            source_path: Some(path.to_path_buf()),
        };
        log::debug!(
            "Decoded {} ({}x{} {})",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.codec
        );
        self.pending = Some(frame);
        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        match self.pending.take() {
            Some(frame) => Box::new(std::iter::once(Ok(frame))),
            None => Box::new(std::iter::once(Err("no image has been opened".into()))),
        }
    }

    fn close(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;

    fn solid(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbImage::from_pixel(width, height, image::Rgb([50, 100, 200]))
            .save(&path)
            .unwrap();
        path
    }

    #[rstest]
    #[case::png("still.png", "png")]
    #[case::jpeg("still.jpg", "jpeg")]
    fn test_open_reports_size_and_format(#[case] name: &str, #[case] codec: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = solid(dir.path(), name, 100, 80);

        let meta = ImageFileReader::new().open(&path).unwrap();

        assert_eq!((meta.width, meta.height), (100, 80));
        assert_eq!(meta.fps, 0.0);
        assert_eq!(meta.total_frames, 1);
        assert_eq!(meta.codec, codec);
        assert_eq!(meta.source_path, Some(path));
    }

    #[test]
    fn test_format_follows_contents_not_extension() {
        let dir = tempfile::tempdir().unwrap();
        let png = solid(dir.path(), "real.png", 6, 4);
        let renamed = dir.path().join("mislabelled.jpg");
        std::fs::rename(&png, &renamed).unwrap();

        let meta = ImageFileReader::new().open(&renamed).unwrap();
        assert_eq!(meta.codec, "png");
    }

    #[test]
    fn test_frame_keeps_exact_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradient.png");
        let img = image::RgbImage::from_fn(3, 2, |x, y| image::Rgb([x as u8 * 10, y as u8, 7]));
        img.save(&path).unwrap();

        let mut reader = ImageFileReader::new();
        reader.open(&path).unwrap();
        let frames: Vec<_> = reader.frames().map(|f| f.unwrap()).collect();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].index(), 0);
        assert_eq!(frames[0].channels(), 3);
        assert_eq!(frames[0].data(), img.as_raw().as_slice());
    }

    #[test]
    fn test_grayscale_source_becomes_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        image::GrayImage::from_pixel(4, 4, image::Luma([90])).save(&path).unwrap();

        let mut reader = ImageFileReader::new();
        reader.open(&path).unwrap();
        let frame = reader.frames().next().unwrap().unwrap();
        assert_eq!(&frame.data()[..3], &[90, 90, 90]);
    }

    #[test]
    fn test_missing_file_raises() {
        assert!(ImageFileReader::new()
            .open(Path::new("/nonexistent/still.png"))
            .is_err());
    }

    #[test]
    fn test_truncated_png_raises() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cut.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\nthis is truncated").unwrap();
        assert!(ImageFileReader::new().open(&path).is_err());
    }

    #[test]
    fn test_frame_is_served_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = solid(dir.path(), "once.png", 10, 10);
        let mut reader = ImageFileReader::new();
        reader.open(&path).unwrap();

        assert_eq!(reader.frames().filter(|f| f.is_ok()).count(), 1);
        assert!(reader.frames().next().unwrap().is_err());
    }

    #[test]
    fn test_close_drops_pending_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = solid(dir.path(), "closed.png", 10, 10);
        let mut reader = ImageFileReader::new();
        reader.open(&path).unwrap();
        reader.close();
        reader.close();
        assert!(reader.frames().next().unwrap().is_err());
    }
}
