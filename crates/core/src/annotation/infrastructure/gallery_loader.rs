//! Builds a [`Gallery`] from a directory of reference face images.
//!
//! Each image contributes at most one entry, named after its file stem and
//! embedded from the first face the locator returns. Files are visited in
//! file-name order.

use std::path::{Path, PathBuf};

use crate::annotation::domain::annotator::Annotator;
use crate::annotation::domain::face_embedder::FaceEmbedder;
use crate::annotation::domain::gallery::{Gallery, GalleryEntry};
use crate::shared::constants::is_image_path;
use crate::shared::error::AnnotateError;
use crate::shared::frame::Frame;

pub struct GalleryLoader<'a> {
    locator: &'a mut dyn Annotator,
    embedder: &'a mut dyn FaceEmbedder,
}

impl<'a> GalleryLoader<'a> {
    pub fn new(locator: &'a mut dyn Annotator, embedder: &'a mut dyn FaceEmbedder) -> Self {
        Self { locator, embedder }
    }

    /// Scan `dir` and embed every usable reference image.
    ///
    /// Unusable images are logged and skipped; only an unlistable directory
    /// is an error.
    pub fn load(&mut self, dir: &Path) -> Result<Gallery, AnnotateError> {
        let mut entries = Vec::new();
        for path in image_files(dir)? {
            match self.load_entry(&path) {
                Ok(entry) => {
                    log::debug!("Gallery: {} from {}", entry.name, path.display());
                    entries.push(entry);
                }
                Err(e) => log::warn!("{e}"),
            }
        }

        if entries.is_empty() {
            log::warn!(
                "No usable reference faces in {}; every face will be {}",
                dir.display(),
                crate::shared::constants::UNKNOWN_IDENTITY
            );
        } else {
            log::info!("Loaded {} known face(s) from {}", entries.len(), dir.display());
        }
        Ok(Gallery::new(entries))
    }

    fn load_entry(&mut self, path: &Path) -> Result<GalleryEntry, AnnotateError> {
        let unusable = |reason: String| AnnotateError::GalleryEntryUnusable {
            path: path.to_path_buf(),
            reason,
        };

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| unusable("file name is not valid UTF-8".to_string()))?
            .to_string();

        let image = image::open(path).map_err(|e| unusable(format!("unreadable image: {e}")))?;
        let frame = Frame::from_rgb_image(image.to_rgb8(), 0);

        let faces = self
            .locator
            .annotate(&frame)
            .map_err(|e| unusable(format!("face location failed: {e}")))?;
        let face = faces
            .first()
            .ok_or_else(|| unusable("no face found".to_string()))?;
        let crop = frame
            .crop(face.x1, face.y1, face.x2, face.y2)
            .ok_or_else(|| unusable("face box lies outside the image".to_string()))?;

        let embedding = self
            .embedder
            .embed(&crop)
            .map_err(|e| unusable(format!("embedding failed: {e}")))?;

        Ok(GalleryEntry { name, embedding })
    }
}

/// Image files directly inside `dir`, sorted by file name.
fn image_files(dir: &Path) -> Result<Vec<PathBuf>, AnnotateError> {
    let unavailable = |source: std::io::Error| AnnotateError::GalleryUnavailable {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(unavailable)? {
        let path = entry.map_err(unavailable)?.path();
        if path.is_file() && is_image_path(&path) {
            files.push(path);
        } else {
            log::debug!("Gallery: skipping {}", path.display());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::detection::Detection;

    /// Reports one full-image face unless the image is pure black.
    struct BrightnessLocator;

    impl Annotator for BrightnessLocator {
        fn annotate(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
            if frame.data().iter().all(|&b| b == 0) {
                return Ok(vec![]);
            }
            Ok(vec![
                Detection::new(0.0, 0.0, frame.width() as f64, frame.height() as f64),
                Detection::new(0.0, 0.0, 1.0, 1.0),
            ])
        }
    }

    /// Embeds a crop as its first pixel plus its width.
    struct PixelEmbedder;

    impl FaceEmbedder for PixelEmbedder {
        fn embed(&mut self, face: &Frame) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
            let d = face.data();
            Ok(vec![d[0] as f32, d[1] as f32, d[2] as f32, face.width() as f32])
        }
    }

    fn write_png(dir: &Path, name: &str, rgb: [u8; 3]) {
        image::RgbImage::from_pixel(8, 8, image::Rgb(rgb))
            .save(dir.join(name))
            .unwrap();
    }

    fn load(dir: &Path) -> Result<Gallery, AnnotateError> {
        let mut locator = BrightnessLocator;
        let mut embedder = PixelEmbedder;
        GalleryLoader::new(&mut locator, &mut embedder).load(dir)
    }

    #[test]
    fn test_entries_are_named_by_stem_in_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "carol.png", [30, 30, 30]);
        write_png(dir.path(), "alice.png", [10, 10, 10]);
        write_png(dir.path(), "bob.jpg", [20, 20, 20]);

        let gallery = load(dir.path()).unwrap();
        let names: Vec<_> = gallery.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_uses_first_face_only() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "alice.png", [200, 100, 50]);

        let gallery = load(dir.path()).unwrap();
        assert_eq!(gallery.len(), 1);
        // full-image box is 8 wide; the second 1x1 box is ignored
        assert_eq!(gallery.entries()[0].embedding, vec![200.0, 100.0, 50.0, 8.0]);
    }

    #[test]
    fn test_skips_non_images_and_faceless_images() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "alice.png", [10, 10, 10]);
        write_png(dir.path(), "nobody.png", [0, 0, 0]);
        std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();
        std::fs::create_dir(dir.path().join("subdir.png")).unwrap();

        let gallery = load(dir.path()).unwrap();
        let names: Vec<_> = gallery.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alice"]);
    }

    #[test]
    fn test_skips_corrupt_images() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();
        write_png(dir.path(), "zed.png", [10, 10, 10]);

        let gallery = load(dir.path()).unwrap();
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.entries()[0].name, "zed");
    }

    #[test]
    fn test_empty_directory_gives_empty_gallery() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, AnnotateError::GalleryUnavailable { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_unusable_entry_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "nobody.png", [0, 0, 0]);
        let mut locator = BrightnessLocator;
        let mut embedder = PixelEmbedder;
        let err = GalleryLoader::new(&mut locator, &mut embedder)
            .load_entry(&dir.path().join("nobody.png"))
            .unwrap_err();
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("nobody.png"));
    }
}
