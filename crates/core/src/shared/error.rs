use std::path::PathBuf;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error>;

/// Failures surfaced by the annotation pipeline.
///
/// Every variant except [`AnnotateError::GalleryEntryUnusable`] aborts the
/// run; unusable gallery entries are logged and skipped.
#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("source not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("cannot decode source {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("failed to load model {}: {source}", path.display())]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("cannot write output {}: {source}", path.display())]
    SinkWrite {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("cannot read gallery directory {}: {source}", path.display())]
    GalleryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("skipping gallery entry {}: {reason}", path.display())]
    GalleryEntryUnusable { path: PathBuf, reason: String },
}

impl AnnotateError {
    pub fn source_unreadable(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::SourceUnreadable {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn model_load(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::ModelLoad {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn sink_write(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::SinkWrite {
            path: path.into(),
            source: source.into(),
        }
    }

    /// True for errors that end the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::GalleryEntryUnusable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_include_path() {
        let err = AnnotateError::SourceNotFound {
            path: PathBuf::from("/tmp/missing.mp4"),
        };
        assert_eq!(err.to_string(), "source not found: /tmp/missing.mp4");

        let err = AnnotateError::sink_write("/out/x.mp4", "disk full");
        assert_eq!(err.to_string(), "cannot write output /out/x.mp4: disk full");
    }

    #[test]
    fn test_source_chain_is_preserved() {
        let err = AnnotateError::model_load("m.onnx", "bad header");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "bad header");
    }

    #[test]
    fn test_only_gallery_entry_is_non_fatal() {
        let skipped = AnnotateError::GalleryEntryUnusable {
            path: PathBuf::from("bob.png"),
            reason: "no face found".into(),
        };
        assert!(!skipped.is_fatal());
        assert!(AnnotateError::source_unreadable("a.mp4", "corrupt").is_fatal());
        assert!(AnnotateError::SourceNotFound { path: "a".into() }.is_fatal());
    }
}
