use std::error::Error;
use std::io;
use std::path::PathBuf;

use crate::overlay::RenderError;

/// Conditions that abort the whole run before any file is processed.
#[derive(Debug, thiserror::Error)]
pub enum StampError {
    #[error("provided directory doesn't exist: {}", .0.display())]
    InvalidWorkingDirectory(PathBuf),

    #[error("invalid quality '{0}': expected an integer between 0 and 100")]
    InvalidQuality(String),

    #[error("invalid font size {0}: must be greater than zero")]
    InvalidFontSize(u32),

    #[error("could not install font '{}': {reason}", path.display())]
    FontLoad { path: PathBuf, reason: String },

    #[error("no image files found at path {} (supported image types: JPG, JPEG, PNG)", .0.display())]
    NoCandidates(PathBuf),

    #[error("output directory {} would overwrite the input directory", .0.display())]
    OutputOverlapsInput(PathBuf),

    #[error("could not prepare output directory {}", path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not list image files in {}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A per-file failure. Every variant carries the offending file's name.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("{file}: could not read metadata")]
    MetadataRead {
        file: String,
        #[source]
        source: exif::Error,
    },

    #[error("{file}: could not decode image")]
    Decode {
        file: String,
        #[source]
        source: image::ImageError,
    },

    #[error("{file}: could not render timestamp")]
    Render {
        file: String,
        #[source]
        source: RenderError,
    },

    #[error("{file}: could not write stamped copy")]
    Encode {
        file: String,
        #[source]
        source: image::ImageError,
    },
}

impl FileError {
    pub fn file(&self) -> &str {
        match self {
            Self::MetadataRead { file, .. }
            | Self::Decode { file, .. }
            | Self::Render { file, .. }
            | Self::Encode { file, .. } => file,
        }
    }
}

/// Flatten an error and its sources into one diagnostic line.
pub fn error_chain(err: &dyn Error) -> String {
    let mut line = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        line.push_str(": ");
        line.push_str(&cause.to_string());
        source = cause.source();
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_errors_name_the_file() {
        let err = FileError::Decode {
            file: "a.jpg".to_string(),
            source: image::ImageError::IoError(io::Error::other("boom")),
        };
        assert_eq!(err.file(), "a.jpg");
        assert!(err.to_string().starts_with("a.jpg:"));
    }

    #[test]
    fn error_chain_includes_sources() {
        let err = FileError::MetadataRead {
            file: "b.jpg".to_string(),
            source: exif::Error::InvalidFormat("Broken JPEG file"),
        };
        let line = error_chain(&err);
        assert!(line.contains("b.jpg: could not read metadata"));
        assert!(line.contains("Broken JPEG file"));
    }

    #[test]
    fn fatal_messages_are_distinct() {
        let messages = [
            StampError::InvalidWorkingDirectory(PathBuf::from("/nope")).to_string(),
            StampError::InvalidQuality("abc".to_string()).to_string(),
            StampError::InvalidFontSize(0).to_string(),
            StampError::FontLoad {
                path: PathBuf::from("dtstamp.ttf"),
                reason: "missing".to_string(),
            }
            .to_string(),
            StampError::NoCandidates(PathBuf::from("/empty")).to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
