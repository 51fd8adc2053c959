use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::StampError;
use crate::metadata::display_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Jpeg,
    Png,
}

impl InputFormat {
    /// Supported input extensions are jpg, jpeg and png, in any case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

/// An image file found in the working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageCandidate {
    path: PathBuf,
    format: InputFormat,
}

impl ImageCandidate {
    /// `None` when the extension is not a supported input type.
    pub fn new(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let format = InputFormat::from_path(&path)?;
        Some(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name, which is also the name of the stamped copy.
    pub fn file_name(&self) -> String {
        display_name(&self.path)
    }
}

/// List supported images directly inside `dir`, sorted by path.
/// Sub-directories are not descended into.
pub fn scan_candidates(dir: &Path) -> Result<Vec<ImageCandidate>, StampError> {
    let scan_err = |source| StampError::Scan {
        path: dir.to_path_buf(),
        source,
    };
    let dir = dir.canonicalize().map_err(scan_err)?;

    let mut candidates: Vec<ImageCandidate> = fs::read_dir(&dir)
        .map_err(scan_err)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter_map(ImageCandidate::new)
        .collect();

    candidates.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(candidates)
}
