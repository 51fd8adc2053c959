use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::candidate::ImageCandidate;
use crate::error::StampError;

/// Start from an empty output directory: anything left by a previous run is removed.
pub fn prepare_output_dir(dir: &Path) -> Result<(), StampError> {
    let fail = |source| StampError::OutputDirectory {
        path: dir.to_path_buf(),
        source,
    };
    if dir.exists() {
        debug!(dir = %dir.display(), "removing previous output");
        fs::remove_dir_all(dir).map_err(fail)?;
    }
    fs::create_dir_all(dir).map_err(fail)
}

/// Where the stamped copy of `candidate` is written.
pub fn output_path(output_dir: &Path, candidate: &ImageCandidate) -> PathBuf {
    match candidate.path().file_name() {
        Some(name) => output_dir.join(name),
        None => output_dir.join(candidate.file_name()),
    }
}
