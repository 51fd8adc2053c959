use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::StampError;

pub const DEFAULT_FONT_SIZE: u32 = 96;
pub const DEFAULT_FONT_FILE: &str = "dtstamp.ttf";
pub const OUTPUT_DIR_NAME: &str = "output";

/// JPEG quality of the stamped copies, always within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub const DEFAULT: Quality = Quality(75);

    pub fn new(value: i64) -> Result<Self, StampError> {
        match u8::try_from(value) {
            Ok(q) if q <= 100 => Ok(Self(q)),
            _ => Err(StampError::InvalidQuality(value.to_string())),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Quality handed to the JPEG encoder, whose scale starts at 1.
    pub fn jpeg_quality(self) -> u8 {
        self.0.max(1)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for Quality {
    type Err = StampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| StampError::InvalidQuality(s.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable settings for one stamping run.
#[derive(Debug, Clone)]
pub struct StampConfig {
    /// Folder scanned (non-recursively) for images
    pub working_dir: PathBuf,
    /// Folder receiving the stamped copies; deleted and recreated per run
    pub output_dir: PathBuf,
    pub font_path: PathBuf,
    /// Font size in points (rendered 1pt = 1px)
    pub font_size: u32,
    pub quality: Quality,
}

impl StampConfig {
    /// Defaults for stamping the images in `working_dir`.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        Self {
            output_dir: working_dir.join(OUTPUT_DIR_NAME),
            working_dir,
            font_path: PathBuf::from(DEFAULT_FONT_FILE),
            font_size: DEFAULT_FONT_SIZE,
            quality: Quality::DEFAULT,
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_font_path(mut self, font_path: impl Into<PathBuf>) -> Self {
        self.font_path = font_path.into();
        self
    }

    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Check everything that can be checked without touching the font or the images.
    pub fn validate(&self) -> Result<(), StampError> {
        if !self.working_dir.is_dir() {
            return Err(StampError::InvalidWorkingDirectory(self.working_dir.clone()));
        }
        if self.font_size == 0 {
            return Err(StampError::InvalidFontSize(self.font_size));
        }
        if output_overlaps_input(&self.working_dir, &self.output_dir) {
            return Err(StampError::OutputOverlapsInput(self.output_dir.clone()));
        }
        Ok(())
    }
}

/// The output folder is wiped before a run, so it must not contain the inputs.
fn output_overlaps_input(working_dir: &Path, output_dir: &Path) -> bool {
    let Ok(working) = working_dir.canonicalize() else {
        return false;
    };
    let output = output_dir
        .canonicalize()
        .or_else(|_| std::path::absolute(output_dir));
    match output {
        Ok(output) => working.starts_with(&output),
        Err(_) => false,
    }
}
