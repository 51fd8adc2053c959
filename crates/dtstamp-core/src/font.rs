use std::fs;
use std::path::Path;
use std::sync::Arc;

use resvg::usvg::fontdb;

use crate::error::StampError;

/// A font loaded from disk at a fixed point size, shared read-only by every
/// file in a batch.
#[derive(Debug, Clone)]
pub struct FontResource {
    database: Arc<fontdb::Database>,
    family: String,
    size: u32,
}

impl FontResource {
    pub fn load(path: &Path, size: u32) -> Result<Self, StampError> {
        let fail = |reason: String| StampError::FontLoad {
            path: path.to_path_buf(),
            reason,
        };
        let data = fs::read(path).map_err(|e| fail(e.to_string()))?;
        Self::from_bytes(data, size).map_err(fail)
    }

    /// Build from an in-memory TrueType/OpenType file.
    pub fn from_bytes(data: Vec<u8>, size: u32) -> Result<Self, String> {
        if size == 0 {
            return Err("font size must be greater than zero".to_string());
        }

        let mut database = fontdb::Database::new();
        database.load_font_data(data);

        let family = database
            .faces()
            .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
            .ok_or_else(|| "file contains no usable font face".to_string())?;

        Ok(Self {
            database: Arc::new(database),
            family,
            size,
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub(crate) fn database(&self) -> Arc<fontdb::Database> {
        Arc::clone(&self.database)
    }
}
