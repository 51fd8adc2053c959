use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use exif::{In, Reader, Tag, Value};
use serde::Serialize;

use crate::error::FileError;

/// When a photo was taken, as recorded by the camera.
/// EXIF datetimes have no timezone info - they are local time as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CaptureTimestamp(NaiveDateTime);

impl CaptureTimestamp {
    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }
}

impl From<NaiveDateTime> for CaptureTimestamp {
    fn from(datetime: NaiveDateTime) -> Self {
        Self(datetime)
    }
}

impl fmt::Display for CaptureTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Read `DateTimeOriginal` from the image's embedded EXIF block.
///
/// `Ok(None)` means the image simply has nothing to stamp: no EXIF block, or a
/// missing, blank or malformed field. `Err` means the file could not be opened
/// or its container is broken.
pub fn read_capture_timestamp(path: &Path) -> Result<Option<CaptureTimestamp>, FileError> {
    let file_name = display_name(path);
    let file = File::open(path).map_err(|e| FileError::MetadataRead {
        file: file_name.clone(),
        source: exif::Error::from(e),
    })?;

    let exif = match Reader::new().read_from_container(&mut BufReader::new(file)) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(None),
        Err(source) => {
            return Err(FileError::MetadataRead {
                file: file_name,
                source,
            })
        }
    };

    let Some(field) = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY) else {
        return Ok(None);
    };
    Ok(parse_exif_datetime(&field.value).map(CaptureTimestamp))
}

fn parse_exif_datetime(value: &Value) -> Option<NaiveDateTime> {
    let Value::Ascii(parts) = value else {
        return None;
    };
    let raw = parts.first()?;
    let dt = exif::DateTime::from_ascii(raw).ok()?;

    NaiveDate::from_ymd_opt(dt.year.into(), dt.month.into(), dt.day.into())?.and_hms_opt(
        dt.hour.into(),
        dt.minute.into(),
        dt.second.into(),
    )
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
