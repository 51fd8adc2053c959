use crate::metadata::CaptureTimestamp;

/// ISO date, two spaces, then the short 12-hour time ("2023-03-04  2:05 PM").
pub const STAMP_FORMAT: &str = "%Y-%m-%d  %-I:%M %p";

/// Text stamped onto the image for a capture timestamp.
pub fn format_timestamp(timestamp: &CaptureTimestamp) -> String {
    timestamp.datetime().format(STAMP_FORMAT).to_string()
}
