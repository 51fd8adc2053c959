mod common;

use dtstamp_core::metadata::read_capture_timestamp;
use dtstamp_core::FileError;
use tempfile::tempdir;

use common::*;

#[test]
fn reads_date_time_original_from_jpeg() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "a.jpg", &jpeg_with_exif(Some("2023:03:04 14:05:00")));

    let ts = read_capture_timestamp(&path).unwrap().unwrap();
    assert_eq!(ts.to_string(), "2023-03-04 14:05:00");
}

#[test]
fn reads_date_time_original_from_png_exif_chunk() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "a.png", &png_with_exif(Some("2020:02:29 00:15:00")));

    let ts = read_capture_timestamp(&path).unwrap().unwrap();
    assert_eq!(ts.to_string(), "2020-02-29 00:15:00");
}

#[test]
fn exif_without_capture_time_is_absent() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "a.jpg", &jpeg_with_exif(None));
    assert!(read_capture_timestamp(&path).unwrap().is_none());
}

#[test]
fn blank_capture_time_is_absent() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "a.jpg", &jpeg_with_exif(Some("    :  :     :  :  ")));
    assert!(read_capture_timestamp(&path).unwrap().is_none());
}

#[test]
fn images_without_exif_are_absent() {
    let dir = tempdir().unwrap();
    let jpg = write(dir.path(), "plain.jpg", &plain_jpeg());
    let png = write(dir.path(), "plain.png", &plain_png());
    assert!(read_capture_timestamp(&jpg).unwrap().is_none());
    assert!(read_capture_timestamp(&png).unwrap().is_none());
}

#[test]
fn truncated_jpeg_is_a_read_failure() {
    let dir = tempdir().unwrap();
    let full = jpeg_with_exif(Some("2023:03:04 14:05:00"));
    let path = write(dir.path(), "cut.jpg", &full[..12]);

    let err = read_capture_timestamp(&path).unwrap_err();
    assert!(matches!(err, FileError::MetadataRead { .. }));
    assert_eq!(err.file(), "cut.jpg");
}
