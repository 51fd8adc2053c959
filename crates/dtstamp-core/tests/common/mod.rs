#![allow(dead_code)]

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage};

pub fn fixture_font() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/DejaVuSans.ttf")
}

pub fn noop_progress() -> impl Fn(&str, u64, u64, &str) + Send + Sync {
    |_: &str, _: u64, _: u64, _: &str| {}
}

fn sample_image() -> RgbImage {
    RgbImage::from_fn(640, 200, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

fn encode(format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    sample_image()
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

fn ifd_entry(tiff: &mut Vec<u8>, tag: u16, kind: u16, count: u32, value: [u8; 4]) {
    tiff.extend_from_slice(&tag.to_be_bytes());
    tiff.extend_from_slice(&kind.to_be_bytes());
    tiff.extend_from_slice(&count.to_be_bytes());
    tiff.extend_from_slice(&value);
}

/// Big-endian TIFF block holding DateTimeOriginal, or only an Orientation tag.
fn exif_tiff(datetime_original: Option<&str>) -> Vec<u8> {
    const ASCII: u16 = 2;
    const SHORT: u16 = 3;
    const LONG: u16 = 4;

    let mut tiff = b"MM\x00\x2a\x00\x00\x00\x08".to_vec();
    match datetime_original {
        Some(dt) => {
            let mut value = dt.as_bytes().to_vec();
            value.push(0);
            // IFD0 at 8 (18 bytes), Exif IFD at 26 (18 bytes), string at 44.
            tiff.extend_from_slice(&1u16.to_be_bytes());
            ifd_entry(&mut tiff, 0x8769, LONG, 1, 26u32.to_be_bytes());
            tiff.extend_from_slice(&0u32.to_be_bytes());
            tiff.extend_from_slice(&1u16.to_be_bytes());
            ifd_entry(&mut tiff, 0x9003, ASCII, value.len() as u32, 44u32.to_be_bytes());
            tiff.extend_from_slice(&0u32.to_be_bytes());
            tiff.extend_from_slice(&value);
        }
        None => {
            tiff.extend_from_slice(&1u16.to_be_bytes());
            ifd_entry(&mut tiff, 0x0112, SHORT, 1, [0, 1, 0, 0]);
            tiff.extend_from_slice(&0u32.to_be_bytes());
        }
    }
    tiff
}

/// A JPEG whose APP1 segment carries the given EXIF block.
pub fn jpeg_with_exif(datetime_original: Option<&str>) -> Vec<u8> {
    let jpeg = encode(ImageFormat::Jpeg);
    let tiff = exif_tiff(datetime_original);

    let mut app1 = vec![0xFF, 0xE1];
    app1.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    app1.extend_from_slice(b"Exif\x00\x00");
    app1.extend_from_slice(&tiff);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// A PNG with an `eXIf` chunk (raw TIFF, no `Exif` prefix) right after IHDR.
pub fn png_with_exif(datetime_original: Option<&str>) -> Vec<u8> {
    let png = encode(ImageFormat::Png);
    let tiff = exif_tiff(datetime_original);

    let mut chunk = (tiff.len() as u32).to_be_bytes().to_vec();
    let mut body = b"eXIf".to_vec();
    body.extend_from_slice(&tiff);
    chunk.extend_from_slice(&body);
    chunk.extend_from_slice(&crc32fast::hash(&body).to_be_bytes());

    // Signature (8) + IHDR (4 length, 4 type, 13 data, 4 CRC).
    let ihdr_end = 8 + 25;
    let mut out = png[..ihdr_end].to_vec();
    out.extend_from_slice(&chunk);
    out.extend_from_slice(&png[ihdr_end..]);
    out
}

pub fn plain_jpeg() -> Vec<u8> {
    encode(ImageFormat::Jpeg)
}

pub fn plain_png() -> Vec<u8> {
    encode(ImageFormat::Png)
}

pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

pub fn output_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
