use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ImageError, ImageResult, RgbImage};

use crate::config::Quality;

/// Write `image` to `dest` as JPEG, replacing any existing file.
pub fn encode_jpeg(image: &RgbImage, dest: &Path, quality: Quality) -> ImageResult<()> {
    let file = File::create(dest).map_err(ImageError::IoError)?;
    let mut writer = BufWriter::new(file);
    image.write_with_encoder(JpegEncoder::new_with_quality(
        &mut writer,
        quality.jpeg_quality(),
    ))?;
    writer.flush().map_err(ImageError::IoError)?;
    Ok(())
}
