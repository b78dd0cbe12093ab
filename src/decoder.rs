//! Turns downloaded bytes into pixels.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader};
use thiserror::Error;

/// Raster formats the pipeline accepts.
pub const SUPPORTED_FORMATS: &[ImageFormat] = &[ImageFormat::Jpeg, ImageFormat::Png];

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("could not detect image format")]
    UnknownFormat,

    #[error("unsupported image format: {0:?}")]
    UnsupportedFormat(ImageFormat),

    #[error("failed to decode image: {0}")]
    Corrupt(String),

    #[error("image dimensions are zero")]
    ZeroDimensions,
}

/// A successfully decoded candidate.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub format: ImageFormat,
    pub image: DynamicImage,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }
}

/// Decode JPEG or PNG bytes. The format is sniffed from the data, not taken
/// from the URL or the Content-Type header.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::Corrupt(e.to_string()))?;

    let format = reader.format().ok_or(DecodeError::UnknownFormat)?;
    if !SUPPORTED_FORMATS.contains(&format) {
        return Err(DecodeError::UnsupportedFormat(format));
    }

    let image = reader
        .decode()
        .map_err(|e| DecodeError::Corrupt(e.to_string()))?;

    if image.width() == 0 || image.height() == 0 {
        return Err(DecodeError::ZeroDimensions);
    }

    Ok(DecodedImage { format, image })
}
