use std::fmt;
use std::io::Cursor;

use bytes::Bytes;
use image::{ImageFormat, ImageReader};

/// Decoded upload, kept with its original encoding for the generation request.
#[derive(Debug, Clone)]
pub struct StoryImage {
    pub bytes: Bytes,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug)]
pub enum ImageError {
    Unsupported,
    Decode(image::ImageError),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => f.write_str("unsupported image format, expected PNG or JPEG"),
            Self::Decode(err) => write!(f, "cannot decode image: {err}"),
        }
    }
}

impl From<image::ImageError> for ImageError {
    fn from(value: image::ImageError) -> Self {
        Self::Decode(value)
    }
}

impl StoryImage {
    pub fn decode(bytes: Bytes) -> Result<Self, ImageError> {
        let format = image::guess_format(&bytes).map_err(|_| ImageError::Unsupported)?;

        if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
            return Err(ImageError::Unsupported);
        }

        let image = ImageReader::with_format(Cursor::new(bytes.as_ref()), format).decode()?;

        Ok(Self { width: image.width(), height: image.height(), format, bytes })
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}
