//! Image decoding for preview frames

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::RgbaImage;
use tracing::trace;

use crate::payload::ImageSource;
use crate::DecodeError;

/// Decoded RGBA frame
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pixels: RgbaImage,
}

impl DecodedImage {
    /// Wrap RGBA pixels. Fails on a zero-sized image.
    pub fn new(pixels: RgbaImage) -> Result<Self, DecodeError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(DecodeError::Empty);
        }
        Ok(Self { pixels })
    }

    /// Natural width in pixels
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Natural height in pixels
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Turns a resource reference into pixels.
///
/// Implementations block; the session driver runs them off the render loop.
pub trait ImageDecoder: Send + Sync + 'static {
    fn decode(&self, source: &ImageSource) -> Result<DecodedImage, DecodeError>;
}

/// Decoder backed by the `image` crate (files on disk and inline base64)
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFileDecoder;

impl ImageFileDecoder {
    pub fn new() -> Self {
        Self
    }

    fn decode_inline(data: &str) -> Result<DecodedImage, DecodeError> {
        // Accept both bare base64 and data: URLs
        let encoded = match data.split_once(";base64,") {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => data,
        };
        let bytes = STANDARD.decode(encoded.trim())?;
        let img = image::load_from_memory(&bytes)?;
        DecodedImage::new(img.to_rgba8())
    }
}

impl ImageDecoder for ImageFileDecoder {
    fn decode(&self, source: &ImageSource) -> Result<DecodedImage, DecodeError> {
        match source {
            ImageSource::File(path) => {
                trace!("Decoding frame file {}", path.display());
                let img = image::open(path)?;
                DecodedImage::new(img.to_rgba8())
            }
            ImageSource::Data(data) => Self::decode_inline(data),
        }
    }
}
