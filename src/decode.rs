//! Decoded image type and the bytes → image decode step
//!
//! Logos are kept as RGBA8 bitmaps behind an `Arc` so that every display
//! target bound to the same URL shares one allocation.

use crate::error::{LogoError, LogoResult};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbaImage};
use std::fmt;
use std::sync::Arc;

/// A decoded, display-ready image
#[derive(Clone)]
pub struct DecodedImage {
    pixels: Arc<RgbaImage>,
}

impl DecodedImage {
    /// Wrap an RGBA bitmap
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Raw RGBA8 pixel data, row-major
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    /// True when both values refer to the same decoded bitmap
    pub fn same_as(&self, other: &DecodedImage) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Decode fetched bytes into an image
///
/// The format is sniffed from the bytes, not from the URL or content type.
/// Images larger than `max_edge` on either side are downscaled to fit,
/// keeping the aspect ratio. `max_edge == 0` keeps the original size.
///
/// `source` is only used for error context.
pub fn decode(source: &str, bytes: &[u8], max_edge: u32) -> LogoResult<DecodedImage> {
    if bytes.is_empty() {
        return Err(LogoError::decode_failed(source, "empty response body"));
    }

    let img = image::load_from_memory(bytes).map_err(|e| LogoError::decode_failed(source, e))?;

    Ok(DecodedImage::new(fit_within(img, max_edge).to_rgba8()))
}

fn fit_within(img: DynamicImage, max_edge: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if max_edge == 0 || (width <= max_edge && height <= max_edge) {
        return img;
    }
    img.resize(max_edge, max_edge, FilterType::Lanczos3)
}
