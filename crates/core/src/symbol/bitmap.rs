//! Normalized symbol bitmaps.

use image::{imageops, DynamicImage, RgbaImage};
use thiserror::Error;

/// Errors turning raw bytes into a usable symbol.
#[derive(Debug, Error)]
pub enum SymbolDecodeError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image has no visible pixels")]
    Empty,
}

/// A symbol bitmap in RGBA8, trimmed to the bounding box of its visible
/// pixels. Never empty.
#[derive(Debug, Clone)]
pub struct SymbolImage {
    pixels: RgbaImage,
}

impl SymbolImage {
    /// Decode any supported format and normalize it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SymbolDecodeError> {
        let decoded = image::load_from_memory(bytes)?;
        Self::from_dynamic(decoded)
    }

    /// Normalize an already decoded image.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self, SymbolDecodeError> {
        let rgba = image.into_rgba8();
        let pixels = trim_to_content(&rgba).ok_or(SymbolDecodeError::Empty)?;
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Crop to the tight bounding box of pixels with non-zero alpha.
/// Returns `None` when every pixel is fully transparent.
pub fn trim_to_content(image: &RgbaImage) -> Option<RgbaImage> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut any = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] > 0 {
            any = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if !any {
        return None;
    }

    let width = max_x - min_x + 1;
    let height = max_y - min_y + 1;
    Some(imageops::crop_imm(image, min_x, min_y, width, height).to_image())
}
