//! Slide raster types

use image::RgbImage;

use crate::tiling::common::error::{Result, TilingError};

/// Decoded slide image, 3 channels at 8 bits each.
#[derive(Debug, Clone)]
pub struct SlideRaster {
    pixels: RgbImage,
}

impl SlideRaster {
    pub fn new(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    /// Wraps interleaved `[R, G, B, R, G, B, ...]` samples.
    pub fn from_rgb8(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(TilingError::DecodeFailure(format!(
                "expected {} RGB samples for {}x{}, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        RgbImage::from_raw(width, height, data)
            .map(Self::new)
            .ok_or_else(|| TilingError::DecodeFailure(format!("invalid raster {}x{}", width, height)))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }
}
