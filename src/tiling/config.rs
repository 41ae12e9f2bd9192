//! Tiling configuration types

use crate::tiling::common::error::{Result, TilingError};

pub const DEFAULT_TILE_SIZE: u32 = 2000;
pub const DEFAULT_MASK_VALUE: u8 = 255;
pub const DEFAULT_BACKGROUND_VALUE: u8 = 0;
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Configuration for slide tiling and mask generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilingConfig {
    /// Edge length of every output tile and mask, in pixels
    pub tile_size: u32,
    /// Mask pixel value for annotated regions
    pub mask_value: u8,
    /// Mask pixel value everywhere else
    pub background_value: u8,
    /// Only write tiles that intersect at least one annotation
    pub save_only_annotated: bool,
    /// JPEG quality for tile images (1-100)
    pub jpeg_quality: u8,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            mask_value: DEFAULT_MASK_VALUE,
            background_value: DEFAULT_BACKGROUND_VALUE,
            save_only_annotated: false,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl TilingConfig {
    pub fn builder() -> TilingConfigBuilder {
        TilingConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(TilingError::InvalidConfiguration(
                "tile_size must be positive".to_string(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(TilingError::InvalidConfiguration(format!(
                "jpeg_quality must be within 1-100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

/// Checks that an integer taken from user input fits a single 8-bit mask sample.
pub fn pixel_value(name: &str, value: i64) -> Result<u8> {
    u8::try_from(value).map_err(|_| {
        TilingError::InvalidConfiguration(format!("{name} must be within 0-255, got {value}"))
    })
}

/// Checks a user-supplied tile size: positive and within `u32`.
pub fn tile_size_value(value: i64) -> Result<u32> {
    match u32::try_from(value) {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(TilingError::InvalidConfiguration(format!(
            "tile_size must be a positive integer, got {value}"
        ))),
    }
}

/// Builder for TilingConfig
#[derive(Default)]
pub struct TilingConfigBuilder {
    tile_size: Option<u32>,
    mask_value: Option<u8>,
    background_value: Option<u8>,
    save_only_annotated: Option<bool>,
    jpeg_quality: Option<u8>,
}

impl TilingConfigBuilder {
    pub fn tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = Some(tile_size);
        self
    }

    pub fn mask_value(mut self, value: u8) -> Self {
        self.mask_value = Some(value);
        self
    }

    pub fn background_value(mut self, value: u8) -> Self {
        self.background_value = Some(value);
        self
    }

    pub fn save_only_annotated(mut self, enable: bool) -> Self {
        self.save_only_annotated = Some(enable);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = Some(quality);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<TilingConfig> {
        let default = TilingConfig::default();
        let config = TilingConfig {
            tile_size: self.tile_size.unwrap_or(default.tile_size),
            mask_value: self.mask_value.unwrap_or(default.mask_value),
            background_value: self.background_value.unwrap_or(default.background_value),
            save_only_annotated: self
                .save_only_annotated
                .unwrap_or(default.save_only_annotated),
            jpeg_quality: self.jpeg_quality.unwrap_or(default.jpeg_quality),
        };
        config.validate()?;
        Ok(config)
    }
}
