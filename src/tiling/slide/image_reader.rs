use tracing::debug;

use crate::tiling::common::error::{Result, TilingError};
use crate::tiling::slide::reader::SlideReader;
use crate::tiling::slide::types::SlideRaster;

/// Reader for the formats the `image` crate decodes (JPEG, PNG).
pub struct ImageSlideReader;

impl SlideReader for ImageSlideReader {
    fn read_slide(&self, data: &[u8]) -> Result<SlideRaster> {
        debug!("Decoding slide image, {} bytes", data.len());

        let decoded = image::load_from_memory(data)
            .map_err(|e| TilingError::DecodeFailure(e.to_string()))?;

        debug!(
            color = ?decoded.color(),
            width = decoded.width(),
            height = decoded.height(),
            "Decoded slide"
        );

        Ok(SlideRaster::new(decoded.to_rgb8()))
    }
}
