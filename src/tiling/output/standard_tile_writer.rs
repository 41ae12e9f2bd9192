use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, GrayImage, ImageEncoder, RgbImage};
use tracing::debug;

use crate::tiling::common::error::{Result, TilingError};
use crate::tiling::config::TilingConfig;
use crate::tiling::output::layout::OutputLayout;
use crate::tiling::output::writer::TileWriter;

/// Writes tiles as JPEG and masks as single-channel PNG.
pub struct StandardTileWriter;

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| TilingError::IoFailure(format!("{}: {}", path.display(), e)))
}

impl TileWriter for StandardTileWriter {
    fn prepare(&self, layout: &OutputLayout) -> Result<()> {
        for dir in [&layout.tiles_dir, &layout.masks_dir] {
            std::fs::create_dir_all(dir)
                .map_err(|e| TilingError::IoFailure(format!("{}: {}", dir.display(), e)))?;
        }
        Ok(())
    }

    fn write_tile(
        &self,
        layout: &OutputLayout,
        index: usize,
        tile: &RgbImage,
        mask: &GrayImage,
        config: &TilingConfig,
    ) -> Result<()> {
        let tile_path = layout.tile_path(index);
        let mask_path = layout.mask_path(index);
        debug!(index, tile = %tile_path.display(), "Writing tile and mask");

        JpegEncoder::new_with_quality(create(&tile_path)?, config.jpeg_quality)
            .write_image(tile.as_raw(), tile.width(), tile.height(), ExtendedColorType::Rgb8)
            .map_err(|e| TilingError::IoFailure(format!("{}: {}", tile_path.display(), e)))?;

        PngEncoder::new(create(&mask_path)?)
            .write_image(mask.as_raw(), mask.width(), mask.height(), ExtendedColorType::L8)
            .map_err(|e| TilingError::IoFailure(format!("{}: {}", mask_path.display(), e)))?;

        Ok(())
    }
}
