use image::{GrayImage, RgbImage};

use crate::tiling::common::error::Result;
use crate::tiling::config::TilingConfig;
use crate::tiling::output::layout::OutputLayout;

pub trait TileWriter {
    fn prepare(&self, layout: &OutputLayout) -> Result<()>;
    fn write_tile(
        &self,
        layout: &OutputLayout,
        index: usize,
        tile: &RgbImage,
        mask: &GrayImage,
        config: &TilingConfig,
    ) -> Result<()>;
}
