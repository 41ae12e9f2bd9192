//! Tile extraction
//!
//! Copies a cell's pixels into the top-left corner of a black `tile_size`
//! square, so border tiles come out padded with `(0, 0, 0)`.

use image::{RgbImage, imageops};

use crate::tiling::grid::TileCell;
use crate::tiling::slide::types::SlideRaster;

pub fn extract_tile(slide: &SlideRaster, cell: &TileCell, tile_size: u32) -> RgbImage {
    let mut tile = RgbImage::new(tile_size, tile_size);

    let region = imageops::crop_imm(
        slide.pixels(),
        cell.x_start,
        cell.y_start,
        cell.width().min(tile_size),
        cell.height().min(tile_size),
    )
    .to_image();
    imageops::replace(&mut tile, &region, 0, 0);

    tile
}
