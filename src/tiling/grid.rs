//! Tile grid planning
//!
//! Splits a `width x height` slide into `tile_size` squares in row-major order.
//! Cells on the right and bottom border are clamped to the slide and may be
//! smaller than the nominal tile size.

use geo::{Coord, Rect};

use crate::tiling::common::error::{Result, TilingError};

/// One grid position and the slide pixels it covers, `[x_start, x_end)` by
/// `[y_start, y_end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCell {
    pub row: u32,
    pub col: u32,
    pub x_start: u32,
    pub y_start: u32,
    pub x_end: u32,
    pub y_end: u32,
}

impl TileCell {
    pub fn width(&self) -> u32 {
        self.x_end - self.x_start
    }

    pub fn height(&self) -> u32 {
        self.y_end - self.y_start
    }

    /// True for cells that need padding to reach `tile_size`.
    pub fn is_partial(&self, tile_size: u32) -> bool {
        self.width() < tile_size || self.height() < tile_size
    }

    /// The cell rectangle in slide coordinates.
    pub fn rect(&self) -> Rect<f64> {
        Rect::new(
            Coord {
                x: self.x_start as f64,
                y: self.y_start as f64,
            },
            Coord {
                x: self.x_end as f64,
                y: self.y_end as f64,
            },
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tile_size: u32,
    cols: u32,
    rows: u32,
}

impl TileGrid {
    pub fn plan(width: u32, height: u32, tile_size: u32) -> Result<Self> {
        if tile_size == 0 {
            return Err(TilingError::InvalidConfiguration(
                "tile_size must be positive".to_string(),
            ));
        }

        Ok(Self {
            width,
            height,
            tile_size,
            cols: width.div_ceil(tile_size),
            rows: height.div_ceil(tile_size),
        })
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn len(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<TileCell> {
        if row >= self.rows || col >= self.cols {
            return None;
        }

        let x_start = col * self.tile_size;
        let y_start = row * self.tile_size;
        Some(TileCell {
            row,
            col,
            x_start,
            y_start,
            x_end: x_start.saturating_add(self.tile_size).min(self.width),
            y_end: y_start.saturating_add(self.tile_size).min(self.height),
        })
    }

    /// Cells in row-major order: row 0 first, and column 0 first within a row.
    pub fn cells(&self) -> impl Iterator<Item = TileCell> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).filter_map(move |col| self.cell(row, col)))
    }
}
