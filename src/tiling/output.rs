//! Tile output module
//!
//! Writes tile images and masks into the per-slide dataset layout.

mod writer;
mod standard_tile_writer;
pub mod layout;

pub use writer::TileWriter;
pub use standard_tile_writer::StandardTileWriter;
pub use layout::OutputLayout;
