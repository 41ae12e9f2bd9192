//! Slide reading module
//!
//! Decodes slide images into 8-bit RGB rasters. Grayscale and alpha sources are
//! normalized here so the tiling core only ever sees three channels.

mod reader;
mod tiff_reader;
mod image_reader;
mod auto_reader;
pub mod types;

pub use reader::SlideReader;
pub use tiff_reader::TiffSlideReader;
pub use image_reader::ImageSlideReader;
pub use auto_reader::AutoSlideReader;
pub use types::SlideRaster;
