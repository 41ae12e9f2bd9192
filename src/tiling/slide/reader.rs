use crate::tiling::common::error::Result;
use crate::tiling::slide::types::SlideRaster;

pub trait SlideReader {
    fn read_slide(&self, data: &[u8]) -> Result<SlideRaster>;
}
