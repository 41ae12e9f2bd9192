use crate::tiling::common::error::Result;
use crate::tiling::slide::image_reader::ImageSlideReader;
use crate::tiling::slide::reader::SlideReader;
use crate::tiling::slide::tiff_reader::TiffSlideReader;
use crate::tiling::slide::types::SlideRaster;

const TIFF_LE_MAGIC: [u8; 4] = [b'I', b'I', 42, 0];
const TIFF_BE_MAGIC: [u8; 4] = [b'M', b'M', 0, 42];
const BIGTIFF_LE_MAGIC: [u8; 4] = [b'I', b'I', 43, 0];
const BIGTIFF_BE_MAGIC: [u8; 4] = [b'M', b'M', 0, 43];

/// Picks the TIFF reader for TIFF-based slides (.tif, .svs, .ndpi, ...) and
/// the generic image reader for everything else.
pub struct AutoSlideReader;

pub(crate) fn is_tiff(data: &[u8]) -> bool {
    [TIFF_LE_MAGIC, TIFF_BE_MAGIC, BIGTIFF_LE_MAGIC, BIGTIFF_BE_MAGIC]
        .iter()
        .any(|magic| data.starts_with(magic))
}

impl SlideReader for AutoSlideReader {
    fn read_slide(&self, data: &[u8]) -> Result<SlideRaster> {
        if is_tiff(data) {
            TiffSlideReader.read_slide(data)
        } else {
            ImageSlideReader.read_slide(data)
        }
    }
}
