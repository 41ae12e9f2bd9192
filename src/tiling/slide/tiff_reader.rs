//! Slide reader implementation using the tiff library.
//!
//! Whole-slide formats such as SVS and NDPI are TIFF containers; the first
//! image directory holds the full-resolution level, which is what gets tiled.

use std::io::Cursor;

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tracing::debug;

use crate::tiling::common::error::{Result, TilingError};
use crate::tiling::slide::reader::SlideReader;
use crate::tiling::slide::types::SlideRaster;

/// Slide reader that decodes TIFF-based slides into 8-bit RGB.
///
/// Supported layouts:
/// - Gray, RGB and RGBA
/// - 8 or 16 bits per sample (16-bit samples keep their high byte)
pub struct TiffSlideReader;

impl SlideReader for TiffSlideReader {
    fn read_slide(&self, data: &[u8]) -> Result<SlideRaster> {
        debug!("Decoding TIFF slide, {} bytes", data.len());

        let mut decoder = Decoder::new(Cursor::new(data))
            .map_err(|e| TilingError::DecodeFailure(e.to_string()))?
            .with_limits(Limits::unlimited());

        let (width, height) = decoder
            .dimensions()
            .map_err(|e| TilingError::DecodeFailure(e.to_string()))?;
        let color_type = decoder
            .colortype()
            .map_err(|e| TilingError::DecodeFailure(e.to_string()))?;

        debug!("Decoded TIFF header: {}x{} {:?}", width, height, color_type);

        let channels = match color_type {
            ColorType::Gray(8 | 16) => 1,
            ColorType::RGB(8 | 16) => 3,
            ColorType::RGBA(8 | 16) => 4,
            other => {
                return Err(TilingError::DecodeFailure(format!(
                    "unsupported TIFF color type {:?}",
                    other
                )));
            }
        };

        let samples: Vec<u8> = match decoder
            .read_image()
            .map_err(|e| TilingError::DecodeFailure(e.to_string()))?
        {
            DecodingResult::U8(values) => values,
            // Keep the most significant byte of each 16-bit sample
            DecodingResult::U16(values) => values.iter().map(|&v| (v >> 8) as u8).collect(),
            _ => {
                return Err(TilingError::DecodeFailure(
                    "unsupported TIFF sample format".to_string(),
                ));
            }
        };

        let pixel_count = width as usize * height as usize;
        if samples.len() < pixel_count * channels {
            return Err(TilingError::DecodeFailure(format!(
                "TIFF holds {} samples, expected {}",
                samples.len(),
                pixel_count * channels
            )));
        }

        let rgb = to_rgb8(&samples[..pixel_count * channels], channels);
        if channels != 3 {
            debug!("Normalized {}-channel slide to RGB", channels);
        }

        SlideRaster::from_rgb8(width, height, rgb)
    }
}

fn to_rgb8(samples: &[u8], channels: usize) -> Vec<u8> {
    match channels {
        1 => samples.iter().flat_map(|&v| [v, v, v]).collect(),
        3 => samples.to_vec(),
        _ => samples
            .chunks_exact(channels)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect(),
    }
}
