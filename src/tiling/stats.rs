//! Per-slide and batch statistics.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::tiling::common::error::{Result, TilingError};

pub const SUMMARY_FILE_NAME: &str = "batch_processing_summary.csv";

/// Counts for one tiled slide. Serialized as one summary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideStats {
    pub filename: String,
    pub total_tiles: usize,
    pub tiles_with_annotations: usize,
    pub saved_tiles: usize,
    pub tiles_dir: PathBuf,
    pub masks_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub total_tiles: usize,
    pub tiles_with_annotations: usize,
    pub saved_tiles: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub slides_found: usize,
    pub processed: Vec<SlideStats>,
    pub skipped: usize,
    pub cancelled: bool,
}

impl BatchStats {
    pub fn record(&mut self, stats: SlideStats) {
        self.processed.push(stats);
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn totals(&self) -> Totals {
        self.processed.iter().fold(Totals::default(), |acc, s| Totals {
            total_tiles: acc.total_tiles + s.total_tiles,
            tiles_with_annotations: acc.tiles_with_annotations + s.tiles_with_annotations,
            saved_tiles: acc.saved_tiles + s.saved_tiles,
        })
    }

    pub fn log_summary(&self) {
        info!(
            found = self.slides_found,
            processed = self.processed.len(),
            skipped = self.skipped,
            cancelled = self.cancelled,
            "Batch processing summary"
        );
        for stats in &self.processed {
            info!(
                total = stats.total_tiles,
                annotated = stats.tiles_with_annotations,
                saved = stats.saved_tiles,
                "  {}",
                stats.filename
            );
        }
        let totals = self.totals();
        info!(
            total = totals.total_tiles,
            annotated = totals.tiles_with_annotations,
            saved = totals.saved_tiles,
            "Batch totals"
        );
    }

    /// Writes one CSV row per processed slide.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let to_io = |e: csv::Error| TilingError::IoFailure(format!("{}: {}", path.display(), e));

        let mut writer = csv::Writer::from_path(path).map_err(to_io)?;
        for stats in &self.processed {
            writer.serialize(stats).map_err(to_io)?;
        }
        writer
            .flush()
            .map_err(|e| TilingError::IoFailure(format!("{}: {}", path.display(), e)))?;

        info!(path = %path.display(), "Statistics saved");
        Ok(())
    }
}
