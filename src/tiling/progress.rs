//! Progress reporting for the per-cell loop.

use tracing::info;

const DEFAULT_LOG_INTERVAL: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub cells_processed: usize,
    pub total_cells: usize,
    pub annotated_count: usize,
    pub saved_count: usize,
}

/// Receives one event after every processed cell.
pub trait ProgressSink {
    fn on_progress(&mut self, event: &ProgressEvent);
}

impl<F: FnMut(&ProgressEvent)> ProgressSink for F {
    fn on_progress(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

/// Logs every `interval` cells.
pub struct LogProgress {
    interval: usize,
}

impl LogProgress {
    pub fn every(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
        }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::every(DEFAULT_LOG_INTERVAL)
    }
}

impl ProgressSink for LogProgress {
    fn on_progress(&mut self, event: &ProgressEvent) {
        if event.cells_processed % self.interval == 0 {
            info!(
                annotated = event.annotated_count,
                saved = event.saved_count,
                "Processed {}/{} tiles",
                event.cells_processed,
                event.total_cells
            );
        }
    }
}

pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _event: &ProgressEvent) {}
}
