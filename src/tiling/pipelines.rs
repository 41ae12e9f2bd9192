//! Pipeline orchestration module
//!
//! Single-slide tiling and the batch loop built on top of it.

mod slide_tiling;
mod batch;
mod cancellation;

#[cfg(test)]
mod tests;

pub use slide_tiling::{SlideTilingPipeline, slide_stem};
pub use batch::{BatchOptions, BatchPipeline};
pub use cancellation::CancellationToken;
