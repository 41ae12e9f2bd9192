//! Slide tiling pipeline module
//!
//! Turns a slide image and its polygon annotations into fixed-size tiles and
//! matching binary masks, with separate modules for slide reading, annotation
//! loading, geometry, output writing and orchestration.

pub mod annotation;
pub mod common;
pub mod config;
pub mod extract;
pub mod geometry;
pub mod grid;
pub mod output;
pub mod pipelines;
pub mod progress;
pub mod slide;
pub mod stats;

pub use common::{
    Result,
    TilingError,
};

pub use annotation::{
    Annotation,
    load_geojson,
    parse_geojson,
};

pub use config::{
    TilingConfig,
    TilingConfigBuilder,
};

pub use geometry::{
    Intersection,
    LocalPolygon,
};

pub use grid::{
    TileCell,
    TileGrid,
};

pub use slide::{
    SlideRaster,
    SlideReader,
    AutoSlideReader,
    TiffSlideReader,
    ImageSlideReader,
};

pub use output::{
    OutputLayout,
    TileWriter,
    StandardTileWriter,
};

pub use pipelines::{
    BatchOptions,
    BatchPipeline,
    CancellationToken,
    SlideTilingPipeline,
};

pub use progress::{
    LogProgress,
    NoProgress,
    ProgressEvent,
    ProgressSink,
};

pub use stats::{
    BatchStats,
    SlideStats,
};
