//! Annotation module
//!
//! Annotations in slide pixel space, their GeoJSON source, and the
//! filename rule pairing a slide with its annotation file.

mod geojson_loader;
mod matching;
pub mod types;

pub use geojson_loader::{load_geojson, parse_geojson};
pub use matching::{find_matching_geojson, discover_slides, prefix_length, DEFAULT_SLIDE_EXTENSIONS};
pub use types::Annotation;
