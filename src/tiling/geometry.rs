//! Geometry module
//!
//! Clips annotations against tile cells and rasterizes the clipped pieces into
//! tile masks.

mod intersect;
mod rasterize;

pub use intersect::{Intersection, LocalPolygon, intersect_annotation};
pub use rasterize::{fill_polygon, rasterize_mask};
