//! Slide discovery and slide-to-annotation pairing.
//!
//! A GeoJSON file belongs to a slide when both file names share a prefix whose
//! length depends on the slide naming scheme.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::tiling::common::error::Result;

pub const DEFAULT_SLIDE_EXTENSIONS: &[&str] = &[
    ".tif", ".tiff", ".svs", ".ndpi", ".scn", ".mrxs", ".jpg", ".png",
];

const GEOJSON_EXTENSION: &str = "geojson";

/// Number of leading characters compared when pairing a slide name.
///
/// `DR...` slides match on 5 characters, `B...` slides on 8, anything else on 5.
pub fn prefix_length(slide_name: &str) -> usize {
    if slide_name.starts_with("DR") {
        5
    } else if slide_name.starts_with('B') {
        8
    } else {
        5
    }
}

/// First `len` characters of `name`, or all of it when shorter.
fn name_prefix(name: &str, len: usize) -> &str {
    match name.char_indices().nth(len) {
        Some((end, _)) => &name[..end],
        None => name,
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// Finds the GeoJSON file in `geojson_dir` paired with `slide_path`.
///
/// Candidates are compared in sorted order; the first match wins.
pub fn find_matching_geojson(slide_path: &Path, geojson_dir: &Path) -> Result<Option<PathBuf>> {
    let Some(slide_name) = file_name(slide_path) else {
        return Ok(None);
    };
    let len = prefix_length(slide_name);
    let slide_prefix = name_prefix(slide_name, len);

    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(geojson_dir)? {
        let path = entry?.path();
        let is_geojson = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(GEOJSON_EXTENSION));
        if is_geojson && path.is_file() {
            candidates.push(path);
        }
    }
    candidates.sort();

    for candidate in candidates {
        let Some(candidate_name) = file_name(&candidate) else {
            continue;
        };
        if name_prefix(candidate_name, len) == slide_prefix {
            info!(
                slide = slide_name,
                geojson = candidate_name,
                prefix = slide_prefix,
                length = len,
                "Matched slide with GeoJSON"
            );
            return Ok(Some(candidate));
        }
    }

    debug!(slide = slide_name, prefix = slide_prefix, "No GeoJSON match");
    Ok(None)
}

/// Lists slide files in `slides_dir` with one of `extensions`, sorted and
/// deduplicated. Extensions compare case-insensitively.
pub fn discover_slides(slides_dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let extensions: Vec<String> = extensions.iter().map(|ext| ext.to_ascii_lowercase()).collect();

    let mut slides = BTreeSet::new();
    for entry in std::fs::read_dir(slides_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = file_name(&path) else {
            continue;
        };
        let name = name.to_ascii_lowercase();
        if extensions.iter().any(|ext| name.ends_with(ext.as_str())) {
            slides.insert(path);
        }
    }

    Ok(slides.into_iter().collect())
}
