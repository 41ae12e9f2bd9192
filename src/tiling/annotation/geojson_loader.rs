use std::path::Path;

use geo::{Geometry, LineString};
use geojson::GeoJson;
use tracing::{debug, info};

use crate::tiling::annotation::types::Annotation;
use crate::tiling::common::error::{Result, TilingError};

/// Loads every annotation from a GeoJSON file.
pub fn load_geojson<P: AsRef<Path>>(path: P) -> Result<Vec<Annotation>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        TilingError::AnnotationLoadError(format!("{}: {}", path.display(), e))
    })?;

    let annotations = parse_geojson(&text).map_err(|e| match e {
        TilingError::AnnotationLoadError(reason) => {
            TilingError::AnnotationLoadError(format!("{}: {}", path.display(), reason))
        }
        other => other,
    })?;

    info!(
        path = %path.display(),
        "Loaded {} annotations from GeoJSON",
        annotations.len()
    );
    Ok(annotations)
}

/// Parses a FeatureCollection, a single Feature or a bare Geometry.
///
/// Every geometry becomes one annotation, multi-geometries one per member.
/// Features without geometry are skipped.
pub fn parse_geojson(text: &str) -> Result<Vec<Annotation>> {
    let parsed: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| TilingError::AnnotationLoadError(e.to_string()))?;

    let geometries: Vec<geojson::Geometry> = match parsed {
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .filter_map(|feature| feature.geometry)
            .collect(),
        GeoJson::Feature(feature) => feature.geometry.into_iter().collect(),
        GeoJson::Geometry(geometry) => vec![geometry],
    };

    let mut annotations = Vec::new();
    for geometry in geometries {
        let geometry = Geometry::<f64>::try_from(geometry)
            .map_err(|e| TilingError::AnnotationLoadError(e.to_string()))?;
        collect_annotations(geometry, &mut annotations);
    }

    let areas = annotations.iter().filter(|a| a.polygon().is_some()).count();
    debug!(
        markers = annotations.len() - areas,
        "Parsed {} polygon annotations",
        areas
    );
    Ok(annotations)
}

fn collect_annotations(geometry: Geometry<f64>, out: &mut Vec<Annotation>) {
    match geometry {
        Geometry::Polygon(polygon) => out.push(polygon.into()),
        Geometry::MultiPolygon(multi) => out.extend(multi.0.into_iter().map(Annotation::from)),
        Geometry::Rect(rect) => out.push(rect.to_polygon().into()),
        Geometry::Triangle(triangle) => out.push(triangle.to_polygon().into()),
        Geometry::Point(point) => out.push(Annotation::point(point)),
        Geometry::MultiPoint(multi) => out.extend(multi.0.into_iter().map(Annotation::point)),
        Geometry::Line(line) => out.push(Annotation::path(LineString::from(line))),
        Geometry::LineString(line) => out.push(Annotation::path(line)),
        Geometry::MultiLineString(multi) => out.extend(multi.0.into_iter().map(Annotation::path)),
        Geometry::GeometryCollection(collection) => {
            for inner in collection.0 {
                collect_annotations(inner, out);
            }
        }
    }
}
