//! Annotation types

use geo::{BoundingRect, Coord, Intersects, LineString, Point, Polygon, Rect};

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Area(Polygon<f64>),
    Point(Point<f64>),
    Path(LineString<f64>),
}

/// One annotation in slide pixel coordinates.
///
/// Polygons are the only shapes that reach the mask. Points and paths still
/// mark the tiles they touch as annotated.
///
/// Interior rings are kept for clipping but never subtracted when the mask is
/// filled, so a donut-shaped annotation marks its hole too.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    shape: Shape,
    bounds: Option<Rect<f64>>,
}

impl Annotation {
    pub fn new(polygon: Polygon<f64>) -> Self {
        let bounds = polygon.bounding_rect();
        Self {
            shape: Shape::Area(polygon),
            bounds,
        }
    }

    pub fn point(point: Point<f64>) -> Self {
        Self {
            bounds: Some(point.bounding_rect()),
            shape: Shape::Point(point),
        }
    }

    pub fn path(line: LineString<f64>) -> Self {
        Self {
            bounds: line.bounding_rect(),
            shape: Shape::Path(line),
        }
    }

    /// Builds an annotation from an exterior ring; the ring is closed if needed.
    pub fn from_exterior(points: &[(f64, f64)]) -> Self {
        let ring: LineString<f64> = points.iter().map(|&(x, y)| Coord { x, y }).collect();
        Self::new(Polygon::new(ring, Vec::new()))
    }

    /// The polygon for areal annotations, `None` for points and paths.
    pub fn polygon(&self) -> Option<&Polygon<f64>> {
        match &self.shape {
            Shape::Area(polygon) => Some(polygon),
            _ => None,
        }
    }

    /// Whether the shape touches `rect`, boundary contact included.
    pub(crate) fn touches(&self, rect: &Rect<f64>) -> bool {
        let cell = rect.to_polygon();
        match &self.shape {
            Shape::Area(polygon) => polygon.intersects(&cell),
            Shape::Point(point) => point.intersects(&cell),
            Shape::Path(line) => line.intersects(&cell),
        }
    }

    /// Axis-aligned bounds, `None` for a shape without vertices.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.bounds
    }
}

impl From<Polygon<f64>> for Annotation {
    fn from(polygon: Polygon<f64>) -> Self {
        Self::new(polygon)
    }
}
