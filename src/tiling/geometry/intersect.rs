//! Annotation / tile-cell intersection.
//!
//! Pieces are returned in tile-local pixel coordinates: the cell origin is
//! subtracted and each coordinate is truncated toward zero.

use geo::{Area, BooleanOps, Coord, Intersects, Polygon, Rect};

use crate::tiling::annotation::types::Annotation;
use crate::tiling::grid::TileCell;

/// Exterior ring of one clipped piece, in tile-local integer coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPolygon {
    pub vertices: Vec<(i32, i32)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intersection {
    Empty,
    Single(LocalPolygon),
    Multi(Vec<LocalPolygon>),
}

impl Intersection {
    fn from_pieces(mut pieces: Vec<LocalPolygon>) -> Self {
        match pieces.len() {
            0 => Intersection::Empty,
            1 => Intersection::Single(pieces.remove(0)),
            _ => Intersection::Multi(pieces),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Intersection::Empty)
    }

    pub fn into_pieces(self) -> Vec<LocalPolygon> {
        match self {
            Intersection::Empty => Vec::new(),
            Intersection::Single(piece) => vec![piece],
            Intersection::Multi(pieces) => pieces,
        }
    }
}

/// Largest distance at which a clipped coordinate is pulled back onto an input
/// vertex or cell border. The boolean clipper rounds through an integer grid.
const SNAP_TOLERANCE: f64 = 1e-4;

fn contains_rect(outer: &Rect<f64>, inner: &Rect<f64>) -> bool {
    inner.min().x >= outer.min().x
        && inner.min().y >= outer.min().y
        && inner.max().x <= outer.max().x
        && inner.max().y <= outer.max().y
}

/// Exact coordinates a clipped vertex may have come from, per axis.
struct SnapTargets {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl SnapTargets {
    fn new(polygon: &Polygon<f64>, cell: &Rect<f64>) -> Self {
        let coords = polygon
            .exterior()
            .coords()
            .chain(polygon.interiors().iter().flat_map(|ring| ring.coords()));
        let (mut xs, mut ys): (Vec<f64>, Vec<f64>) = coords.map(|c| (c.x, c.y)).unzip();
        xs.extend([cell.min().x, cell.max().x]);
        ys.extend([cell.min().y, cell.max().y]);

        for axis in [&mut xs, &mut ys] {
            axis.sort_by(f64::total_cmp);
            axis.dedup();
        }
        Self { xs, ys }
    }

    fn snap(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: snap_axis(c.x, &self.xs),
            y: snap_axis(c.y, &self.ys),
        }
    }
}

fn snap_axis(value: f64, targets: &[f64]) -> f64 {
    let split = targets.partition_point(|&t| t < value);
    let below = split.checked_sub(1).and_then(|i| targets.get(i));
    let above = targets.get(split);

    [below, above]
        .into_iter()
        .flatten()
        .copied()
        .filter(|t| (t - value).abs() <= SNAP_TOLERANCE)
        .min_by(|a, b| (a - value).abs().total_cmp(&(b - value).abs()))
        .unwrap_or(value)
}

fn localize<I: IntoIterator<Item = Coord<f64>>>(coords: I, cell: &TileCell) -> LocalPolygon {
    let origin = Coord {
        x: cell.x_start as f64,
        y: cell.y_start as f64,
    };
    LocalPolygon {
        vertices: coords
            .into_iter()
            .map(|c| ((c.x - origin.x) as i32, (c.y - origin.y) as i32))
            .collect(),
    }
}

/// Clips `annotation` to `cell`.
///
/// The flag reports whether the two touch at all, which includes contact
/// along an edge or at a corner. Such contact yields no fillable piece, so the
/// flag can be true while the intersection is `Empty`. Points and paths only
/// ever set the flag.
pub fn intersect_annotation(annotation: &Annotation, cell: &TileCell) -> (bool, Intersection) {
    let Some(bounds) = annotation.bounds() else {
        return (false, Intersection::Empty);
    };
    let cell_rect = cell.rect();
    if !bounds.intersects(&cell_rect) {
        return (false, Intersection::Empty);
    }

    let Some(polygon) = annotation.polygon() else {
        return (annotation.touches(&cell_rect), Intersection::Empty);
    };
    if contains_rect(&cell_rect, &bounds) && polygon.unsigned_area() > 0.0 {
        return (
            true,
            Intersection::Single(localize(polygon.exterior().coords().copied(), cell)),
        );
    }

    if !annotation.touches(&cell_rect) {
        return (false, Intersection::Empty);
    }

    let targets = SnapTargets::new(polygon, &cell_rect);
    let clipped = polygon.intersection(&cell_rect.to_polygon());
    let pieces = clipped
        .0
        .iter()
        .filter(|piece| piece.unsigned_area() > 0.0)
        .map(|piece| localize(piece.exterior().coords().map(|&c| targets.snap(c)), cell))
        .collect();

    (true, Intersection::from_pieces(pieces))
}
