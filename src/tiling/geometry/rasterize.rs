//! Mask rasterization.
//!
//! Even-odd scanline fill over integer vertices, sampled at pixel centers,
//! followed by tracing every edge so that boundary pixels are always set.
//! Only exterior rings reach this module.

use image::{GrayImage, Luma};

use crate::tiling::geometry::intersect::LocalPolygon;

/// Builds a `tile_size` square mask from tile-local polygon pieces.
pub fn rasterize_mask(
    tile_size: u32,
    background_value: u8,
    mask_value: u8,
    pieces: &[LocalPolygon],
) -> GrayImage {
    let mut mask = GrayImage::from_pixel(tile_size, tile_size, Luma([background_value]));
    for piece in pieces {
        fill_polygon(&mut mask, &piece.vertices, mask_value);
    }
    mask
}

/// Fills the polygon described by `vertices`, boundary included. Pixels outside
/// the canvas are ignored.
pub fn fill_polygon(mask: &mut GrayImage, vertices: &[(i32, i32)], value: u8) {
    let ring = match vertices {
        [first, .., last] if first == last => &vertices[..vertices.len() - 1],
        _ => vertices,
    };
    if ring.is_empty() {
        return;
    }

    let width = mask.width() as i64;
    let height = mask.height() as i64;

    let y_min = ring.iter().map(|p| p.1 as i64).min().unwrap_or(0).max(0);
    let y_max = ring.iter().map(|p| p.1 as i64).max().unwrap_or(-1).min(height - 1);

    let mut crossings: Vec<f64> = Vec::with_capacity(ring.len());
    for y in y_min..=y_max {
        crossings.clear();
        for (i, &(x0, y0)) in ring.iter().enumerate() {
            let (x1, y1) = ring[(i + 1) % ring.len()];
            let (x0, y0, x1, y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
            // Half-open in y so a shared vertex is counted once
            if (y0 <= y && y < y1) || (y1 <= y && y < y0) {
                let t = (y - y0) as f64 / (y1 - y0) as f64;
                crossings.push(x0 as f64 + t * (x1 - x0) as f64);
            }
        }
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            let start = (span[0].ceil() as i64).max(0);
            let end = (span[1].floor() as i64).min(width - 1);
            for x in start..=end {
                mask.put_pixel(x as u32, y as u32, Luma([value]));
            }
        }
    }

    for (i, &start) in ring.iter().enumerate() {
        let end = ring[(i + 1) % ring.len()];
        draw_edge(mask, start, end, value);
    }
}

/// Bresenham line, both endpoints included.
fn draw_edge(mask: &mut GrayImage, from: (i32, i32), to: (i32, i32), value: u8) {
    let (mut x, mut y) = (from.0 as i64, from.1 as i64);
    let (x1, y1) = (to.0 as i64, to.1 as i64);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let (width, height) = (mask.width() as i64, mask.height() as i64);
    loop {
        if (0..width).contains(&x) && (0..height).contains(&y) {
            mask.put_pixel(x as u32, y as u32, Luma([value]));
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
