//! Ear-clipping triangulation of one sector boundary loop into a flat
//! triangle list.
//!
//! The polygon sizes seen in practice are tens of vertices per sector, so
//! the O(n²) ear search is fine; a monotone-polygon or constrained-Delaunay
//! triangulator could be swapped in behind [`triangulate`] without touching
//! callers.

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use glam::Vec2;
use log::warn;
use math::{GEOM_EPSILON, point_in_triangle, polygon_area, signed_area_2x};

/// Triangulate a single ordered polygon ring. Returns a flat triangle
/// list: `3*(N-2)` vertices for a simple N-gon, in the input's coordinate
/// space. Fewer than three input points, or a wholly degenerate ring,
/// yields an empty list, which is a normal "nothing to draw" result.
pub fn triangulate(points: &[Vec2]) -> Vec<Vec2> {
    #[cfg(feature = "hprof")]
    profile!("triangulate");

    if points.len() < 3 {
        return Vec::new();
    }

    // Normalise winding: ear tests below assume counter-clockwise.
    let mut ring: Vec<usize> = (0..points.len()).collect();
    if polygon_area(points) < 0.0 {
        ring.reverse();
    }

    let mut out = Vec::with_capacity((points.len() - 2) * 3);

    // Bounded iteration so malformed input cannot loop forever.
    let max_iterations = points.len() * points.len();
    let mut iterations = 0;

    while ring.len() > 3 && iterations < max_iterations {
        iterations += 1;

        // Among all valid ears prefer the one clipping the largest
        // triangle; it leaves fewer slivers behind.
        let mut ear: Option<(usize, f32)> = None;
        for i in 0..ring.len() {
            if !is_ear(points, &ring, i) {
                continue;
            }
            let area = corner_area(points, &ring, i);
            if ear.is_none_or(|(_, best)| area > best) {
                ear = Some((i, area));
            }
        }

        // No strict ear: the ring is degenerate or self-intersecting.
        // Clip the largest non-degenerate corner instead so malformed
        // input still produces something sensible.
        if ear.is_none() {
            for i in 0..ring.len() {
                let area = corner_area(points, &ring, i);
                if area < GEOM_EPSILON {
                    continue;
                }
                if ear.is_none_or(|(_, best)| area > best) {
                    ear = Some((i, area));
                }
            }
        }

        let Some((i, _)) = ear else {
            // Only zero-area corners remain.
            warn!("Degenerate polygon, triangulation stopped early");
            break;
        };

        let prev = if i == 0 { ring.len() - 1 } else { i - 1 };
        let next = (i + 1) % ring.len();
        out.push(points[ring[prev]]);
        out.push(points[ring[i]]);
        out.push(points[ring[next]]);
        ring.remove(i);
    }

    if ring.len() == 3 {
        out.push(points[ring[0]]);
        out.push(points[ring[1]]);
        out.push(points[ring[2]]);
    }

    out
}

/// A vertex is an ear when its corner is strictly convex and no other
/// remaining vertex lies inside the corner triangle.
fn is_ear(points: &[Vec2], ring: &[usize], i: usize) -> bool {
    let prev = if i == 0 { ring.len() - 1 } else { i - 1 };
    let next = (i + 1) % ring.len();

    let a = points[ring[prev]];
    let b = points[ring[i]];
    let c = points[ring[next]];

    if signed_area_2x(a, b, c) <= GEOM_EPSILON {
        return false;
    }

    for (j, &p) in ring.iter().enumerate() {
        if j == prev || j == i || j == next {
            continue;
        }
        if point_in_triangle(points[p], a, b, c) {
            return false;
        }
    }
    true
}

fn corner_area(points: &[Vec2], ring: &[usize], i: usize) -> f32 {
    let prev = if i == 0 { ring.len() - 1 } else { i - 1 };
    let next = (i + 1) % ring.len();
    signed_area_2x(points[ring[prev]], points[ring[i]], points[ring[next]]).abs()
}
