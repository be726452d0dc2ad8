use geo::{CoordsIter, Geometry, HasDimensions, LineString, Polygon, Relate};
use tracing::{trace, warn};

use crate::{point_overlaps, Boundary, GeometryKind, Spatial};

/// Overlap test for a non-point candidate.
///
/// Returns `None` when the pair cannot be evaluated: either side is a
/// GeometryCollection, empty, has non-finite coordinates, or has a degenerate
/// line or ring. Callers decide what an unsupported pair means; the finder
/// treats it as "no overlap".
pub fn try_overlap(reference: &Geometry<f64>, candidate: &Geometry<f64>) -> Option<bool> {
    if !is_supported(reference) || !is_supported(candidate) { return None }

    // Same-kind crossings, containment and touching all show up as a
    // non-disjoint relation.
    Some(reference.relate(candidate).is_intersects())
}

/// Indices of the `candidates` that overlap `reference`, in candidate order.
///
/// Point and MultiPoint candidates go through [`point_overlaps`]; everything
/// else through [`try_overlap`]. A GeometryCollection reference yields no
/// overlap at all.
pub fn overlapping_indices<T: Spatial>(reference: &Geometry<f64>, candidates: &[T], boundary: Boundary) -> Vec<usize> {
    if GeometryKind::of(reference) == GeometryKind::GeometryCollection {
        warn!("overlap search does not process geometries of type GeometryCollection");
        return Vec::new();
    }

    candidates.iter().enumerate()
        .filter_map(|(index, candidate)| {
            let overlaps = if candidate.kind().is_puntal() {
                point_overlaps(reference, candidate.geometry(), boundary)
            } else {
                try_overlap(reference, candidate.geometry()).unwrap_or_else(|| {
                    trace!(index, kind = %candidate.kind(), "skipping unsupported geometry pair");
                    false
                })
            };
            overlaps.then_some(index)
        })
        .collect()
}

/// Features overlapping `reference` or, with `invert`, those that do not.
pub fn find_overlapping<'a, T: Spatial>(reference: &Geometry<f64>, features: &'a [T], invert: bool) -> Vec<&'a T> {
    if GeometryKind::of(reference) == GeometryKind::GeometryCollection {
        warn!("find_overlapping does not process geometries of type GeometryCollection");
        return Vec::new();
    }

    let mut selected = vec![invert; features.len()];
    for index in overlapping_indices(reference, features, Boundary::Include) {
        selected[index] = !invert;
    }

    features.iter().zip(selected)
        .filter_map(|(feature, keep)| keep.then_some(feature))
        .collect()
}

fn is_supported(geometry: &Geometry<f64>) -> bool {
    if geometry.is_empty() { return false }
    if !geometry.coords_iter().all(|coord| coord.x.is_finite() && coord.y.is_finite()) { return false }

    match geometry {
        Geometry::GeometryCollection(_) => false,
        Geometry::LineString(line) => is_line(line),
        Geometry::MultiLineString(lines) => lines.iter().all(is_line),
        Geometry::Polygon(polygon) => is_polygon(polygon),
        Geometry::MultiPolygon(polygons) => polygons.iter().all(is_polygon),
        _ => true,
    }
}

#[inline] fn is_line(line: &LineString<f64>) -> bool { line.0.len() >= 2 }

#[inline] fn is_ring(ring: &LineString<f64>) -> bool { ring.0.len() >= 4 && ring.is_closed() }

#[inline]
fn is_polygon(polygon: &Polygon<f64>) -> bool {
    is_ring(polygon.exterior()) && polygon.interiors().iter().all(is_ring)
}
