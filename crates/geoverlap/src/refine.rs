use std::cmp::Ordering;

use ahash::AHashSet;
use geo::{Area, Buffer, ConvexHull, Coord, Geometry, InteriorPoint};
use tracing::{debug, warn};

use crate::{overlapping_indices, split_by_indices, Boundary, GeometryKind, MetricFrame, Spatial, Split};

/// Upper bound on buffer refinement steps. Each step halves the search
/// interval, so the radius is resolved to `max_buffer_size / 128`.
pub const MAX_BUFFER_ITERATIONS: usize = 7;

/// Options for [`split_overlapping`].
///
/// With `expected_count == 0` only exact overlap is used. Otherwise the
/// reference may be replaced by its convex hull and then buffered, looking
/// for a candidate set whose weighted count reaches `expected_count` without
/// going over it.
pub struct SplitOptions<'a, T> {
    /// Approximate weighted count the overlapping side should reach.
    pub expected_count: u32,
    /// Weight of one candidate. Every candidate counts as 1 when unset.
    pub feature_count: Option<&'a dyn Fn(&T) -> u32>,
    pub allow_convex: bool,
    pub allow_buffer: bool,
    /// Largest buffer radius to try, in meters. Derived from the reference
    /// and the candidates with [`max_buffer_size`] when unset or not positive.
    pub max_buffer_size: Option<f64>,
    pub boundary: Boundary,
}

impl<T> Default for SplitOptions<'_, T> {
    fn default() -> Self {
        Self {
            expected_count: 0,
            feature_count: None,
            allow_convex: true,
            allow_buffer: true,
            max_buffer_size: None,
            boundary: Boundary::Include,
        }
    }
}

impl<'a, T> SplitOptions<'a, T> {
    /// Options targeting `count`, with convex hull and buffering enabled.
    pub fn expecting(count: u32) -> Self {
        Self { expected_count: count, ..Self::default() }
    }

    pub fn with_feature_count(mut self, count: &'a dyn Fn(&T) -> u32) -> Self {
        self.feature_count = Some(count);
        self
    }

    pub fn with_convex(mut self, allow: bool) -> Self {
        self.allow_convex = allow;
        self
    }

    pub fn with_buffer(mut self, allow: bool) -> Self {
        self.allow_buffer = allow;
        self
    }

    pub fn with_max_buffer_size(mut self, meters: f64) -> Self {
        self.max_buffer_size = Some(meters);
        self
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    #[inline]
    fn count(&self, feature: &T) -> u32 {
        self.feature_count.map_or(1, |count| count(feature))
    }
}

/// Sum of `count` over the features at `indices`.
pub fn weighted_count<T>(features: &[T], indices: &[usize], count: impl Fn(&T) -> u32) -> u32 {
    indices.iter().fold(0u32, |total, &index| total.saturating_add(count(&features[index])))
}

/// Split `features` between those overlapping `reference` and the others.
///
/// Each feature ends up in exactly one of the two lists. When
/// `options.expected_count` is positive, the overlapping side never weighs
/// more than the expected count unless exact overlap alone already does.
pub fn split_overlapping<T: Spatial>(reference: &Geometry<f64>, features: Vec<T>, options: &SplitOptions<'_, T>) -> Split<T> {
    if GeometryKind::of(reference) == GeometryKind::GeometryCollection {
        warn!("split_overlapping does not process geometries of type GeometryCollection");
        return Split { overlapping: Vec::new(), not_overlapping: features };
    }

    let indices = refined_indices(reference, &features, options);
    split_by_indices(features, &indices)
}

fn refined_indices<T: Spatial>(reference: &Geometry<f64>, features: &[T], options: &SplitOptions<'_, T>) -> Vec<usize> {
    let expected = options.expected_count;
    let baseline = overlapping_indices(reference, features, options.boundary);
    if expected == 0 { return baseline }

    let count = |indices: &[usize]| weighted_count(features, indices, |feature| options.count(feature));
    let baseline_count = count(&baseline);
    if baseline_count >= expected || !(options.allow_convex || options.allow_buffer) { return baseline }

    // Growing the reference never loses candidates, so a set no larger than
    // the baseline weighs the same as the baseline.
    let grown_count = |indices: &[usize]| {
        if indices.len() > baseline.len() { count(indices) } else { baseline_count }
    };

    let mut convex = baseline.clone();
    if options.allow_convex {
        if let Some(hull) = convex_indices(reference, features, options.boundary) {
            let hull_count = grown_count(&hull);
            debug!(expected, baseline = baseline_count, convex = hull_count, "convex hull attempt");
            match hull_count.cmp(&expected) {
                Ordering::Equal => return hull,
                Ordering::Less => convex = hull,
                Ordering::Greater => {}
            }
        }
    }
    if !options.allow_buffer { return convex }

    let max_buffer = options.max_buffer_size
        .filter(|meters| *meters > 0.0)
        .unwrap_or_else(|| max_buffer_size(reference, features));
    let buffered = buffer_indices(reference, features, options, max_buffer, &baseline, baseline_count);
    let buffered_count = grown_count(&buffered);
    debug!(expected, max_buffer, buffered = buffered_count, "buffer attempt");
    if buffered_count == expected { return buffered }

    let seen = buffered.iter().copied().collect::<AHashSet<_>>();
    let mut combined = buffered.clone();
    combined.extend(convex.iter().copied().filter(|index| !seen.contains(index)));
    if grown_count(&combined) <= expected { combined } else { buffered }
}

/// Candidates overlapping the convex hull of an areal reference. `None` for
/// non-areal references and degenerate hulls.
fn convex_indices<T: Spatial>(reference: &Geometry<f64>, features: &[T], boundary: Boundary) -> Option<Vec<usize>> {
    let hull = match reference {
        Geometry::Polygon(polygon) => polygon.convex_hull(),
        Geometry::MultiPolygon(polygons) => polygons.convex_hull(),
        Geometry::Rect(rect) => rect.to_polygon(),
        Geometry::Triangle(triangle) => triangle.to_polygon(),
        _ => return None,
    };

    let area = hull.unsigned_area();
    if !area.is_finite() || area <= 0.0 {
        debug!("skipping degenerate convex hull");
        return None;
    }
    Some(overlapping_indices(&Geometry::Polygon(hull), features, boundary))
}

/// Bounded bisection on the buffer radius: grow while under the expected
/// count, shrink while over, keep the best set that does not exceed it.
fn buffer_indices<T: Spatial>(
    reference: &Geometry<f64>,
    features: &[T],
    options: &SplitOptions<'_, T>,
    max_buffer: f64,
    baseline: &[usize],
    baseline_count: u32,
) -> Vec<usize> {
    let expected = options.expected_count;
    let Some((frame, metric_reference)) = metric_frame(reference) else { return baseline.to_vec() };

    let mut best = baseline.to_vec();
    let mut best_count = baseline_count;
    let mut last_count = baseline_count;
    let (mut step, mut radius) = (max_buffer, 0.0);

    for iteration in 0..MAX_BUFFER_ITERATIONS {
        if best_count == expected { break }

        step /= 2.0;
        radius = if last_count < expected { radius + step } else { radius - step };
        let Some(buffered) = buffer_geometry(&frame, &metric_reference, radius) else { break };

        let indices = overlapping_indices(&buffered, features, options.boundary);
        last_count = if indices.len() > best.len() {
            weighted_count(features, &indices, |feature| options.count(feature))
        } else {
            best_count
        };
        debug!(iteration, radius, count = last_count, "buffer step");

        if last_count <= expected && last_count > best_count {
            best = indices;
            best_count = last_count;
        }
    }
    best
}

/// Default largest buffer radius, in meters, for `reference`.
///
/// Starts from the square root of the reference area. With several
/// candidates, it is tightened to the smallest distance between the
/// representative points of the candidates found within that first radius,
/// floored at 1 m, so buffering stops short of swallowing neighbours.
pub fn max_buffer_size<T: Spatial>(reference: &Geometry<f64>, features: &[T]) -> f64 {
    let Some((frame, metric_reference)) = metric_frame(reference) else { return 1.0 };

    let default_size = metric_reference.unsigned_area().sqrt();
    if features.len() <= 1 { return default_size }

    let Some(buffered) = buffer_geometry(&frame, &metric_reference, default_size) else { return default_size };
    let nearby = overlapping_indices(&buffered, features, Boundary::Include)
        .into_iter()
        .filter_map(|index| features[index].geometry().interior_point())
        .filter_map(|point| frame.forward(point.0).ok())
        .collect::<Vec<Coord<f64>>>();

    let mut min_distance = default_size;
    for (i, a) in nearby.iter().enumerate() {
        for b in &nearby[i + 1..] {
            min_distance = min_distance.min((a.x - b.x).hypot(a.y - b.y));
        }
    }
    min_distance.floor().max(1.0)
}

fn metric_frame(reference: &Geometry<f64>) -> Option<(MetricFrame, Geometry<f64>)> {
    let projected = MetricFrame::centered_on(reference)
        .and_then(|frame| frame.to_metric(reference).map(|metric| (frame, metric)));
    match projected {
        Ok(projected) => Some(projected),
        Err(e) => {
            debug!(error = %e, "cannot express reference in meters");
            None
        }
    }
}

/// Buffer a reference already expressed in `frame` and bring it back to
/// lon/lat. `None` when the buffer collapses to nothing.
fn buffer_geometry(frame: &MetricFrame, metric_reference: &Geometry<f64>, radius: f64) -> Option<Geometry<f64>> {
    let buffered = metric_reference.buffer(radius);
    if buffered.0.is_empty() { return None }
    frame.to_geographic(&Geometry::MultiPolygon(buffered)).ok()
}
