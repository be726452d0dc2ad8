//! Overlap engine for lon/lat features.
//!
//! Decides which candidate features overlap a reference feature and splits
//! candidate lists accordingly. When an approximate expected count is known,
//! [`split_overlapping`] grows the reference (convex hull, then buffering in
//! meters) until the weighted overlap count gets as close as possible to the
//! target without exceeding it.
pub mod finder;
pub mod kind;
pub mod metric;
pub mod predicate;
pub mod refine;
pub mod split;

use geo::Geometry;

pub use finder::{find_overlapping, overlapping_indices, try_overlap};
pub use kind::GeometryKind;
pub use metric::{MetricFrame, ProjectionError};
pub use predicate::{point_overlaps, Boundary};
pub use refine::{max_buffer_size, split_overlapping, weighted_count, SplitOptions};
pub use split::{split_by_indices, Split};

/// Anything that carries a lon/lat geometry.
pub trait Spatial {
    fn geometry(&self) -> &Geometry<f64>;

    #[inline] fn kind(&self) -> GeometryKind { GeometryKind::of(self.geometry()) }
}

impl Spatial for Geometry<f64> {
    #[inline] fn geometry(&self) -> &Geometry<f64> { self }
}

impl<T: Spatial + ?Sized> Spatial for &T {
    #[inline] fn geometry(&self) -> &Geometry<f64> { (**self).geometry() }
}
