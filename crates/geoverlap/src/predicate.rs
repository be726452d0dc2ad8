use geo::{
    coordinate_position::{CoordPos, CoordinatePosition},
    Geometry, Intersects, Point,
};

/// Whether a point lying exactly on a polygon boundary counts as inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Boundary {
    #[default]
    Include,
    Exclude,
}

/// Test a Point or MultiPoint `candidate` against `reference`.
///
/// The test depends on the kind of the reference:
/// - LineString: the point lies on the line.
/// - Polygon / MultiPolygon: the point lies inside, boundary per `boundary`.
/// - MultiLineString: the point lies on any of its lines.
/// - anything else: never overlaps.
///
/// A MultiPoint overlaps as soon as one of its points does. Non-point
/// candidates never overlap here; see [`crate::try_overlap`] for those.
pub fn point_overlaps(reference: &Geometry<f64>, candidate: &Geometry<f64>, boundary: Boundary) -> bool {
    let points = match candidate {
        Geometry::Point(point) => std::slice::from_ref(point),
        Geometry::MultiPoint(points) => points.0.as_slice(),
        _ => return false,
    };
    points.iter().any(|point| point_in(reference, point, boundary))
}

fn point_in(reference: &Geometry<f64>, point: &Point<f64>, boundary: Boundary) -> bool {
    match reference {
        Geometry::LineString(line) => line.intersects(point),
        Geometry::Line(line) => line.intersects(point),
        Geometry::MultiLineString(lines) => lines.iter().any(|line| line.intersects(point)),
        Geometry::Polygon(_) | Geometry::MultiPolygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => {
            match reference.coordinate_position(&point.0) {
                CoordPos::Inside => true,
                CoordPos::OnBoundary => boundary == Boundary::Include,
                CoordPos::Outside => false,
            }
        }
        _ => false,
    }
}
