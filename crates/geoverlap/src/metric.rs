use geo::{BoundingRect, Coord, Geometry, MapCoords};
use proj4rs::{proj::Proj, transform::transform};

const GEOGRAPHIC_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("geometry has no extent to center a metric frame on")]
    EmptyGeometry,
    #[error("failed to build PROJ.4 `{definition}`: {reason}")]
    Definition { definition: String, reason: String },
    #[error("failed to transform ({x}, {y}): {reason}")]
    Transform { x: f64, y: f64, reason: String },
}

/// Local planar frame, in meters, around one lon/lat geometry.
///
/// Mercator with true scale at the origin latitude: parallels and meridians
/// stay straight, so axis-aligned lon/lat edges keep their shape when
/// buffered, and scale error stays under a percent within about half a
/// degree of latitude from the origin.
pub struct MetricFrame {
    geographic: Proj,
    metric: Proj,
    origin: Coord<f64>,
}

impl MetricFrame {
    /// Frame centered on the bounding box of `geometry`.
    pub fn centered_on(geometry: &Geometry<f64>) -> Result<Self, ProjectionError> {
        let bounds = geometry.bounding_rect().ok_or(ProjectionError::EmptyGeometry)?;
        Self::at(bounds.center())
    }

    /// Frame with its origin at the given lon/lat coordinate.
    pub fn at(origin: Coord<f64>) -> Result<Self, ProjectionError> {
        let metric = format!(
            "+proj=merc +lat_ts={} +lon_0={} +datum=WGS84 +units=m +no_defs +type=crs",
            origin.y, origin.x,
        );
        Ok(Self { geographic: build(GEOGRAPHIC_PROJ4)?, metric: build(&metric)?, origin })
    }

    #[inline] pub fn origin(&self) -> Coord<f64> { self.origin }

    /// Project a lon/lat coordinate to meters.
    pub fn forward(&self, coord: Coord<f64>) -> Result<Coord<f64>, ProjectionError> {
        let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
        transform(&self.geographic, &self.metric, &mut point)
            .map_err(|e| ProjectionError::Transform { x: coord.x, y: coord.y, reason: e.to_string() })?;
        Ok(Coord { x: point.0, y: point.1 })
    }

    /// Project a coordinate in meters back to lon/lat.
    pub fn inverse(&self, coord: Coord<f64>) -> Result<Coord<f64>, ProjectionError> {
        let mut point = (coord.x, coord.y, 0.0);
        transform(&self.metric, &self.geographic, &mut point)
            .map_err(|e| ProjectionError::Transform { x: coord.x, y: coord.y, reason: e.to_string() })?;
        Ok(Coord { x: point.0.to_degrees(), y: point.1.to_degrees() })
    }

    pub fn to_metric(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>, ProjectionError> {
        geometry.try_map_coords(|coord| self.forward(coord))
    }

    pub fn to_geographic(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>, ProjectionError> {
        geometry.try_map_coords(|coord| self.inverse(coord))
    }

    /// Straight-line distance in meters between two lon/lat coordinates.
    pub fn distance(&self, a: Coord<f64>, b: Coord<f64>) -> Result<f64, ProjectionError> {
        let (a, b) = (self.forward(a)?, self.forward(b)?);
        Ok((a.x - b.x).hypot(a.y - b.y))
    }
}

fn build(definition: &str) -> Result<Proj, ProjectionError> {
    Proj::from_proj_string(definition).map_err(|e| ProjectionError::Definition {
        definition: definition.to_string(),
        reason: e.to_string(),
    })
}
