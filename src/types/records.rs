use std::borrow::Cow;

use geo::{Geometry, Point};
use geoverlap::{GeometryKind, Spatial};

use crate::config::FieldMapping;

use super::{feature::expect_kind, RecordError, SpatialFeature};

const AREAL: &[GeometryKind] = &[GeometryKind::Polygon, GeometryKind::MultiPolygon];

/// Administrative zone with its declared dwelling counts.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneRecord {
    pub feature: SpatialFeature,
    pub id: String,
    /// Total dwellings declared for the zone.
    pub flats: u32,
    /// Part of `flats` already accounted for by mapped buildings.
    pub flats_from_osm: u32,
}

impl ZoneRecord {
    pub fn from_feature(feature: SpatialFeature, fields: &FieldMapping) -> Result<Self, RecordError> {
        let id = feature.id_string().ok_or(RecordError::MissingId { record: "zone" })?;
        expect_kind(&feature, "zone", AREAL)?;

        Ok(Self {
            flats: feature.count_property(&fields.zone_flats),
            flats_from_osm: feature.count_property(&fields.zone_flats_from_osm),
            id,
            feature,
        })
    }

    /// Dwellings expected outside mapped buildings.
    #[inline] pub fn unassigned_flats(&self) -> u32 { self.flats.saturating_sub(self.flats_from_osm) }
}

/// Building footprint, matched to its entrances by id.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingRecord<'a> {
    /// Lookup key shared with the entrances' building id.
    pub key: String,
    pub feature: Cow<'a, SpatialFeature>,
}

impl<'a> BuildingRecord<'a> {
    pub fn new(key: impl Into<String>, feature: Cow<'a, SpatialFeature>) -> Result<Self, RecordError> {
        let key = key.into();
        if feature.kind() == GeometryKind::GeometryCollection {
            return Err(RecordError::WrongKind { subject: key, record: "building", found: GeometryKind::GeometryCollection });
        }
        Ok(Self { key, feature })
    }
}

impl Spatial for BuildingRecord<'_> {
    #[inline] fn geometry(&self) -> &Geometry<f64> { &self.feature.geometry }
}

/// Building entrance serving some of the building's dwellings.
#[derive(Debug, Clone, PartialEq)]
pub struct EntranceRecord {
    pub feature: SpatialFeature,
    pub point: Point<f64>,
    /// Lookup key of the building, never owned.
    pub building_id: String,
    pub zone_id: Option<String>,
    pub flats: u32,
}

impl EntranceRecord {
    pub fn from_feature(feature: SpatialFeature, fields: &FieldMapping) -> Result<Self, RecordError> {
        let point = point_of(&feature, "entrance")?;
        let building_id = feature.string_property(&fields.building_id).ok_or_else(|| RecordError::MissingProperty {
            subject: feature.subject(),
            record: "entrance",
            key: fields.building_id.clone(),
        })?;

        Ok(Self {
            zone_id: feature.string_property(&fields.zone_id),
            flats: feature.count_property(&fields.entrance_flats),
            point,
            building_id,
            feature,
        })
    }

    /// Dwellings drawn from this entrance: a missing or zero count means one.
    #[inline] pub fn weight(&self) -> u32 { self.flats.max(1) }
}

/// Cadastral declaration, possibly covering several dwellings.
#[derive(Debug, Clone, PartialEq)]
pub struct LandRoleRecord {
    pub feature: SpatialFeature,
    pub point: Point<f64>,
    pub flats: u32,
    pub land_value: f64,
    pub area: f64,
}

impl LandRoleRecord {
    pub fn from_feature(feature: SpatialFeature, fields: &FieldMapping) -> Result<Self, RecordError> {
        let point = point_of(&feature, "land role")?;
        Ok(Self {
            flats: feature.count_property(&fields.land_role_flats),
            land_value: feature.number_property(&fields.land_value),
            area: feature.number_property(&fields.area),
            point,
            feature,
        })
    }

    /// Land value of one of the declared dwellings.
    #[inline] pub fn land_value_per_flat(&self) -> f64 { per_flat(self.land_value, self.flats) }

    /// Floor area of one of the declared dwellings.
    #[inline] pub fn area_per_flat(&self) -> f64 { per_flat(self.area, self.flats) }
}

#[inline]
fn per_flat(value: f64, flats: u32) -> f64 {
    if flats == 0 { 0.0 } else { value / flats as f64 }
}

fn point_of(feature: &SpatialFeature, record: &'static str) -> Result<Point<f64>, RecordError> {
    expect_kind(feature, record, &[GeometryKind::Point])?;
    match &feature.geometry {
        Geometry::Point(point) => Ok(*point),
        _ => Err(RecordError::WrongKind { subject: feature.subject(), record, found: feature.kind() }),
    }
}

macro_rules! impl_spatial {
    ($($record:ty),*) => {
        $(impl Spatial for $record {
            #[inline] fn geometry(&self) -> &Geometry<f64> { &self.feature.geometry }
        })*
    };
}

impl_spatial!(ZoneRecord, EntranceRecord, LandRoleRecord);

#[cfg(test)]
mod tests {
    use geo::{point, polygon};

    use super::*;

    fn fields() -> FieldMapping { FieldMapping::default() }

    #[test]
    fn zone_reads_counts() {
        let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)];
        let feature = SpatialFeature::new(square)
            .with_id("zone/7")
            .with_property("flats", "12")
            .with_property("flats_from_osm", 5);

        let zone = ZoneRecord::from_feature(feature, &fields()).unwrap();
        assert_eq!(zone.id, "zone/7");
        assert_eq!((zone.flats, zone.flats_from_osm), (12, 5));
        assert_eq!(zone.unassigned_flats(), 7);
    }

    #[test]
    fn zone_requires_id_and_area() {
        let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)];
        let error = ZoneRecord::from_feature(SpatialFeature::new(square), &fields()).unwrap_err();
        assert!(matches!(error, RecordError::MissingId { record: "zone" }));

        let point = SpatialFeature::new(point!(x: 0.0, y: 0.0)).with_id("zone/1");
        let error = ZoneRecord::from_feature(point, &fields()).unwrap_err();
        assert!(matches!(error, RecordError::WrongKind { found: GeometryKind::Point, .. }));
    }

    #[test]
    fn entrance_needs_building_id() {
        let feature = SpatialFeature::new(point!(x: -73.5, y: 45.5))
            .with_id("node/3")
            .with_property("building:flats", 3)
            .with_property("zone_id", "zone/1");
        let error = EntranceRecord::from_feature(feature.clone(), &fields()).unwrap_err();
        assert!(matches!(error, RecordError::MissingProperty { ref key, .. } if key == "building_id"));

        let entrance = EntranceRecord::from_feature(feature.with_property("building_id", "way/9"), &fields()).unwrap();
        assert_eq!(entrance.building_id, "way/9");
        assert_eq!(entrance.zone_id.as_deref(), Some("zone/1"));
        assert_eq!(entrance.weight(), 3);
    }

    #[test]
    fn entrance_without_count_weighs_one() {
        let feature = SpatialFeature::new(point!(x: -73.5, y: 45.5)).with_property("building_id", 12);
        let entrance = EntranceRecord::from_feature(feature, &fields()).unwrap();
        assert_eq!(entrance.building_id, "12");
        assert_eq!((entrance.flats, entrance.weight()), (0, 1));
    }

    #[test]
    fn land_role_values_are_split_per_flat() {
        let feature = SpatialFeature::new(point!(x: -73.5, y: 45.5))
            .with_property("building:flats", 4)
            .with_property("valeur_totale", 400_000.0)
            .with_property("superficie_etages", "320");
        let land_role = LandRoleRecord::from_feature(feature, &fields()).unwrap();
        assert_eq!(land_role.land_value_per_flat(), 100_000.0);
        assert_eq!(land_role.area_per_flat(), 80.0);

        let empty = SpatialFeature::new(point!(x: -73.5, y: 45.5)).with_property("valeur_totale", 1000);
        let land_role = LandRoleRecord::from_feature(empty, &fields()).unwrap();
        assert_eq!(land_role.land_value_per_flat(), 0.0);
    }

    #[test]
    fn building_rejects_geometry_collections() {
        let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)];
        let building = BuildingRecord::new("way/1", Cow::Owned(SpatialFeature::new(square.clone()))).unwrap();
        assert_eq!(building.kind(), GeometryKind::Polygon);

        let collection = Geometry::GeometryCollection(geo::GeometryCollection::from(vec![Geometry::from(square)]));
        let error = BuildingRecord::new("way/2", Cow::Owned(SpatialFeature::new(collection))).unwrap_err();
        assert!(matches!(error, RecordError::WrongKind { ref subject, .. } if subject == "way/2"));
    }
}
