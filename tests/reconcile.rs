// Integration tests for zone reconciliation:
//   count validation, building matching, zone residue, leftovers,
//   missing buildings, and batch processing over several zones.

use geo::{point, polygon, Geometry};
use geojson::feature::Id;
use placematch::{
    reconcile_zones, DiagnosticKind, Diagnostics, EntranceRecord, FeatureIndex, FieldMapping, LandRoleRecord,
    ReconcileConfig, ResolveError, Severity, SpatialFeature, ZoneReconciler, ZoneRecord,
};

/// Point `east_m` / `north_m` meters away from `origin` (lon, lat).
fn offset(origin: (f64, f64), east_m: f64, north_m: f64) -> (f64, f64) {
    let (lon, lat) = origin;
    (
        lon + east_m / (111_320.0 * lat.to_radians().cos()),
        lat + north_m / 111_132.0,
    )
}

fn rect(min: (f64, f64), max: (f64, f64)) -> Geometry<f64> {
    polygon![
        (x: min.0, y: min.1), (x: max.0, y: min.1), (x: max.0, y: max.1), (x: min.0, y: max.1), (x: min.0, y: min.1)
    ].into()
}

fn zone(id: &str, min: (f64, f64), max: (f64, f64), flats: u32, from_osm: u32) -> ZoneRecord {
    let feature = SpatialFeature::new(rect(min, max))
        .with_id(id)
        .with_property("flats", flats)
        .with_property("flats_from_osm", from_osm);
    ZoneRecord::from_feature(feature, &FieldMapping::default()).unwrap()
}

fn building(id: &str, min: (f64, f64), max: (f64, f64)) -> SpatialFeature {
    SpatialFeature::new(rect(min, max)).with_id(id)
}

fn entrance(id: &str, (x, y): (f64, f64), building_id: &str, zone_id: &str, flats: u32) -> EntranceRecord {
    let feature = SpatialFeature::new(point!(x: x, y: y))
        .with_id(id)
        .with_property("building_id", building_id)
        .with_property("zone_id", zone_id)
        .with_property("building:flats", flats);
    EntranceRecord::from_feature(feature, &FieldMapping::default()).unwrap()
}

fn land_role((x, y): (f64, f64), flats: u32, value: f64) -> LandRoleRecord {
    let feature = SpatialFeature::new(point!(x: x, y: y))
        .with_property("building:flats", flats)
        .with_property("valeur_totale", value)
        .with_property("superficie_etages", 100.0 * flats as f64);
    LandRoleRecord::from_feature(feature, &FieldMapping::default()).unwrap()
}

const ZONE_MIN: (f64, f64) = (-73.600, 45.500);
const ZONE_MAX: (f64, f64) = (-73.590, 45.510);
const BUILDING_MIN: (f64, f64) = (-73.5960, 45.5040);
const BUILDING_MAX: (f64, f64) = (-73.5950, 45.5050);

/// One building with a 4-flat entrance and 4 cadastral flats inside it,
/// plus two cadastral points elsewhere in the zone.
fn neighbourhood(outside_flats: u32) -> (FeatureIndex, Vec<EntranceRecord>, Vec<LandRoleRecord>) {
    let buildings = FeatureIndex::new(vec![building("way/1", BUILDING_MIN, BUILDING_MAX)]);
    let entrances = vec![entrance("node/10", (-73.5955, 45.5040), "way/1", "zone/1", 4)];
    let land_role = vec![
        land_role((-73.5957, 45.5045), 2, 200_000.0),
        land_role((-73.5953, 45.5046), 2, 300_000.0),
        land_role((-73.5930, 45.5070), outside_flats, 150_000.0),
        land_role((-73.5920, 45.5020), outside_flats, 90_000.0),
    ];
    (buildings, entrances, land_role)
}

fn run(
    zone: &ZoneRecord,
    buildings: &FeatureIndex,
    entrances: &[EntranceRecord],
    land_role: &[LandRoleRecord],
    config: &ReconcileConfig,
) -> Result<(Vec<placematch::Residence>, Diagnostics), ResolveError> {
    let mut diagnostics = Diagnostics::new();
    let entrances = entrances.iter().collect::<Vec<_>>();
    let residences = ZoneReconciler::new(buildings, config)
        .validate_zone(zone, &entrances, land_role.iter().collect(), &mut diagnostics)?;
    Ok((residences, diagnostics))
}

#[test]
fn matching_counts_produce_one_residence_per_flat() {
    let (buildings, entrances, land_role) = neighbourhood(3);
    let zone = zone("zone/1", ZONE_MIN, ZONE_MAX, 10, 4);

    let (residences, diagnostics) = run(&zone, &buildings, &entrances, &land_role, &ReconcileConfig::default()).unwrap();

    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    assert_eq!(residences.len(), 10);

    let (from_entrances, from_land_role): (Vec<_>, Vec<_>) = residences.iter().partition(|r| !r.from_landrole);
    assert_eq!(from_entrances.len(), 4);
    assert_eq!(
        from_entrances.iter().map(|r| r.land_value).collect::<Vec<_>>(),
        vec![100_000.0, 100_000.0, 150_000.0, 150_000.0],
    );
    assert!(from_entrances.iter().all(|r| r.properties["building_id"] == "way/1"));

    assert_eq!(from_land_role.len(), 6);
    assert_eq!(from_land_role.iter().map(|r| r.land_value).sum::<f64>(), 150_000.0 + 90_000.0);
    assert!(from_land_role.iter().all(|r| r.area == 100.0));
}

#[test]
fn shortfall_covered_by_buildings_is_a_warning() {
    let (buildings, entrances, land_role) = neighbourhood(2);
    let zone = zone("zone/1", ZONE_MIN, ZONE_MAX, 10, 4);

    let (residences, diagnostics) = run(&zone, &buildings, &entrances, &land_role, &ReconcileConfig::default()).unwrap();

    let warnings = diagnostics.warnings().collect::<Vec<_>>();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, DiagnosticKind::CountMismatch);
    assert!(warnings[0].to_string().starts_with("zone/1: Flat number doesn't match"));
    assert!(warnings[0].message.contains("land role -> 8"));
    assert!(warnings[0].message.contains("missing in land role -> 2"));

    // The zone residue then runs short by the same 2 flats.
    let errors = diagnostics.errors().collect::<Vec<_>>();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, DiagnosticKind::InsufficientResidue);
    assert!(errors[0].message.ends_with("missing number of flats -> 2"));
    assert_eq!(residences.len(), 8);
}

#[test]
fn large_shortfall_and_excess_are_errors() {
    let (buildings, entrances, land_role) = neighbourhood(3);

    let too_few = zone("zone/1", ZONE_MIN, ZONE_MAX, 20, 4);
    let (_, diagnostics) = run(&too_few, &buildings, &entrances, &land_role, &ReconcileConfig::default()).unwrap();
    assert!(diagnostics.errors().any(|d| d.message.starts_with("Too few buildings in land role")));

    let too_many = zone("zone/1", ZONE_MIN, ZONE_MAX, 8, 4);
    let (residences, diagnostics) = run(&too_many, &buildings, &entrances, &land_role, &ReconcileConfig::default()).unwrap();
    assert_eq!(diagnostics.error_count(), 1);
    assert!(diagnostics.errors().any(|d| d.message.starts_with("Too many flats in land role")));

    // Cadastral units beyond the zone quota still become dwellings, at their
    // own point and without land value.
    assert_eq!(residences.len(), 10);
    let beyond_quota = residences.iter().filter(|r| !r.from_landrole && r.land_value == 0.0).collect::<Vec<_>>();
    assert_eq!(beyond_quota.len(), 2);
    assert!(beyond_quota.iter().all(|r| r.geometry == land_role[3].point));
}

#[test]
fn cadastral_point_next_to_building_is_found_by_buffering() {
    let corner = (BUILDING_MAX.0, 45.5045);
    let buildings = FeatureIndex::new(vec![building("way/1", BUILDING_MIN, BUILDING_MAX)]);
    let entrances = vec![entrance("node/10", (-73.5955, 45.5040), "way/1", "zone/1", 2)];
    let land_role = vec![
        land_role(offset(corner, 0.6, 0.0), 2, 500_000.0),
        land_role(offset(corner, 30.0, 0.0), 1, 10_000.0),
    ];
    let zone = zone("zone/1", ZONE_MIN, ZONE_MAX, 3, 2);

    let (residences, diagnostics) = run(&zone, &buildings, &entrances, &land_role, &ReconcileConfig::default()).unwrap();

    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    assert_eq!(residences.iter().filter(|r| !r.from_landrole && r.land_value == 250_000.0).count(), 2);
    assert_eq!(residences.iter().filter(|r| r.from_landrole && r.land_value == 10_000.0).count(), 1);

    // A buffer narrower than the gap leaves the neighbour out of the building.
    let config = ReconcileConfig { building_max_buffer_m: 0.3, ..Default::default() };
    let zone = self::zone("zone/1", ZONE_MIN, ZONE_MAX, 2, 2);
    let (residences, diagnostics) = run(&zone, &buildings, &entrances, &land_role[..1], &config).unwrap();
    let (at_entrance, at_land_role): (Vec<_>, Vec<_>) = residences.iter().partition(|r| r.properties.contains_key("building_id"));
    assert_eq!(at_entrance.len(), 2);
    assert!(at_entrance.iter().all(|r| r.land_value == 0.0));
    assert_eq!(at_land_role.len(), 2);
    assert!(at_land_role.iter().all(|r| r.geometry == land_role[0].point));
    assert_eq!(diagnostics.error_count(), 1);
    assert!(diagnostics.errors().any(|d| d.message.ends_with("extra count in buildings -> 2")));
}

#[test]
fn misplaced_land_role_is_paired_in_leftovers() {
    let buildings = FeatureIndex::new(vec![
        building("way/1", BUILDING_MIN, BUILDING_MAX),
        building("way/2", (-73.5940, 45.5040), (-73.5930, 45.5050)),
    ]);
    // Entrances listed in reverse: buildings still run in building-data order.
    let entrances = vec![
        entrance("node/20", (-73.5935, 45.5040), "way/2", "zone/1", 1),
        entrance("node/10", (-73.5955, 45.5040), "way/1", "zone/1", 1),
    ];
    let land_role = vec![land_role((-73.5957, 45.5045), 2, 80_000.0)];
    let zone = zone("zone/1", ZONE_MIN, ZONE_MAX, 2, 2);

    let (residences, diagnostics) = run(&zone, &buildings, &entrances, &land_role, &ReconcileConfig::default()).unwrap();

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics.entries()[0].kind, DiagnosticKind::MisplacedLandRole);
    assert_eq!(diagnostics.entries()[0].severity, Severity::Warning);
    assert!(diagnostics.entries()[0].message.ends_with("number of misplaced points -> 1"));

    let ids = residences.iter().map(|r| r.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids, vec![Some(Id::String("node/10".to_string())), Some(Id::String("node/20".to_string()))]);
    assert!(residences.iter().all(|r| r.land_value == 40_000.0));
}

#[test]
fn unmatched_entrances_get_no_land_value() {
    let (buildings, _, land_role) = neighbourhood(3);
    let entrances = vec![entrance("node/10", (-73.5955, 45.5040), "way/1", "zone/1", 6)];
    let zone = zone("zone/1", ZONE_MIN, ZONE_MAX, 12, 6);

    let (residences, diagnostics) = run(&zone, &buildings, &entrances, &land_role[..2], &ReconcileConfig::default()).unwrap();

    assert_eq!(residences.len(), 6);
    assert_eq!(residences.iter().filter(|r| r.land_value == 0.0).count(), 2);
    assert!(diagnostics.errors().any(|d| d.message.ends_with("extra count in buildings -> 2")));
}

#[test]
fn missing_building_fails_unless_lenient() {
    let buildings = FeatureIndex::new(Vec::new());
    let entrances = vec![entrance("node/10", (-73.5955, 45.5040), "way/404", "zone/1", 2)];
    let land_role = vec![land_role((-73.5930, 45.5070), 2, 60_000.0)];
    let zone = zone("zone/1", ZONE_MIN, ZONE_MAX, 4, 2);

    let error = run(&zone, &buildings, &entrances, &land_role, &ReconcileConfig::default()).unwrap_err();
    assert!(matches!(error, ResolveError::MissingGeometry { ref key } if key == "way/404"));

    let lenient = ReconcileConfig { lenient_buildings: true, ..Default::default() };
    let (residences, diagnostics) = run(&zone, &buildings, &entrances, &land_role, &lenient).unwrap();
    assert!(diagnostics.warnings().any(|d| d.kind == DiagnosticKind::MissingBuilding));
    assert!(diagnostics.errors().any(|d| d.message.ends_with("extra count in buildings -> 2")));
    assert_eq!(residences.len(), 4);
    assert_eq!(residences.iter().filter(|r| r.from_landrole && r.land_value == 30_000.0).count(), 2);
    assert_eq!(residences.iter().filter(|r| !r.from_landrole && r.land_value == 0.0).count(), 2);
}

#[test]
fn bare_building_ids_keep_building_data_order() {
    // Both footprints cover the only cadastral point: the first building in
    // the building data takes it, whatever the entrance order.
    let buildings = FeatureIndex::new(vec![
        building("1", BUILDING_MIN, BUILDING_MAX),
        building("2", (-73.5955, 45.5040), (-73.5945, 45.5050)),
    ]);
    let entrances = vec![
        entrance("node/20", (-73.5946, 45.5040), "/2", "zone/1", 1),
        entrance("node/10", (-73.5959, 45.5040), "/1", "zone/1", 1),
    ];
    let land_role = vec![land_role((-73.5952, 45.5045), 1, 80_000.0)];
    let zone = zone("zone/1", ZONE_MIN, ZONE_MAX, 2, 2);

    let (residences, _) = run(&zone, &buildings, &entrances, &land_role, &ReconcileConfig::default()).unwrap();

    let value_of = |id: &str| residences.iter()
        .find(|r| r.id == Some(Id::String(id.to_string())))
        .map(|r| r.land_value);
    assert_eq!(value_of("node/10"), Some(80_000.0));
    assert_eq!(value_of("node/20"), Some(0.0));
}

#[test]
fn batch_reconciles_each_zone_with_its_own_data() {
    let (buildings, mut entrances, mut land_role) = neighbourhood(3);
    let east_min = (-73.580, 45.500);
    let east_max = (-73.570, 45.510);
    land_role.push(land_role_in(east_min, 3));
    // Outside both zones.
    land_role.push(land_role_in((-73.700, 45.600), 5));
    entrances.push(entrance("node/99", (-73.650, 45.550), "way/1", "zone/unknown", 1));

    let zones = vec![zone("zone/1", ZONE_MIN, ZONE_MAX, 10, 4), zone("zone/2", east_min, east_max, 3, 0)];
    let reconciliation = reconcile_zones(&zones, &entrances, &land_role, &buildings, &ReconcileConfig::default()).unwrap();

    assert!(reconciliation.diagnostics.is_empty(), "unexpected diagnostics: {:?}", reconciliation.diagnostics);
    assert_eq!(reconciliation.residences.len(), 13);
    assert_eq!(reconciliation.residences.iter().filter(|r| r.from_landrole).count(), 9);
}

fn land_role_in(min: (f64, f64), flats: u32) -> LandRoleRecord {
    land_role((min.0 + 0.005, min.1 + 0.005), flats, 1_000.0)
}
