use std::cmp::Ordering;

use ahash::AHashMap;
use geoverlap::{split_overlapping, Spatial, SplitOptions};
use tracing::debug;

use crate::{
    config::ReconcileConfig,
    diagnostics::{DiagnosticKind, Diagnostics},
    resolve::{ElementRef, FeatureIndex, ResolveError, ResolveOptions},
    types::{BuildingRecord, EntranceRecord, LandRoleRecord, Residence, ZoneRecord},
};

use super::{draws, BuildingUnit, MatchResult};

/// Per-zone reconciliation of entrance and cadastral dwelling counts.
///
/// Each stage only reads its inputs; residues flow from one stage to the
/// next through the returned [`MatchResult`]s and land-role pools.
pub struct ZoneReconciler<'a> {
    buildings: &'a FeatureIndex,
    config: &'a ReconcileConfig,
}

impl<'a> ZoneReconciler<'a> {
    pub fn new(buildings: &'a FeatureIndex, config: &'a ReconcileConfig) -> Self {
        Self { buildings, config }
    }

    /// Run every stage on one zone and return its residences.
    ///
    /// `entrances` are the entrances of the zone; `land_role` may hold
    /// records outside it, only the ones overlapping the zone are used.
    pub fn validate_zone<'r>(
        &self,
        zone: &ZoneRecord,
        entrances: &[&'r EntranceRecord],
        land_role: Vec<&'r LandRoleRecord>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<Residence>, ResolveError> {
        let in_zone = split_overlapping(zone.geometry(), land_role, &SplitOptions::default().with_buffer(false)).overlapping;
        let land_role_count = in_zone.iter().fold(0u32, |total, record| total.saturating_add(record.flats));
        check_zone_counts(zone, land_role_count, diagnostics);

        let mut result = MatchResult::default();
        let (buildings, remaining) = self.process_buildings_in_zone(zone, entrances, in_zone, diagnostics)?;
        result.concat(buildings);

        let (rest, unassigned) = self.process_rest_of_zone(zone, &remaining, diagnostics);
        result.concat(rest);

        if result.has_residue() || unassigned > 0 {
            let leftovers = self.process_leftovers(zone, &result.extra_buildings, &result.extra_land_role, diagnostics);
            result.residences.extend(leftovers);
        }
        debug!(zone = %zone.id, residences = result.residences.len(), "zone reconciled");
        Ok(result.residences)
    }

    /// Match each building's entrances against the land role around it.
    ///
    /// Buildings run in building-dataset order, each one drawing from what
    /// the previous ones left. Returns the pooled building residues and the
    /// land role no building took.
    pub fn process_buildings_in_zone<'r>(
        &self,
        zone: &ZoneRecord,
        entrances: &[&'r EntranceRecord],
        land_role: Vec<&'r LandRoleRecord>,
        diagnostics: &mut Diagnostics,
    ) -> Result<(MatchResult<'r>, Vec<&'r LandRoleRecord>), ResolveError> {
        let mut groups: Vec<(&str, Vec<&'r EntranceRecord>)> = Vec::new();
        let mut group_of: AHashMap<&str, usize> = AHashMap::new();
        for &entrance in entrances {
            let key = entrance.building_id.as_str();
            let position = *group_of.entry(key).or_insert_with(|| {
                groups.push((key, Vec::new()));
                groups.len() - 1
            });
            groups[position].1.push(entrance);
        }

        let options = ResolveOptions { generate_nodes_if_not_found: false, continue_on_missing: self.config.lenient_buildings };
        let mut buildings = Vec::with_capacity(groups.len());
        let mut unresolved = MatchResult::default();
        for (key, group) in groups {
            let element = ElementRef::parse(key);
            let Some(feature) = self.buildings.resolve(&element, options)? else {
                diagnostics.warn(&zone.id, DiagnosticKind::MissingBuilding, format!(
                    "Building {key} is not in the building data, its entrances are matched with the leftovers: entrances -> {}",
                    group.len(),
                ));
                unresolved.extra_buildings.extend(draws(&group, |entrance| entrance.weight()).map(|&entrance| BuildingUnit::Entrance(entrance)));
                continue;
            };
            let order = self.buildings.position(&element.key()).unwrap_or(usize::MAX);
            let building = BuildingRecord::new(key, feature)
                .map_err(|_| ResolveError::UnsupportedGeometry { key: element.key() })?;
            buildings.push((order, building, group));
        }
        buildings.sort_by_key(|(order, ..)| *order);

        let mut result = MatchResult::default();
        let mut remaining = land_role;
        for (_, building, group) in &buildings {
            let (matched, rest) = self.process_building_in_zone(building, group, remaining);
            result.concat(matched);
            remaining = rest;
        }
        result.concat(unresolved);

        if result.has_residue() && result.extra_buildings.len() == result.extra_land_role.len() {
            diagnostics.warn(&zone.id, DiagnosticKind::MisplacedLandRole, format!(
                "Land role data for buildings is misplaced, but total count still matches: number of misplaced points -> {}",
                result.extra_buildings.len(),
            ));
        }
        Ok((result, remaining))
    }

    /// Pair one building's entrance units with the cadastral units found in
    /// or right around it. Returns the pairing and the land role left for
    /// the next buildings.
    pub fn process_building_in_zone<'r>(
        &self,
        building: &BuildingRecord<'_>,
        entrances: &[&'r EntranceRecord],
        land_role: Vec<&'r LandRoleRecord>,
    ) -> (MatchResult<'r>, Vec<&'r LandRoleRecord>) {
        let expected = entrances.iter().fold(0u32, |total, entrance| total.saturating_add(entrance.weight()));
        let flats = |record: &&LandRoleRecord| record.flats;
        let options = SplitOptions::expecting(expected)
            .with_feature_count(&flats)
            .with_max_buffer_size(self.config.building_max_buffer_m);
        let split = split_overlapping(building.geometry(), land_role, &options);
        debug!(building = %building.key, expected, matched = split.overlapping.len(), "building land role");

        let mut result = MatchResult::default();
        let mut entrance_units = draws(entrances, |entrance| entrance.weight());
        let mut land_role_units = draws(&split.overlapping, |record| record.flats);
        loop {
            match (entrance_units.next(), land_role_units.next()) {
                (Some(entrance), Some(land_role)) => {
                    result.residences.push(Residence::at_entrance(entrance, Some(*land_role)));
                }
                (entrance, land_role) => {
                    result.extra_buildings.extend(entrance.into_iter().chain(entrance_units).map(|&entrance| BuildingUnit::Entrance(entrance)));
                    result.extra_land_role.extend(land_role.into_iter().chain(land_role_units).copied());
                    break;
                }
            }
        }
        (result, split.not_overlapping)
    }

    /// Draw the zone's dwellings outside mapped buildings from the land role
    /// no building took. Land-role units beyond the quota join the building
    /// residue. Also returns the number of dwellings that could not be drawn.
    pub fn process_rest_of_zone<'r>(
        &self,
        zone: &ZoneRecord,
        land_role: &[&'r LandRoleRecord],
        diagnostics: &mut Diagnostics,
    ) -> (MatchResult<'r>, u32) {
        let unassigned = zone.unassigned_flats();
        let mut result = MatchResult::default();
        let mut units = draws(land_role, |record| record.flats);
        let mut missing = 0;

        for drawn in 0..unassigned {
            let Some(&record) = units.next() else {
                missing = unassigned - drawn;
                diagnostics.error(&zone.id, DiagnosticKind::InsufficientResidue, format!(
                    "Land role does not have enough data to match the number of flats in the zone. \
                     The new buildings need to be drawn in OSM: missing number of flats -> {missing}",
                ));
                break;
            };
            result.residences.push(Residence::from_land_role(record, &self.config.fields.retirement_home));
        }
        result.extra_buildings.extend(units.map(|&record| BuildingUnit::LandRole(record)));
        (result, missing)
    }

    /// Pair the remaining building units with the remaining land-role units
    /// by position. Building units without a partner get no land value.
    pub fn process_leftovers(
        &self,
        zone: &ZoneRecord,
        extra_buildings: &[BuildingUnit<'_>],
        extra_land_role: &[&LandRoleRecord],
        diagnostics: &mut Diagnostics,
    ) -> Vec<Residence> {
        if extra_buildings.len() < extra_land_role.len() {
            diagnostics.error(&zone.id, DiagnosticKind::CountMismatch, format!(
                "There is too much data in the land role after assigning all OSM flats: extra count in land role -> {}",
                extra_land_role.len() - extra_buildings.len(),
            ));
        }
        let unvalued_entrances = extra_buildings.iter().skip(extra_land_role.len()).filter(|unit| unit.is_entrance()).count();
        if unvalued_entrances > 0 {
            diagnostics.error(&zone.id, DiagnosticKind::InsufficientResidue, format!(
                "Land role does not have enough data for the remaining OSM flats, they get no land value: extra count in buildings -> {unvalued_entrances}",
            ));
        }

        extra_buildings.iter().enumerate()
            .map(|(i, unit)| unit.residence(extra_land_role.get(i).copied()))
            .collect()
    }
}

/// Compare the land role found in the zone with the zone's declared counts.
fn check_zone_counts(zone: &ZoneRecord, land_role_count: u32, diagnostics: &mut Diagnostics) {
    let (declared, from_osm) = (zone.flats, zone.flats_from_osm);
    if from_osm > declared {
        diagnostics.warn(&zone.id, DiagnosticKind::CountMismatch, format!(
            "More flats in OSM buildings than in the zone: osm (total) -> {declared}, flats in buildings in OSM -> {from_osm}",
        ));
    }

    match land_role_count.cmp(&declared) {
        Ordering::Less => {
            let missing = declared - land_role_count;
            let counts = format!(
                "osm (total) -> {declared}, land role -> {land_role_count}, flats in buildings in OSM -> {from_osm}",
            );
            if missing > from_osm {
                diagnostics.error(&zone.id, DiagnosticKind::CountMismatch, format!(
                    "Too few buildings in land role. Either draw new buildings in OSM, or verify land role data: {counts}",
                ));
            } else {
                diagnostics.warn(&zone.id, DiagnosticKind::CountMismatch, format!(
                    "Flat number doesn't match: {counts}, missing in land role -> {missing}",
                ));
            }
        }
        Ordering::Greater => diagnostics.error(&zone.id, DiagnosticKind::CountMismatch, format!(
            "Too many flats in land role. Update land role or OSM: osm -> {declared}, land role -> {land_role_count}",
        )),
        Ordering::Equal => {}
    }
}
