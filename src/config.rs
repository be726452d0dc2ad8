use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Property keys read from the input features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    /// Land role: total land value of the declaration
    pub land_value: String,
    /// Land role: total floor area of the declaration
    pub area: String,
    /// Land role: dwellings covered by the declaration
    pub land_role_flats: String,
    /// Entrance: dwellings served by the entrance
    pub entrance_flats: String,
    /// Entrance: id of the building it belongs to
    pub building_id: String,
    /// Entrance: id of the zone it lies in
    pub zone_id: String,
    /// Zone: total dwellings
    pub zone_flats: String,
    /// Zone: dwellings already in mapped buildings
    pub zone_flats_from_osm: String,
    /// Residence: flag written on land-role dwellings
    pub retirement_home: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            land_value: "valeur_totale".to_string(),
            area: "superficie_etages".to_string(),
            land_role_flats: "building:flats".to_string(),
            entrance_flats: "building:flats".to_string(),
            building_id: "building_id".to_string(),
            zone_id: "zone_id".to_string(),
            zone_flats: "flats".to_string(),
            zone_flats_from_osm: "flats_from_osm".to_string(),
            retirement_home: "retirement_home".to_string(),
        }
    }
}

/// Settings for a reconciliation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub fields: FieldMapping,
    /// Largest buffer, in meters, used to find cadastral points around a building.
    /// Zero or less derives the size from the building and the points around it.
    pub building_max_buffer_m: f64,
    /// Skip buildings missing from the building data instead of failing.
    pub lenient_buildings: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self { fields: FieldMapping::default(), building_max_buffer_m: 2.0, lenient_buildings: false }
    }
}

impl ReconcileConfig {
    /// Load from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}
