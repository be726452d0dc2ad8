use geo::Point;
use geojson::{feature::Id, Feature, JsonObject, JsonValue};

use super::{EntranceRecord, LandRoleRecord};

/// One dwelling unit, located at an entrance or at a cadastral point.
#[derive(Debug, Clone, PartialEq)]
pub struct Residence {
    pub id: Option<Id>,
    pub geometry: Point<f64>,
    /// True when the dwelling exists only in the cadastral data.
    pub from_landrole: bool,
    pub land_value: f64,
    pub area: f64,
    /// Properties inherited from the source entrance or cadastral point.
    pub properties: JsonObject,
}

impl Residence {
    /// Dwelling at an entrance, valued from `land_role` when there is one.
    pub fn at_entrance(entrance: &EntranceRecord, land_role: Option<&LandRoleRecord>) -> Self {
        Self {
            id: entrance.feature.id.clone(),
            geometry: entrance.point,
            from_landrole: false,
            land_value: land_role.map_or(0.0, LandRoleRecord::land_value_per_flat),
            area: land_role.map_or(0.0, LandRoleRecord::area_per_flat),
            properties: entrance.feature.properties.clone(),
        }
    }

    /// Dwelling at a cadastral point left over beyond its zone's quota,
    /// valued from `land_role` when there is one.
    pub fn at_land_role(unit: &LandRoleRecord, land_role: Option<&LandRoleRecord>) -> Self {
        Self {
            id: unit.feature.id.clone(),
            geometry: unit.point,
            from_landrole: false,
            land_value: land_role.map_or(0.0, LandRoleRecord::land_value_per_flat),
            area: land_role.map_or(0.0, LandRoleRecord::area_per_flat),
            properties: unit.feature.properties.clone(),
        }
    }

    /// Dwelling known only from the cadastral data.
    pub fn from_land_role(land_role: &LandRoleRecord, retirement_home_key: &str) -> Self {
        let mut properties = JsonObject::new();
        properties.insert(retirement_home_key.to_string(), JsonValue::Bool(false));

        Self {
            id: land_role.feature.id.clone(),
            geometry: land_role.point,
            from_landrole: true,
            land_value: land_role.land_value_per_flat(),
            area: land_role.area_per_flat(),
            properties,
        }
    }

    /// GeoJSON point feature. Inherited properties may override
    /// `from_landrole`, never `land_value` or `area`.
    pub fn to_feature(&self) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert("from_landrole".to_string(), JsonValue::Bool(self.from_landrole));
        properties.extend(self.properties.iter().map(|(key, value)| (key.clone(), value.clone())));
        properties.insert("land_value".to_string(), number(self.land_value));
        properties.insert("area".to_string(), number(self.area));

        Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&self.geometry))),
            id: self.id.clone(),
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

#[inline]
fn number(value: f64) -> JsonValue {
    serde_json::Number::from_f64(value).map_or(JsonValue::from(0), JsonValue::Number)
}
