use geo::Geometry;
use geojson::{feature::Id, Feature, JsonObject, JsonValue};
use geoverlap::{GeometryKind, Spatial};

use super::RecordError;

/// A lon/lat geometry with an open property bag and an optional identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialFeature {
    pub id: Option<Id>,
    pub geometry: Geometry<f64>,
    pub properties: JsonObject,
}

impl SpatialFeature {
    pub fn new(geometry: impl Into<Geometry<f64>>) -> Self {
        Self { id: None, geometry: geometry.into(), properties: JsonObject::new() }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(Id::String(id.into()));
        self
    }

    pub fn with_property(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// The identifier as text, numbers included.
    pub fn id_string(&self) -> Option<String> {
        match self.id.as_ref()? {
            Id::String(id) => Some(id.clone()),
            Id::Number(id) => Some(id.to_string()),
        }
    }

    /// Identifier used in diagnostics and error messages.
    #[inline]
    pub fn subject(&self) -> String { self.id_string().unwrap_or_else(|| "<no id>".to_string()) }

    #[inline] pub fn property(&self, key: &str) -> Option<&JsonValue> { self.properties.get(key) }

    /// Non-negative integer property. Numbers are truncated, numeric strings
    /// are parsed, and anything else (missing included) counts as 0.
    pub fn count_property(&self, key: &str) -> u32 {
        let value = self.number_property(key).trunc();
        if value >= u32::MAX as f64 { u32::MAX } else if value > 0.0 { value as u32 } else { 0 }
    }

    /// Numeric property, 0 when missing or not a finite number.
    pub fn number_property(&self, key: &str) -> f64 {
        let value = match self.property(key) {
            Some(JsonValue::Number(number)) => number.as_f64().unwrap_or(0.0),
            Some(JsonValue::String(text)) => text.trim().parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        };
        if value.is_finite() { value } else { 0.0 }
    }

    /// Text property, numbers rendered as text.
    pub fn string_property(&self, key: &str) -> Option<String> {
        match self.property(key)? {
            JsonValue::String(text) => Some(text.clone()),
            JsonValue::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    pub fn to_feature(&self) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&self.geometry))),
            id: self.id.clone(),
            properties: Some(self.properties.clone()),
            foreign_members: None,
        }
    }
}

impl Spatial for SpatialFeature {
    #[inline] fn geometry(&self) -> &Geometry<f64> { &self.geometry }
}

impl TryFrom<Feature> for SpatialFeature {
    type Error = RecordError;

    fn try_from(feature: Feature) -> Result<Self, Self::Error> {
        let id = feature.id;
        let subject = match &id {
            Some(Id::String(id)) => id.clone(),
            Some(Id::Number(id)) => id.to_string(),
            None => "<no id>".to_string(),
        };
        let Some(geometry) = feature.geometry else { return Err(RecordError::MissingGeometry { subject }) };
        let geometry = Geometry::<f64>::try_from(geometry.value)
            .map_err(|e| RecordError::Geometry { subject, reason: e.to_string() })?;

        Ok(Self { id, geometry, properties: feature.properties.unwrap_or_default() })
    }
}

/// Reject geometry kinds a record type cannot hold.
pub(crate) fn expect_kind(
    feature: &SpatialFeature,
    record: &'static str,
    accepted: &[GeometryKind],
) -> Result<(), RecordError> {
    let found = feature.kind();
    if accepted.contains(&found) { return Ok(()) }
    Err(RecordError::WrongKind { subject: feature.subject(), record, found })
}
