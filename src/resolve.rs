//! Lookup of raw element references (`"<kind>/<id>"`) in a feature dataset.
use std::borrow::Cow;

use ahash::AHashMap;
use geo::{Coord, Point};
use geojson::JsonValue;
use geoverlap::{GeometryKind, Spatial};
use tracing::{debug, warn};

use crate::types::SpatialFeature;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no geometry found for {key}, check the input files or the source data")]
    MissingGeometry { key: String },
    #[error("{key} has unsupported geometry type GeometryCollection")]
    UnsupportedGeometry { key: String },
}

/// Raw element as found in the source data: a kind, an id and, for nodes,
/// a position and multi-valued tags.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementRef {
    pub kind: String,
    pub id: String,
    pub coord: Option<Coord<f64>>,
    pub tags: Vec<(String, Vec<String>)>,
}

impl ElementRef {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self { kind: kind.into(), id: id.into(), coord: None, tags: Vec::new() }
    }

    pub fn node(id: impl Into<String>, coord: Coord<f64>) -> Self {
        Self { coord: Some(coord), ..Self::new("node", id) }
    }

    pub fn with_tag(mut self, key: &str, values: &[&str]) -> Self {
        self.tags.push((key.to_string(), values.iter().map(|value| value.to_string()).collect()));
        self
    }

    /// Split a `"<kind>/<id>"` key. A key without a kind keeps an empty kind.
    pub fn parse(key: &str) -> Self {
        match key.split_once('/') {
            Some((kind, id)) => Self::new(kind, id),
            None => Self::new("", key),
        }
    }

    /// Lookup key, `"<kind>/<id>"`.
    pub fn key(&self) -> String {
        if self.kind.is_empty() { self.id.clone() } else { format!("{}/{}", self.kind, self.id) }
    }

    /// Point feature built from a node's own position and tags.
    fn to_node_feature(&self) -> Option<SpatialFeature> {
        if self.kind != "node" { return None }
        let coord = self.coord?;

        let mut feature = SpatialFeature::new(Point::from(coord)).with_id(self.key());
        for (key, values) in &self.tags {
            feature.properties.insert(key.clone(), JsonValue::String(values.join(";")));
        }
        Some(feature)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Build a point feature for nodes missing from the dataset.
    pub generate_nodes_if_not_found: bool,
    /// Skip missing elements with a warning instead of failing.
    pub continue_on_missing: bool,
}

/// Features indexed by id, in dataset order.
#[derive(Debug, Clone, Default)]
pub struct FeatureIndex {
    features: Vec<SpatialFeature>,
    by_key: AHashMap<String, usize>,
}

impl FeatureIndex {
    /// Index `features` by id. Features without an id are kept but cannot
    /// be looked up; on duplicate ids the first feature wins.
    pub fn new(features: Vec<SpatialFeature>) -> Self {
        let mut by_key = AHashMap::with_capacity(features.len());
        for (position, feature) in features.iter().enumerate() {
            let Some(key) = feature.id_string() else { continue };
            if by_key.contains_key(&key) {
                debug!(key = %key, "duplicate feature id, keeping the first one");
                continue;
            }
            by_key.insert(key, position);
        }
        Self { features, by_key }
    }

    #[inline] pub fn len(&self) -> usize { self.features.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }

    #[inline] pub fn features(&self) -> &[SpatialFeature] { &self.features }

    /// Dataset position of the feature with id `key`.
    #[inline] pub fn position(&self, key: &str) -> Option<usize> { self.by_key.get(key).copied() }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&SpatialFeature> {
        self.position(key).map(|position| &self.features[position])
    }

    /// Feature for `element`, `None` only when it is missing and
    /// `options.continue_on_missing` is set.
    pub fn resolve(&self, element: &ElementRef, options: ResolveOptions) -> Result<Option<Cow<'_, SpatialFeature>>, ResolveError> {
        let key = element.key();
        let Some(feature) = self.get(&key) else {
            if options.generate_nodes_if_not_found {
                if let Some(feature) = element.to_node_feature() {
                    return Ok(Some(Cow::Owned(feature)));
                }
            }
            warn!(key = %key, "no geometry found for element, check the input files or the source data");
            if options.continue_on_missing { return Ok(None) }
            return Err(ResolveError::MissingGeometry { key });
        };

        if feature.kind() == GeometryKind::GeometryCollection {
            return Err(ResolveError::UnsupportedGeometry { key });
        }
        Ok(Some(Cow::Borrowed(feature)))
    }

    /// Resolve every element in order, skipping or failing on missing ones
    /// as `options` dictate.
    pub fn resolve_all(&self, elements: &[ElementRef], options: ResolveOptions) -> Result<Vec<Cow<'_, SpatialFeature>>, ResolveError> {
        let mut resolved = Vec::with_capacity(elements.len());
        for element in elements {
            if let Some(feature) = self.resolve(element, options)? {
                resolved.push(feature);
            }
        }
        Ok(resolved)
    }
}
