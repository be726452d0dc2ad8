use std::path::Path;

use anyhow::{bail, Context, Result};
use geojson::{Feature, FeatureCollection, GeoJson};

use crate::{
    common::{read_file, write_file},
    types::{RecordError, Residence, SpatialFeature},
};

/// Parse GeoJSON bytes into features. A single Feature is accepted as a
/// collection of one.
pub(crate) fn read_from_geojson_bytes(bytes: &[u8]) -> Result<Vec<SpatialFeature>> {
    let text = std::str::from_utf8(bytes).context("GeoJSON is not valid UTF-8")?;
    let features = match text.parse::<GeoJson>().context("Failed to parse GeoJSON")? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => bail!("Expected a Feature or FeatureCollection, found a bare Geometry"),
    };

    features.into_iter().enumerate()
        .map(|(idx, feature)| SpatialFeature::try_from(feature).with_context(|| format!("Invalid feature at index {idx}")))
        .collect()
}

/// Serialize features as a FeatureCollection.
pub(crate) fn write_to_geojson_bytes(features: Vec<Feature>) -> Result<Vec<u8>> {
    let collection = FeatureCollection { bbox: None, features, foreign_members: None };
    serde_json::to_vec(&collection).context("Failed to serialize GeoJSON to bytes")
}

/// Read every feature of a GeoJSON file.
pub fn read_features(path: &Path) -> Result<Vec<SpatialFeature>> {
    read_from_geojson_bytes(&read_file(path)?)
        .with_context(|| format!("Failed to read GeoJSON file {}", path.display()))
}

/// Read a GeoJSON file as records of one kind.
pub fn read_records<T>(path: &Path, parse: impl Fn(SpatialFeature) -> Result<T, RecordError>) -> Result<Vec<T>> {
    read_features(path)?.into_iter()
        .map(|feature| parse(feature).with_context(|| format!("Invalid record in {}", path.display())))
        .collect()
}

pub fn write_features(path: &Path, features: &[SpatialFeature]) -> Result<()> {
    let bytes = write_to_geojson_bytes(features.iter().map(SpatialFeature::to_feature).collect())?;
    write_file(path, &bytes)
}

pub fn write_residences(path: &Path, residences: &[Residence]) -> Result<()> {
    let bytes = write_to_geojson_bytes(residences.iter().map(Residence::to_feature).collect())?;
    write_file(path, &bytes)
}
