#![doc = "Placematch public API"]
//! Matches dwellings declared per zone, per building entrance and per
//! cadastral (land role) record when the datasets share no identifier,
//! using spatial overlap and approximate counts only.
mod common;
mod config;
mod diagnostics;
mod reconcile;
mod resolve;
mod types;

#[doc(inline)]
pub use common::io::{read_features, read_records, write_features, write_reports, write_residences};

#[doc(inline)]
pub use config::{FieldMapping, ReconcileConfig};

#[doc(inline)]
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};

#[doc(inline)]
pub use reconcile::{draws, reconcile_zones, BuildingUnit, Draws, MatchResult, PlaceStream, Reconciliation, ZoneReconciler};

#[doc(inline)]
pub use resolve::{ElementRef, FeatureIndex, ResolveError, ResolveOptions};

#[doc(inline)]
pub use types::{BuildingRecord, EntranceRecord, LandRoleRecord, RecordError, Residence, SpatialFeature, ZoneRecord};

pub use geoverlap;
