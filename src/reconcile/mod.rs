mod batch;
mod bucket;
mod stream;
mod zone;

pub use batch::{reconcile_zones, Reconciliation};
pub use bucket::{BuildingUnit, MatchResult};
pub use stream::{draws, Draws, PlaceStream};
pub use zone::ZoneReconciler;
