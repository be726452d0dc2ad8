mod error;
mod feature;
mod records;
mod residence;

pub use error::RecordError;
pub use feature::SpatialFeature;
pub use records::{BuildingRecord, EntranceRecord, LandRoleRecord, ZoneRecord};
pub use residence::Residence;
