mod geojson;
mod report;

pub use self::geojson::{read_features, read_records, write_features, write_residences};
pub use self::report::write_reports;
