use geoverlap::GeometryKind;

/// A feature that cannot be read as the record it is declared as.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("feature {subject} has no geometry")]
    MissingGeometry { subject: String },
    #[error("feature {subject} has an invalid geometry: {reason}")]
    Geometry { subject: String, reason: String },
    #[error("{record} feature without an id")]
    MissingId { record: &'static str },
    #[error("{record} {subject} cannot hold a {found} geometry")]
    WrongKind { subject: String, record: &'static str, found: GeometryKind },
    #[error("{record} {subject} has no `{key}` property")]
    MissingProperty { subject: String, record: &'static str, key: String },
}
