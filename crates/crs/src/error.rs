#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CrsError {
    #[error("unknown coordinate reference system: {0}")]
    UnknownCrs(String),
    #[error("unsupported conversion from {from} to {to}")]
    UnsupportedConversion { from: String, to: String },
    #[error("invalid CRS configuration: {0}")]
    InvalidConfig(String),
}
