/// A threshold spec that could not be parsed.
///
/// Every variant carries the spec text exactly as the operator supplied it so
/// the message can be echoed back unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThresholdError {
    #[error("malformed threshold {spec:?}: {reason}")]
    Malformed { spec: String, reason: &'static str },

    #[error("invalid number {token:?} in threshold {spec:?}")]
    InvalidNumber { spec: String, token: String },

    #[error("threshold {spec:?} has start {start} greater than end {end}")]
    Reversed { spec: String, start: f64, end: f64 },

    #[error("threshold {spec:?} does not name any bound; leave it empty for no threshold")]
    MissingBound { spec: String },
}

/// Failure to reduce a query result to a single measurement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("No columns returned")]
    NoColumns,

    #[error("No rows returned")]
    NoRows,

    #[error("value {0:?} is not a number")]
    NotANumber(String),

    #[error("cannot unquote value {0:?}")]
    UnquoteFailed(String),
}
