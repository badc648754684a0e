use sqlcheck_core::error::ThresholdError;
use sqlcheck_core::severity::Severity;
use sqlcheck_db::QueryError;

/// Invalid flags or environment. Detected before connecting.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("--warning error: {0}")]
    Warning(#[source] ThresholdError),

    #[error("--critical error: {0}")]
    Critical(#[source] ThresholdError),

    #[error("--query is required")]
    MissingQuery,

    #[error("--timeout-secs must be greater than zero")]
    ZeroTimeout,
}

/// Any failure that stops a check run from producing a measurement.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("open db error: {0}")]
    Open(#[source] QueryError),

    #[error("query error: {0}")]
    Query(#[source] QueryError),

    #[error("read error: {0}")]
    Read(#[source] QueryError),
}

impl CheckError {
    /// Configuration problems are CRITICAL; a check that could not read its
    /// measurement is UNKNOWN.
    pub fn severity(&self) -> Severity {
        match self {
            CheckError::Config(_) => Severity::Critical,
            CheckError::Open(_) | CheckError::Query(_) | CheckError::Read(_) => Severity::Unknown,
        }
    }
}

impl From<QueryError> for CheckError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Connect(_) => CheckError::Open(err),
            QueryError::Prepare(_) | QueryError::Fetch(_) | QueryError::Timeout(_) => {
                CheckError::Query(err)
            }
            QueryError::Decode { .. } | QueryError::Extract(_) | QueryError::Release { .. } => {
                CheckError::Read(err)
            }
        }
    }
}
