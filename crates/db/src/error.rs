use std::time::Duration;

use sqlcheck_core::error::ExtractionError;

/// Failure to turn connection settings into an open connection.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("unsupported driver: {0}")]
    UnsupportedDriver(String),

    /// The URL itself is not echoed: it may carry a password.
    #[error("invalid database URL: {0}")]
    InvalidUrl(&'static str),

    #[error("invalid database URL: {0}")]
    Options(#[source] sqlx::Error),

    #[error("Database error: {0}")]
    Connect(#[from] sqlx::Error),
}

/// Failure while executing the check query or reading its result.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Connect(#[from] DbError),

    #[error("prepare failed: {0}")]
    Prepare(#[source] sqlx::Error),

    #[error("fetch failed: {0}")]
    Fetch(#[source] sqlx::Error),

    #[error("cannot read column {column} as text: {source}")]
    Decode {
        column: usize,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Extract(#[from] ExtractionError),

    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    /// Closing the connection failed. A prior failure, if any, is kept in
    /// `primary` so neither is lost.
    #[error("{}", release_message(.primary, .source))]
    Release {
        primary: Option<Box<QueryError>>,
        #[source]
        source: sqlx::Error,
    },
}

fn release_message(primary: &Option<Box<QueryError>>, source: &sqlx::Error) -> String {
    match primary {
        Some(primary) => format!("{primary}; closing connection failed: {source}"),
        None => format!("closing connection failed: {source}"),
    }
}
