//! One check run: query, reduce, classify, render.

use sqlcheck_core::severity::{classify, CheckReport, Severity};
use sqlcheck_db::run_check_query;

use crate::config::CheckConfig;
use crate::error::CheckError;

/// Run the configured query and classify its measurement.
pub async fn run(config: &CheckConfig) -> Result<CheckReport, CheckError> {
    let reduction = run_check_query(
        &config.connection,
        &config.query,
        &config.query_args,
        config.unquote,
        config.timeout,
    )
    .await?;

    tracing::debug!(
        measurement = reduction.measurement,
        advisories = reduction.advisories.len(),
        "Query result reduced"
    );

    Ok(classify(
        reduction.measurement,
        &config.warning,
        &config.critical,
    ))
}

/// Status line and severity for any outcome of a run.
pub fn render(outcome: &Result<CheckReport, CheckError>) -> (String, Severity) {
    match outcome {
        Ok(report) => (report.to_string(), report.severity),
        Err(err) => {
            let severity = err.severity();
            (format!("{severity}: {err}"), severity)
        }
    }
}
