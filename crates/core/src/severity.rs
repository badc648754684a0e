//! Check severity, exit codes and the one-line status report.

use std::fmt;

use crate::threshold::Threshold;

/// Nagios/Sensu check state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    /// The check itself is broken (bad query, unreadable result, ...).
    Unknown,
}

impl Severity {
    /// Process exit code expected by the check framework.
    pub fn exit_code(self) -> u8 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
            Severity::Unknown => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub severity: Severity,
    pub measurement: f64,
    /// Spec text of the threshold that was violated, if any.
    pub violated: Option<String>,
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: result is {:.6}", self.severity, self.measurement)?;
        if let Some(spec) = &self.violated {
            write!(f, " which is out of {spec}")?;
        }
        Ok(())
    }
}

/// Classify a measurement. Critical is checked before warning.
pub fn classify(measurement: f64, warning: &Threshold, critical: &Threshold) -> CheckReport {
    let (severity, violated) = if critical.is_violated(measurement) {
        (Severity::Critical, Some(critical.to_string()))
    } else if warning.is_violated(measurement) {
        (Severity::Warning, Some(warning.to_string()))
    } else {
        (Severity::Ok, None)
    };

    CheckReport {
        severity,
        measurement,
        violated,
    }
}
