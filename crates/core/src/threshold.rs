//! Nagios plugin threshold ranges.
//!
//! A threshold spec is `[@]start:end`, `[@]start:`, `[@]:end` or a bare
//! `[@]N` (short for `0:N`). Both bounds are inclusive. A value outside the
//! range raises an alert; the `@` prefix inverts this so a value inside the
//! range alerts instead. `~` as the start means negative infinity.
//!
//! An empty spec means "no threshold configured" and never alerts.
//!
//! Unlike the Nagios plugin guidelines, a range that names no bound at all
//! (`:`, `~:`, `@`, `@:`) is rejected with [`ThresholdError::MissingBound`]
//! instead of being read as the whole number line, which never alerts (or,
//! inverted, always alerts). Use an empty spec to switch a threshold off.

use std::fmt;
use std::str::FromStr;

use crate::error::ThresholdError;

/// Separator between the start and end of a range.
const RANGE_SEPARATOR: char = ':';
/// Prefix that inverts a range.
const INVERT_PREFIX: char = '@';
/// Start token for an unbounded-below range.
const NEG_INFINITY_TOKEN: &str = "~";

// ---------------------------------------------------------------------------
// ThresholdRange
// ---------------------------------------------------------------------------

/// A parsed, non-empty threshold range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdRange {
    /// Alert when the value is inside the range rather than outside.
    pub inverted: bool,
    /// Inclusive lower bound, `f64::NEG_INFINITY` when unbounded.
    pub lower: f64,
    /// Inclusive upper bound, `f64::INFINITY` when unbounded.
    pub upper: f64,
}

impl ThresholdRange {
    /// Whether `value` lies within `[lower, upper]`.
    ///
    /// `NaN` is never inside a range.
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// Whether `value` meets the alert condition for this range.
    pub fn is_violated(&self, value: f64) -> bool {
        if self.inverted {
            self.contains(value)
        } else {
            !self.contains(value)
        }
    }
}

impl fmt::Display for ThresholdRange {
    /// Canonical `[@]start:end` form. Unbounded sides are written as `~`
    /// (start) or left empty (end).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverted {
            write!(f, "{INVERT_PREFIX}")?;
        }
        if self.lower == f64::NEG_INFINITY {
            write!(f, "{NEG_INFINITY_TOKEN}")?;
        } else {
            write!(f, "{}", self.lower)?;
        }
        write!(f, "{RANGE_SEPARATOR}")?;
        if self.upper != f64::INFINITY {
            write!(f, "{}", self.upper)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Threshold
// ---------------------------------------------------------------------------

/// A warning or critical threshold as configured by the operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Threshold {
    /// No threshold configured. Never alerts.
    #[default]
    Unset,
    /// A parsed range together with the spec text it came from.
    Range { range: ThresholdRange, spec: String },
}

impl Threshold {
    /// Parse a threshold spec.
    ///
    /// Surrounding whitespace is ignored, so a blank spec is [`Threshold::Unset`].
    pub fn parse(spec: &str) -> Result<Self, ThresholdError> {
        let text = spec.trim();
        if text.is_empty() {
            return Ok(Threshold::Unset);
        }

        let range = parse_range(text)?;
        Ok(Threshold::Range {
            range,
            spec: text.to_string(),
        })
    }

    /// Whether `value` meets the alert condition.
    ///
    /// [`Threshold::Unset`] returns `false` for every value, including `NaN`
    /// and infinities.
    pub fn is_violated(&self, value: f64) -> bool {
        match self {
            Threshold::Unset => false,
            Threshold::Range { range, .. } => range.is_violated(value),
        }
    }

    /// The parsed range, if one is configured.
    pub fn range(&self) -> Option<&ThresholdRange> {
        match self {
            Threshold::Unset => None,
            Threshold::Range { range, .. } => Some(range),
        }
    }
}

impl FromStr for Threshold {
    type Err = ThresholdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Threshold::parse(s)
    }
}

impl fmt::Display for Threshold {
    /// Echoes the spec exactly as configured (trimmed).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Unset => Ok(()),
            Threshold::Range { spec, .. } => f.write_str(spec),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn parse_range(spec: &str) -> Result<ThresholdRange, ThresholdError> {
    let (inverted, body) = match spec.strip_prefix(INVERT_PREFIX) {
        Some(rest) => (true, rest),
        None => (false, spec),
    };

    let (lower, upper) = match body.split_once(RANGE_SEPARATOR) {
        None => {
            if body.is_empty() {
                return Err(ThresholdError::MissingBound {
                    spec: spec.to_string(),
                });
            }
            (0.0, parse_bound(spec, body)?)
        }
        Some((start, end)) => {
            if end.contains(RANGE_SEPARATOR) {
                return Err(ThresholdError::Malformed {
                    spec: spec.to_string(),
                    reason: "more than one ':' separator",
                });
            }

            let lower = match start {
                "" | NEG_INFINITY_TOKEN => f64::NEG_INFINITY,
                token => parse_bound(spec, token)?,
            };
            let upper = match end {
                "" => f64::INFINITY,
                token => parse_bound(spec, token)?,
            };

            if lower == f64::NEG_INFINITY && upper == f64::INFINITY {
                return Err(ThresholdError::MissingBound {
                    spec: spec.to_string(),
                });
            }
            (lower, upper)
        }
    };

    if lower > upper {
        return Err(ThresholdError::Reversed {
            spec: spec.to_string(),
            start: lower,
            end: upper,
        });
    }

    Ok(ThresholdRange {
        inverted,
        lower,
        upper,
    })
}

/// Parse one finite decimal bound. `inf`/`nan` spellings are rejected.
fn parse_bound(spec: &str, token: &str) -> Result<f64, ThresholdError> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ThresholdError::InvalidNumber {
            spec: spec.to_string(),
            token: token.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
