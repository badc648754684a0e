//! Reduce a tabular query result to a single measurement.
//!
//! Only the first column of the first row is ever parsed. Extra columns and
//! extra rows are tolerated: each one is logged at WARN and recorded as an
//! [`Advisory`], but never changes the measurement. A result with no columns
//! or no rows is an error.
//!
//! [`ResultReducer`] is the incremental form so a caller holding a live row
//! stream can feed rows one at a time; [`reduce`] drives it over an
//! in-memory [`QueryResult`].

use std::fmt;

use crate::error::ExtractionError;
use crate::unquote::unquote;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A fully materialised query result: column names and text rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }
}

/// A tolerated oddity in the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// The result had more than one column; `ignored` columns were skipped.
    ExtraColumns { ignored: usize },
    /// Row number `row` (1-based) came after the first and was skipped.
    ExtraRow { row: usize },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::ExtraColumns { ignored } => {
                write!(f, "extra columns ignored ({ignored})")
            }
            Advisory::ExtraRow { row } => write!(f, "extra row {row} ignored"),
        }
    }
}

/// The measurement plus every advisory raised while reading it.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub measurement: f64,
    pub advisories: Vec<Advisory>,
}

// ---------------------------------------------------------------------------
// ResultReducer
// ---------------------------------------------------------------------------

/// Incremental reducer. Create with the column names, push every row in
/// order, then call [`finish`](ResultReducer::finish).
#[derive(Debug)]
pub struct ResultReducer {
    unquote: bool,
    rows_seen: usize,
    measurement: Option<f64>,
    advisories: Vec<Advisory>,
}

impl ResultReducer {
    /// Start a reduction over a result with the given columns.
    ///
    /// Fails with [`ExtractionError::NoColumns`] when `columns` is empty.
    pub fn new(columns: &[String], unquote: bool) -> Result<Self, ExtractionError> {
        let mut advisories = Vec::new();

        match columns.len() {
            0 => return Err(ExtractionError::NoColumns),
            1 => tracing::debug!(?columns, "Got column"),
            n => {
                tracing::warn!(
                    ?columns,
                    "Expected to have only one column. First column will be used"
                );
                advisories.push(Advisory::ExtraColumns { ignored: n - 1 });
            }
        }

        Ok(Self {
            unquote,
            rows_seen: 0,
            measurement: None,
            advisories,
        })
    }

    /// Feed the next row.
    ///
    /// The first row is parsed into the measurement; later rows only raise an
    /// [`Advisory::ExtraRow`].
    pub fn push_row(&mut self, cells: &[String]) -> Result<(), ExtractionError> {
        self.rows_seen += 1;
        let row = self.rows_seen;

        if row > 1 {
            tracing::warn!(row, values = ?cells, "Query returned more than one row. Skipped");
            self.advisories.push(Advisory::ExtraRow { row });
            return Ok(());
        }

        tracing::debug!(row, values = ?cells, "First row");
        let cell = cells.first().ok_or(ExtractionError::NoColumns)?;
        self.measurement = Some(parse_measurement(cell, self.unquote)?);
        Ok(())
    }

    /// Number of rows pushed so far.
    pub fn rows_seen(&self) -> usize {
        self.rows_seen
    }

    /// Finish the reduction. Fails with [`ExtractionError::NoRows`] if no
    /// row was pushed.
    pub fn finish(self) -> Result<Reduction, ExtractionError> {
        let measurement = self.measurement.ok_or(ExtractionError::NoRows)?;
        Ok(Reduction {
            measurement,
            advisories: self.advisories,
        })
    }
}

/// Reduce an in-memory result. Every row is visited, even after the
/// measurement is known.
pub fn reduce(result: QueryResult, unquote: bool) -> Result<Reduction, ExtractionError> {
    let QueryResult { columns, rows } = result;

    let mut reducer = ResultReducer::new(&columns, unquote)?;
    for row in &rows {
        reducer.push_row(row)?;
    }
    reducer.finish()
}

fn parse_measurement(cell: &str, unquote_first: bool) -> Result<f64, ExtractionError> {
    let text = if unquote_first {
        unquote(cell)?
    } else {
        cell.to_string()
    };

    text.parse::<f64>()
        .map_err(|_| ExtractionError::NotANumber(text))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
