//! Run the check query and reduce its rows to a measurement.
//!
//! The row stream is fed straight into [`ResultReducer`] so the result is
//! never materialised. The connection is owned for the whole call and is
//! closed exactly once before returning, on success and on failure.
//!
//! Only the first cell of each row is ever decoded. Extra columns are
//! counted from the prepared statement and otherwise left untouched, so
//! their types never matter.

use std::time::Duration;

use futures::{Stream, TryStreamExt};
use sqlx::mysql::{MySqlConnection, MySqlRow};
use sqlx::postgres::{PgConnection, PgRow, PgValueFormat};
use sqlx::{Column, ColumnIndex, Connection, Decode, Executor, Row, Statement, Type, TypeInfo, ValueRef};

use sqlcheck_core::reducer::{Reduction, ResultReducer};

use crate::driver::{connect, ConnectionSettings, DbConnection};
use crate::error::QueryError;

/// Connect, run `query` with `args` and reduce the result, all within
/// `timeout`.
///
/// On timeout the in-flight work is dropped, which drops the connection.
pub async fn run_check_query(
    settings: &ConnectionSettings,
    query: &str,
    args: &[String],
    unquote: bool,
    timeout: Duration,
) -> Result<Reduction, QueryError> {
    let work = async {
        let conn = connect(settings).await?;
        fetch_measurement(conn, query, args, unquote).await
    };

    tokio::time::timeout(timeout, work)
        .await
        .map_err(|_| QueryError::Timeout(timeout))?
}

/// Run `query` on `conn` and reduce the result, then close `conn`.
///
/// Arguments are bound as text. MySQL converts them where a number is
/// expected; PostgreSQL needs an explicit cast in the query, e.g.
/// `WHERE id = $1::text::integer`.
///
/// A close failure is reported even when the reduction succeeded, and is
/// joined onto (not substituted for) an earlier failure.
pub async fn fetch_measurement(
    conn: DbConnection,
    query: &str,
    args: &[String],
    unquote: bool,
) -> Result<Reduction, QueryError> {
    match conn {
        DbConnection::MySql(conn) => fetch_on(conn, query, args, unquote).await,
        DbConnection::Postgres(conn) => fetch_on(conn, query, args, unquote).await,
    }
}

async fn fetch_on<C: CheckConnection>(
    mut conn: C,
    query: &str,
    args: &[String],
    unquote: bool,
) -> Result<Reduction, QueryError> {
    let outcome = conn.read_measurement(query, args, unquote).await;
    let released = conn.release().await;
    join_release(outcome, released)
}

fn join_release(
    outcome: Result<Reduction, QueryError>,
    released: Result<(), sqlx::Error>,
) -> Result<Reduction, QueryError> {
    match (outcome, released) {
        (outcome, Ok(())) => outcome,
        (Ok(_), Err(source)) => Err(QueryError::Release {
            primary: None,
            source,
        }),
        (Err(primary), Err(source)) => Err(QueryError::Release {
            primary: Some(Box::new(primary)),
            source,
        }),
    }
}

// ---------------------------------------------------------------------------
// Per-driver execution
// ---------------------------------------------------------------------------

/// A connection the check query can run on.
trait CheckConnection: Sized {
    /// Prepare `query`, bind `args` and stream the rows into a reducer.
    async fn read_measurement(
        &mut self,
        query: &str,
        args: &[String],
        unquote: bool,
    ) -> Result<Reduction, QueryError>;

    /// Close the connection.
    async fn release(self) -> Result<(), sqlx::Error>;
}

/// Implement [`CheckConnection`] for a concrete sqlx connection, rendering
/// the first cell of each row with `$first_cell`.
macro_rules! impl_check_connection {
    ($conn:ty, $first_cell:path) => {
        impl CheckConnection for $conn {
            async fn read_measurement(
                &mut self,
                query: &str,
                args: &[String],
                unquote: bool,
            ) -> Result<Reduction, QueryError> {
                let statement = (&mut *self)
                    .prepare(query)
                    .await
                    .map_err(QueryError::Prepare)?;

                let columns = column_names(statement.columns());
                let mut reducer = ResultReducer::new(&columns, unquote)?;

                let mut bound = statement.query();
                for arg in args {
                    bound = bound.bind(arg.as_str());
                }

                feed_rows(&mut reducer, bound.fetch(&mut *self), $first_cell).await?;
                Ok(reducer.finish()?)
            }

            async fn release(self) -> Result<(), sqlx::Error> {
                Connection::close(self).await
            }
        }
    };
}

impl_check_connection!(MySqlConnection, mysql_first_cell);
impl_check_connection!(PgConnection, pg_first_cell);

fn column_names<C: Column>(columns: &[C]) -> Vec<String> {
    columns.iter().map(|c| c.name().to_string()).collect()
}

/// Drain `rows` into `reducer`. Every row is read, including the ones the
/// reducer only counts.
async fn feed_rows<R, S>(
    reducer: &mut ResultReducer,
    mut rows: S,
    first_cell: fn(&R) -> Result<String, sqlx::Error>,
) -> Result<(), QueryError>
where
    S: Stream<Item = Result<R, sqlx::Error>> + Unpin,
{
    while let Some(row) = rows.try_next().await.map_err(QueryError::Fetch)? {
        let value = first_cell(&row).map_err(|source| QueryError::Decode { column: 0, source })?;
        reducer.push_row(&[value])?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// First-cell rendering
// ---------------------------------------------------------------------------

/// Render a MySQL cell as text. `NULL` becomes the empty string.
///
/// Integers and floats arrive in binary form and are decoded. Everything
/// else, `DECIMAL` included, arrives as the value's own text.
fn mysql_first_cell(row: &MySqlRow) -> Result<String, sqlx::Error> {
    if row.try_get_raw(0)?.is_null() {
        return Ok(String::new());
    }

    if let Some(text) = decoded::<_, i64>(row)
        .or_else(|| decoded::<_, u64>(row))
        .or_else(|| decoded::<_, f64>(row))
        .or_else(|| decoded::<_, f32>(row))
    {
        return Ok(text);
    }

    lossy_text(row)
}

/// Render a PostgreSQL cell as text. `NULL` becomes the empty string.
fn pg_first_cell(row: &PgRow) -> Result<String, sqlx::Error> {
    let raw = row.try_get_raw(0)?;
    if raw.is_null() {
        return Ok(String::new());
    }

    if raw.type_info().name() == "NUMERIC" {
        let bytes = raw.as_bytes().map_err(sqlx::Error::Decode)?;
        return match raw.format() {
            PgValueFormat::Text => Ok(String::from_utf8_lossy(bytes).into_owned()),
            PgValueFormat::Binary => numeric_text(bytes)
                .ok_or_else(|| sqlx::Error::Decode("malformed NUMERIC value".into())),
        };
    }

    if let Some(text) = decoded::<_, i64>(row)
        .or_else(|| decoded::<_, i32>(row))
        .or_else(|| decoded::<_, i16>(row))
        .or_else(|| decoded::<_, f64>(row))
        .or_else(|| decoded::<_, f32>(row))
        .or_else(|| decoded::<_, bool>(row))
        .or_else(|| decoded::<_, String>(row))
    {
        return Ok(text);
    }

    lossy_text(row)
}

fn decoded<R, T>(row: &R) -> Option<String>
where
    R: Row,
    T: for<'r> Decode<'r, R::Database> + Type<R::Database> + ToString,
    usize: ColumnIndex<R>,
{
    row.try_get::<T, _>(0).ok().map(|value| value.to_string())
}

/// The cell's bytes as (lossy) UTF-8, regardless of its SQL type.
fn lossy_text<R>(row: &R) -> Result<String, sqlx::Error>
where
    R: Row,
    Vec<u8>: for<'r> Decode<'r, R::Database>,
    usize: ColumnIndex<R>,
{
    let bytes: Vec<u8> = row.try_get_unchecked(0)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// Decimal text of a binary PostgreSQL `NUMERIC`.
///
/// The wire form is four big-endian `u16` header words (digit count,
/// weight, sign, display scale) followed by base-10000 digits, the first of
/// which is scaled by `10000^weight`.
fn numeric_text(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let words: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|w| u16::from_be_bytes([w[0], w[1]]))
        .collect();
    let [ndigits, weight, sign, dscale, digits @ ..] = words.as_slice() else {
        return None;
    };
    if digits.len() != usize::from(*ndigits) {
        return None;
    }

    match *sign {
        NUMERIC_NAN => return Some("NaN".into()),
        NUMERIC_PINF => return Some("Infinity".into()),
        NUMERIC_NINF => return Some("-Infinity".into()),
        _ => {}
    }

    let weight = i32::from(*weight as i16);
    let digit = |index: i32| -> u16 {
        usize::try_from(index)
            .ok()
            .and_then(|i| digits.get(i).copied())
            .unwrap_or(0)
    };

    let mut text = String::new();
    if *sign == NUMERIC_NEG {
        text.push('-');
    }

    if weight < 0 {
        text.push('0');
    } else {
        text.push_str(&digit(0).to_string());
        for index in 1..=weight {
            text.push_str(&format!("{:04}", digit(index)));
        }
    }

    let scale = usize::from(*dscale);
    if scale > 0 {
        let mut fraction = String::new();
        let mut index = weight + 1;
        while fraction.len() < scale {
            fraction.push_str(&format!("{:04}", digit(index)));
            index += 1;
        }
        fraction.truncate(scale);
        text.push('.');
        text.push_str(&fraction);
    }

    Some(text)
}
