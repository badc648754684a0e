//! Database access for `sqlcheck`: open a connection by logical driver name
//! and run the check query through the core result reducer.

pub mod driver;
pub mod error;
pub mod query;

pub use driver::{connect, connect_options, ConnectionSettings, DbConnection, DbOptions, Driver};
pub use error::{DbError, QueryError};
pub use query::{fetch_measurement, run_check_query};
