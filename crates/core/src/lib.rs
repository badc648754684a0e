//! Pure check logic for `sqlcheck`.
//!
//! Nothing in this crate touches a database: the `db` crate feeds rows in,
//! the `cli` crate turns the outcome into output and an exit code.

pub mod error;
pub mod reducer;
pub mod severity;
pub mod threshold;
pub mod unquote;
