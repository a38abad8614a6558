//! Query execution engine.
//!
//! This module turns a classified statement into a materialized result set
//! against the in-memory catalog.
//!
//! # Architecture
//!
//! ```text
//! Query (from sql::parse_sql)
//!       |
//! [runner::execute]
//!   ├── DDL: add/remove catalog tables
//!   ├── literal SELECT: evaluate expressions into one row
//!   ├── table SELECT: inserted rows or generated rows
//!   │     └── Predicate (WHERE col = v / col IN (...), ORDER BY col)
//!   │           └── projection
//!   └── INSERT / UPDATE / DELETE
//!       |
//! QueryResult (columns + rows + affected count)
//! ```
//!
//! # Components
//!
//! - [`execute`]: statement dispatch
//! - [`generate_value`] / [`generate_mock_data`]: deterministic mock rows
//! - [`Predicate`]: interpreted WHERE/ORDER BY tail
//! - [`introspect`]: catalog function result sets
//! - [`ColumnDesc`]: result column metadata

mod column;
mod error;
mod generate;
pub mod introspect;
mod predicate;
mod runner;

pub use column::ColumnDesc;
pub use error::ExecutorError;
pub use generate::{generate_mock_data, generate_value};
pub use predicate::{Filter, Predicate, SortKey};
pub use runner::{ExecOptions, QueryResult, execute};
