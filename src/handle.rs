//! Driver entry points.
//!
//! This module provides the handle layer callers drive: a [`Session`]
//! holds the catalog and behavior configuration, [`Connection`]s are
//! allocated from it, and [`Statement`]s from a connection.
//!
//! ```text
//! Session ──< Connection ──< Statement
//!    │                           │
//!    ├── Catalog  <── execute ───┤
//!    └── Behavior <── gate ──────┘
//! ```
//!
//! Every call clears the handle's diagnostics first. A failing call appends
//! one or more [`DiagnosticRecord`](crate::diag::DiagnosticRecord)s and
//! returns [`HandleError`]; a truncating call appends an `01004` warning and
//! returns [`Completion::SuccessWithInfo`].

mod completion;
mod connection;
mod error;
mod session;
mod statement;

pub use completion::Completion;
pub use connection::{Connection, EndTransaction};
pub use error::HandleError;
pub use session::Session;
pub use statement::{FreeStmtOption, Statement};
