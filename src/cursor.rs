//! Result cursors and caller buffer bindings.
//!
//! A [`CursorState`] owns the materialized result of one execution and the
//! position within it. Fetched rows are pushed into bound
//! [`TargetBuffer`]s by [`transfer_row`], or pulled one column at a time with
//! [`transfer_cell`].

mod binding;
mod error;
mod state;
mod transfer;

pub use binding::{
    Bindings, BufferValue, CType, ColumnBuffer, Indicator, ParamBuffer, TargetBuffer, param,
};
pub use error::CursorError;
pub use state::{CursorState, CursorType, FetchOrientation};
pub use transfer::{Transfer, transfer_cell, transfer_row};
