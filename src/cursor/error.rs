//! Cursor and data transfer errors.

use thiserror::Error;

use crate::diag::sqlstate;

/// Errors raised by cursor movement and cell conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// Fetch or get-data on a statement with no result.
    #[error("statement has no result set")]
    NotExecuted,

    /// Close on a statement whose cursor is not open.
    #[error("cursor not open")]
    NotOpen,

    /// Get-data with no row positioned.
    #[error("no current row")]
    NoCurrentRow,

    /// Scrolling orientation on a forward-only cursor.
    #[error("fetch orientation {0} requires a scrollable cursor")]
    FetchTypeOutOfRange(&'static str),

    /// Column or parameter ordinal outside the valid range.
    #[error("invalid descriptor index {0}")]
    InvalidIndex(usize),

    /// Character data that does not parse as the numeric target type.
    #[error("invalid character value for cast: '{0}'")]
    InvalidCharacterValue(String),

    /// Numeric value that does not fit the target type.
    #[error("numeric value {0} out of range")]
    NumericOutOfRange(String),
}

impl CursorError {
    pub fn sqlstate(&self) -> &'static str {
        match self {
            CursorError::NotExecuted => sqlstate::FUNCTION_SEQUENCE_ERROR,
            CursorError::NotOpen | CursorError::NoCurrentRow => sqlstate::INVALID_CURSOR_STATE,
            CursorError::FetchTypeOutOfRange(_) => sqlstate::FETCH_TYPE_OUT_OF_RANGE,
            CursorError::InvalidIndex(_) => sqlstate::INVALID_DESCRIPTOR_INDEX,
            CursorError::InvalidCharacterValue(_) => sqlstate::INVALID_CHARACTER_VALUE,
            CursorError::NumericOutOfRange(_) => sqlstate::NUMERIC_OUT_OF_RANGE,
        }
    }
}
