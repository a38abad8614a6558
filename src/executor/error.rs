//! Executor-specific errors.

use thiserror::Error;

use crate::diag::sqlstate;
use crate::sql::SyntaxError;

/// Errors that can occur during query execution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutorError {
    /// The statement could not be classified.
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// Referenced table does not exist.
    #[error("table \"{name}\" does not exist")]
    TableNotFound { name: String },

    /// CREATE TABLE on a name already in use.
    #[error("table \"{name}\" already exists")]
    TableExists { name: String },

    /// Referenced column does not exist.
    #[error("column \"{name}\" does not exist in table \"{table}\"")]
    ColumnNotFound { table: String, name: String },
}

impl ExecutorError {
    /// Returns the SQLSTATE reported for this error.
    pub fn sqlstate(&self) -> &'static str {
        match self {
            ExecutorError::Syntax(_) => sqlstate::SYNTAX_ERROR,
            ExecutorError::TableNotFound { .. } => sqlstate::TABLE_NOT_FOUND,
            ExecutorError::TableExists { .. } => sqlstate::TABLE_EXISTS,
            ExecutorError::ColumnNotFound { .. } => sqlstate::COLUMN_NOT_FOUND,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::Span;

    #[test]
    fn test_sqlstates() {
        let syntax = ExecutorError::from(SyntaxError::new("bad", Span::at(0)));
        assert_eq!(syntax.sqlstate(), "42000");
        assert_eq!(
            ExecutorError::TableNotFound { name: "X".into() }.sqlstate(),
            "42S02"
        );
        assert_eq!(
            ExecutorError::TableExists { name: "X".into() }.sqlstate(),
            "42S01"
        );
        assert_eq!(
            ExecutorError::ColumnNotFound {
                table: "T".into(),
                name: "C".into()
            }
            .to_string(),
            "column \"C\" does not exist in table \"T\""
        );
    }
}
