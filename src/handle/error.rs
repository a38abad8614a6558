//! Handle-level errors.

use thiserror::Error;

use crate::cursor::CursorError;
use crate::diag::{DiagnosticRecord, sqlstate};
use crate::executor::ExecutorError;
use crate::sql::SyntaxError;

/// Errors returned by connection and statement entry points.
///
/// Every variant maps to one SQLSTATE. The failing handle records the error
/// in its diagnostics before returning it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HandleError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    Cursor(#[from] CursorError),

    /// A failure requested by the behavior configuration.
    #[error("{message}")]
    Injected {
        sqlstate: String,
        message: &'static str,
        /// Number of diagnostic records to report.
        records: usize,
    },

    #[error("Connection not open")]
    ConnectionNotOpen,

    #[error("Connection already open")]
    AlreadyConnected,

    #[error("Maximum connections exceeded")]
    MaxConnections,

    #[error("Statement not prepared")]
    NotPrepared,

    #[error("Parameter number must be >= 1")]
    InvalidParameterNumber,
}

impl HandleError {
    pub fn sqlstate(&self) -> &str {
        match self {
            HandleError::Syntax(_) => sqlstate::SYNTAX_ERROR,
            HandleError::Executor(e) => e.sqlstate(),
            HandleError::Cursor(e) => e.sqlstate(),
            HandleError::Injected { sqlstate, .. } => sqlstate,
            HandleError::ConnectionNotOpen => sqlstate::CONNECTION_NOT_OPEN,
            HandleError::AlreadyConnected | HandleError::NotPrepared => {
                sqlstate::FUNCTION_SEQUENCE_ERROR
            }
            HandleError::MaxConnections => sqlstate::CONNECTION_FAILURE,
            HandleError::InvalidParameterNumber => sqlstate::INVALID_DESCRIPTOR_INDEX,
        }
    }

    /// The diagnostic records this error produces.
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        match self {
            HandleError::Injected {
                sqlstate,
                message,
                records,
            } => (1..=*records)
                .map(|n| {
                    if n == 1 {
                        DiagnosticRecord::new(sqlstate.as_str(), *message)
                    } else {
                        DiagnosticRecord::new(
                            sqlstate.as_str(),
                            format!("{message} (record {n} of {records})"),
                        )
                    }
                })
                .collect(),
            other => vec![DiagnosticRecord::new(other.sqlstate(), other.to_string())],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::Span;

    #[test]
    fn test_sqlstates() {
        assert_eq!(HandleError::ConnectionNotOpen.sqlstate(), "08003");
        assert_eq!(HandleError::AlreadyConnected.sqlstate(), "HY010");
        assert_eq!(HandleError::MaxConnections.sqlstate(), "08001");
        assert_eq!(HandleError::InvalidParameterNumber.sqlstate(), "07009");
        assert_eq!(
            HandleError::from(SyntaxError::new("bad", Span::at(0))).sqlstate(),
            "42000"
        );
        assert_eq!(HandleError::from(CursorError::NoCurrentRow).sqlstate(), "24000");
    }

    #[test]
    fn test_injected_records() {
        let err = HandleError::Injected {
            sqlstate: "08S01".into(),
            message: "Simulated fetch failure",
            records: 3,
        };
        let records = err.records();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.sqlstate == "08S01"));
        assert_eq!(records[0].message, "Simulated fetch failure");
        assert_eq!(records[2].message, "Simulated fetch failure (record 3 of 3)");
    }
}
