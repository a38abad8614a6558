//! SQLSTATE codes and per-handle diagnostic records.

use std::fmt;

/// SQLSTATE codes raised by the driver.
pub mod sqlstate {
    /// String data, right truncated (warning).
    pub const STRING_TRUNCATED: &str = "01004";
    /// Wrong number of parameters / invalid descriptor index.
    pub const INVALID_DESCRIPTOR_INDEX: &str = "07009";
    /// Client unable to establish connection.
    pub const CONNECTION_FAILURE: &str = "08001";
    /// Connection not open.
    pub const CONNECTION_NOT_OPEN: &str = "08003";
    /// Numeric value out of range.
    pub const NUMERIC_OUT_OF_RANGE: &str = "22003";
    /// Invalid character value for cast specification.
    pub const INVALID_CHARACTER_VALUE: &str = "22018";
    /// Invalid cursor state.
    pub const INVALID_CURSOR_STATE: &str = "24000";
    /// Syntax error or access violation.
    pub const SYNTAX_ERROR: &str = "42000";
    /// Base table or view already exists.
    pub const TABLE_EXISTS: &str = "42S01";
    /// Base table or view not found.
    pub const TABLE_NOT_FOUND: &str = "42S02";
    /// Column not found.
    pub const COLUMN_NOT_FOUND: &str = "42S22";
    /// General error.
    pub const GENERAL_ERROR: &str = "HY000";
    /// Function sequence error.
    pub const FUNCTION_SEQUENCE_ERROR: &str = "HY010";
    /// Fetch type out of range.
    pub const FETCH_TYPE_OUT_OF_RANGE: &str = "HY106";
    /// Optional feature not implemented.
    pub const NOT_IMPLEMENTED: &str = "HYC00";
}

/// Default number of records a handle keeps.
pub const DEFAULT_CAPACITY: usize = 32;

/// One diagnostic record attached to a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub sqlstate: String,
    pub native_error: i32,
    pub message: String,
}

impl DiagnosticRecord {
    pub fn new(sqlstate: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sqlstate: sqlstate.into(),
            native_error: 0,
            message: message.into(),
        }
    }
}

impl fmt::Display for DiagnosticRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.sqlstate, self.message)
    }
}

/// A bounded append-only log of diagnostic records.
///
/// Records past the capacity are dropped; the first records of a failure are
/// the ones callers read.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    records: Vec<DiagnosticRecord>,
    capacity: usize,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Diagnostics {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            capacity,
        }
    }

    /// Appends a record if there is room.
    pub fn push(&mut self, record: DiagnosticRecord) {
        if self.records.len() < self.capacity {
            self.records.push(record);
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Returns the 1-based record `number`, as `SQLGetDiagRec` does.
    pub fn get(&self, number: usize) -> Option<&DiagnosticRecord> {
        number.checked_sub(1).and_then(|i| self.records.get(i))
    }

    pub fn records(&self) -> &[DiagnosticRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_log() {
        let mut diags = Diagnostics::with_capacity(2);
        for i in 0..5 {
            diags.push(DiagnosticRecord::new(sqlstate::GENERAL_ERROR, format!("e{i}")));
        }
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.get(1).map(|r| r.message.as_str()), Some("e0"));
        assert_eq!(diags.get(2).map(|r| r.message.as_str()), Some("e1"));
        assert!(diags.get(0).is_none());
        assert!(diags.get(3).is_none());

        diags.clear();
        assert!(diags.is_empty());
    }

    #[test]
    fn test_record_display() {
        let record = DiagnosticRecord::new(sqlstate::TABLE_NOT_FOUND, "no such table");
        assert_eq!(record.to_string(), "[42S02] no such table");
        assert_eq!(record.native_error, 0);
    }
}
