//! Statement cursor state machine.
//!
//! ```text
//! Unprepared --prepare--> Prepared --execute--> Executed --fetch*--> ...
//!      \___________exec_direct_____________/        |
//!                                                close_cursor
//!                                                   v
//!                                     Prepared (or Unprepared)
//! ```
//!
//! The position is `-1` before the first row and `len` after the last.

use tracing::trace;

use crate::cell::Row;
use crate::executor::{ColumnDesc, QueryResult};

use super::error::CursorError;

/// Direction of a `fetch_scroll` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrientation {
    Next,
    Prior,
    First,
    Last,
    /// 1-based row from the start; negative counts from the end, 0 is
    /// before the first row.
    Absolute(i64),
    /// Offset from the current position.
    Relative(i64),
}

impl FetchOrientation {
    pub fn name(&self) -> &'static str {
        match self {
            FetchOrientation::Next => "NEXT",
            FetchOrientation::Prior => "PRIOR",
            FetchOrientation::First => "FIRST",
            FetchOrientation::Last => "LAST",
            FetchOrientation::Absolute(_) => "ABSOLUTE",
            FetchOrientation::Relative(_) => "RELATIVE",
        }
    }
}

/// `SQL_ATTR_CURSOR_TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorType {
    ForwardOnly,
    #[default]
    Static,
}

/// Per-statement execution and cursor state.
#[derive(Debug, Clone)]
pub struct CursorState {
    sql: Option<String>,
    prepared: bool,
    executed: bool,
    open: bool,
    columns: Vec<ColumnDesc>,
    rows: Vec<Row>,
    position: i64,
    row_count: u64,
    cursor_type: CursorType,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            sql: None,
            prepared: false,
            executed: false,
            open: false,
            columns: Vec::new(),
            rows: Vec::new(),
            position: -1,
            row_count: 0,
            cursor_type: CursorType::default(),
        }
    }
}

impl CursorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sql(&self) -> Option<&str> {
        self.sql.as_deref()
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn is_executed(&self) -> bool {
        self.executed
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn columns(&self) -> &[ColumnDesc] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    pub fn cursor_type(&self) -> CursorType {
        self.cursor_type
    }

    pub fn set_cursor_type(&mut self, cursor_type: CursorType) {
        self.cursor_type = cursor_type;
    }

    /// Records validated SQL text for a later [`load`](Self::load).
    pub fn prepare(&mut self, sql: impl Into<String>) {
        self.discard_result();
        self.sql = Some(sql.into());
        self.prepared = true;
    }

    /// Records SQL text run without a prior prepare.
    pub fn set_direct(&mut self, sql: impl Into<String>) {
        self.sql = Some(sql.into());
        self.prepared = false;
    }

    /// Installs an execution result. The cursor opens only when there are
    /// rows to read.
    pub fn load(&mut self, result: QueryResult) {
        self.row_count = result.row_count();
        self.columns = result.columns;
        self.rows = result.rows;
        self.position = -1;
        self.executed = true;
        self.open = !self.rows.is_empty();
    }

    /// Moves the cursor and returns the row now under it, or `None` when the
    /// new position is outside the result (no data).
    pub fn fetch(&mut self, orientation: FetchOrientation) -> Result<Option<&Row>, CursorError> {
        if !self.executed {
            return Err(CursorError::NotExecuted);
        }
        if self.cursor_type == CursorType::ForwardOnly && orientation != FetchOrientation::Next {
            return Err(CursorError::FetchTypeOutOfRange(orientation.name()));
        }

        let len = self.rows.len() as i64;
        let target = match orientation {
            FetchOrientation::Next => self.position.saturating_add(1),
            FetchOrientation::Prior => self.position.saturating_sub(1),
            FetchOrientation::First => 0,
            FetchOrientation::Last => len - 1,
            FetchOrientation::Absolute(n) if n > 0 => n - 1,
            FetchOrientation::Absolute(n) if n < 0 => len.saturating_add(n),
            FetchOrientation::Absolute(_) => -1,
            FetchOrientation::Relative(n) => self.position.saturating_add(n),
        };

        self.position = if target < 0 {
            -1
        } else if target >= len {
            len
        } else {
            target
        };
        trace!(orientation = orientation.name(), position = self.position, rows = len, "fetch");

        Ok(self.current_row())
    }

    /// Returns the row under the cursor, if any.
    pub fn current_row(&self) -> Option<&Row> {
        usize::try_from(self.position)
            .ok()
            .and_then(|i| self.rows.get(i))
    }

    /// Closes an open cursor. The statement stays prepared.
    pub fn close(&mut self) -> Result<(), CursorError> {
        if !self.open {
            return Err(CursorError::NotOpen);
        }
        self.discard_result();
        Ok(())
    }

    /// Closes the cursor if it is open, without complaint otherwise.
    pub fn close_quietly(&mut self) {
        self.discard_result();
    }

    /// Stops iteration without discarding the materialized rows.
    pub fn cancel(&mut self) {
        self.open = false;
    }

    fn discard_result(&mut self) {
        self.open = false;
        self.executed = false;
        self.rows.clear();
        self.position = -1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    fn loaded(n: i64) -> CursorState {
        let mut state = CursorState::new();
        state.load(QueryResult {
            columns: vec![ColumnDesc::integer("N")],
            rows: (1..=n).map(|i| vec![Cell::Integer(i)]).collect(),
            affected_rows: 0,
        });
        state
    }

    fn fetched(state: &mut CursorState, o: FetchOrientation) -> Option<i64> {
        match state.fetch(o).unwrap() {
            Some(row) => match row[0] {
                Cell::Integer(n) => Some(n),
                _ => None,
            },
            None => None,
        }
    }

    #[test]
    fn test_forward_iteration() {
        let mut state = loaded(2);
        assert!(state.is_open());
        assert_eq!(fetched(&mut state, FetchOrientation::Next), Some(1));
        assert_eq!(fetched(&mut state, FetchOrientation::Next), Some(2));
        assert_eq!(fetched(&mut state, FetchOrientation::Next), None);
        assert_eq!(fetched(&mut state, FetchOrientation::Next), None);
        assert_eq!(state.position(), 2);
        assert!(state.is_open());
    }

    #[test]
    fn test_scroll_orientations() {
        let mut state = loaded(5);
        assert_eq!(fetched(&mut state, FetchOrientation::Last), Some(5));
        assert_eq!(fetched(&mut state, FetchOrientation::Prior), Some(4));
        assert_eq!(fetched(&mut state, FetchOrientation::First), Some(1));
        assert_eq!(fetched(&mut state, FetchOrientation::Absolute(3)), Some(3));
        assert_eq!(fetched(&mut state, FetchOrientation::Absolute(-1)), Some(5));
        assert_eq!(fetched(&mut state, FetchOrientation::Relative(-2)), Some(3));
        assert_eq!(fetched(&mut state, FetchOrientation::Relative(10)), None);
        assert_eq!(state.position(), 5);
        assert_eq!(fetched(&mut state, FetchOrientation::Absolute(-6)), None);
        assert_eq!(state.position(), -1);
        assert_eq!(fetched(&mut state, FetchOrientation::Prior), None);
        assert_eq!(state.position(), -1);
    }

    #[test]
    fn test_absolute_zero_is_before_first() {
        for n in [0, 1, 10] {
            let mut state = loaded(n);
            assert_eq!(fetched(&mut state, FetchOrientation::Absolute(0)), None);
            assert_eq!(state.position(), -1);
        }
    }

    #[test]
    fn test_empty_result_is_not_open() {
        let mut state = loaded(0);
        assert!(state.is_executed());
        assert!(!state.is_open());
        assert_eq!(fetched(&mut state, FetchOrientation::Next), None);
        assert_eq!(state.close(), Err(CursorError::NotOpen));
    }

    #[test]
    fn test_forward_only_rejects_scrolling() {
        let mut state = loaded(3);
        state.set_cursor_type(CursorType::ForwardOnly);
        let err = state.fetch(FetchOrientation::First).unwrap_err();
        assert_eq!(err.sqlstate(), "HY106");
        assert_eq!(fetched(&mut state, FetchOrientation::Next), Some(1));
    }

    #[test]
    fn test_close() {
        let mut state = CursorState::new();
        state.prepare("SELECT 1");
        state.load(QueryResult {
            columns: vec![ColumnDesc::integer("N")],
            rows: vec![vec![Cell::Integer(1)]],
            affected_rows: 0,
        });
        assert!(state.close().is_ok());
        assert!(state.is_prepared());
        assert!(state.rows().is_empty());
        assert_eq!(state.close(), Err(CursorError::NotOpen));
        assert_eq!(
            state.fetch(FetchOrientation::Next).unwrap_err(),
            CursorError::NotExecuted
        );
    }

    #[test]
    fn test_fetch_before_execute() {
        let mut state = CursorState::new();
        assert_eq!(
            state.fetch(FetchOrientation::Next).unwrap_err().sqlstate(),
            "HY010"
        );
    }
}
