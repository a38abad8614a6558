//! Statement handles: execution, fetch, binding and catalog functions.
//!
//! Gated entry points consult the session's behavior configuration before
//! doing any work:
//!
//! | Entry point      | Operation name      |
//! |------------------|---------------------|
//! | `exec_direct`    | `SQLExecDirect`     |
//! | `prepare`        | `SQLPrepare`        |
//! | `execute`        | `SQLExecute`        |
//! | `fetch`          | `SQLFetch`          |
//! | `fetch_scroll`   | `SQLFetchScroll`    |
//! | `get_data`       | `SQLGetData`        |
//! | `tables`         | `SQLTables`         |
//! | `columns`        | `SQLColumns`        |

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

use crate::behavior::apply_latency;
use crate::catalog::Catalog;
use crate::cell::Cell;
use crate::config::StateChecking;
use crate::cursor::{
    Bindings, ColumnBuffer, CursorError, CursorState, CursorType, FetchOrientation, ParamBuffer,
    TargetBuffer, Transfer, transfer_cell, transfer_row,
};
use crate::diag::{DiagnosticRecord, Diagnostics, sqlstate};
use crate::executor::{ColumnDesc, ExecOptions, QueryResult, execute, introspect};
use crate::sql::{count_parameters, parse_sql};

use super::completion::Completion;
use super::connection::{ConnectionLink, EndTransaction};
use super::error::HandleError;

/// `SQLFreeStmt` options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeStmtOption {
    /// Close the cursor and discard pending results.
    Close,
    /// Release all column bindings.
    Unbind,
    /// Release all parameter bindings.
    ResetParams,
}

#[derive(Debug, Default)]
pub(crate) struct StatementState {
    cursor: CursorState,
    columns: Bindings<ColumnBuffer>,
    params: Bindings<ParamBuffer>,
    diagnostics: Diagnostics,
}

impl StatementState {
    pub(crate) fn close_for_disconnect(&mut self) {
        self.cursor.close_quietly();
    }

    pub(crate) fn end_transaction(&mut self, completion: EndTransaction) {
        match completion {
            EndTransaction::Commit => self.cursor.cancel(),
            EndTransaction::Rollback => self.cursor.close_quietly(),
        }
    }

    fn load(&mut self, sql: &str, result: QueryResult) {
        debug!(
            sql,
            columns = result.columns.len(),
            rows = result.rows.len(),
            row_count = result.row_count(),
            "result loaded"
        );
        self.cursor.load(result);
    }

    fn truncated(&mut self) -> Completion {
        self.diagnostics.push(DiagnosticRecord::new(
            sqlstate::STRING_TRUNCATED,
            "String data, right truncated",
        ));
        Completion::SuccessWithInfo
    }
}

/// A statement handle allocated from a connection.
///
/// Cloning yields another reference to the same statement.
#[derive(Debug, Clone)]
pub struct Statement {
    link: Arc<ConnectionLink>,
    state: Arc<Mutex<StatementState>>,
}

impl Statement {
    pub(crate) fn new(link: Arc<ConnectionLink>) -> Self {
        Self {
            link,
            state: Arc::new(Mutex::new(StatementState::default())),
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<Mutex<StatementState>> {
        Arc::downgrade(&self.state)
    }

    /// Parses and runs `sql` in one step.
    pub fn exec_direct(&self, sql: &str) -> Result<Completion, HandleError> {
        self.call(|state| {
            self.link.ensure_connected()?;
            let session = &self.link.session;
            session.gate("SQLExecDirect", "Simulated execution failure")?;
            apply_latency(session.latency());

            state.cursor.close_quietly();
            state.cursor.set_direct(sql);
            let result = self.run(state, sql)?;
            state.load(sql, result);
            Ok(Completion::Success)
        })
    }

    /// Validates `sql` and keeps it for [`execute`](Self::execute).
    pub fn prepare(&self, sql: &str) -> Result<Completion, HandleError> {
        self.call(|state| {
            self.link.ensure_connected()?;
            self.link
                .session
                .gate("SQLPrepare", "Simulated prepare failure")?;

            parse_sql(sql)?;
            state.cursor.prepare(sql);
            Ok(Completion::Success)
        })
    }

    /// Runs the prepared statement with the current parameter values.
    pub fn execute(&self) -> Result<Completion, HandleError> {
        self.call(|state| {
            let session = &self.link.session;
            let lenient = session.config().state_checking == StateChecking::Lenient;
            let sql = match state.cursor.sql() {
                Some(sql) if state.cursor.is_prepared() || lenient => sql.to_string(),
                _ => return Err(HandleError::NotPrepared),
            };
            self.link.ensure_connected()?;
            session.gate("SQLExecute", "Simulated execute failure")?;
            apply_latency(session.latency());

            state.cursor.close_quietly();
            let result = self.run(state, &sql)?;
            state.load(&sql, result);
            Ok(Completion::Success)
        })
    }

    fn run(&self, state: &StatementState, sql: &str) -> Result<QueryResult, HandleError> {
        let parsed = parse_sql(sql)?;
        let params: Vec<Cell> = state.params.values(parsed.param_count);
        let result_set_size = self.link.session.config().result_set_size;
        let options = ExecOptions::new(result_set_size).with_params(&params);
        let mut catalog = self.link.session.catalog_mut();
        Ok(execute(&parsed.query, &mut catalog, options)?)
    }

    /// Advances to the next row and fills the bound columns.
    pub fn fetch(&self) -> Result<Completion, HandleError> {
        self.fetch_with("SQLFetch", FetchOrientation::Next)
    }

    /// Moves the cursor by `orientation` and fills the bound columns.
    pub fn fetch_scroll(&self, orientation: FetchOrientation) -> Result<Completion, HandleError> {
        self.fetch_with("SQLFetchScroll", orientation)
    }

    fn fetch_with(
        &self,
        operation: &'static str,
        orientation: FetchOrientation,
    ) -> Result<Completion, HandleError> {
        self.call(|state| {
            if !state.cursor.is_executed() {
                return Err(CursorError::NotExecuted.into());
            }
            self.link
                .session
                .gate(operation, "Simulated fetch failure")?;

            let Some(row) = state.cursor.fetch(orientation)? else {
                return Ok(Completion::NoData);
            };
            match transfer_row(row, state.columns.iter())? {
                Transfer::Complete => Ok(Completion::Success),
                Transfer::Truncated => Ok(state.truncated()),
            }
        })
    }

    /// Binds an output buffer to a result column. `None` unbinds; column 0
    /// (bookmarks) is accepted and ignored.
    pub fn bind_column(&self, column: u16, target: Option<ColumnBuffer>) -> Result<Completion, HandleError> {
        self.call(|state| {
            if column > 0 {
                state.columns.bind(column, target);
            }
            Ok(Completion::Success)
        })
    }

    /// Binds a value slot to parameter marker `param` (1-based). `None`
    /// unbinds.
    pub fn bind_parameter(&self, param: u16, value: Option<ParamBuffer>) -> Result<Completion, HandleError> {
        self.call(|state| {
            if param == 0 {
                return Err(HandleError::InvalidParameterNumber);
            }
            state.params.bind(param, value);
            Ok(Completion::Success)
        })
    }

    /// Reads one column of the current row into `target`.
    pub fn get_data(&self, column: u16, target: &mut TargetBuffer) -> Result<Completion, HandleError> {
        self.call(|state| {
            self.link
                .session
                .gate("SQLGetData", "Simulated get data failure")?;

            let row = state.cursor.current_row().ok_or(CursorError::NoCurrentRow)?;
            let cell = usize::from(column)
                .checked_sub(1)
                .and_then(|i| row.get(i))
                .ok_or(CursorError::InvalidIndex(column.into()))?;
            match transfer_cell(cell, target)? {
                Transfer::Complete => Ok(Completion::Success),
                Transfer::Truncated => Ok(state.truncated()),
            }
        })
    }

    pub fn num_result_cols(&self) -> usize {
        self.state.lock().cursor.columns().len()
    }

    /// Describes result column `column` (1-based).
    pub fn describe_col(&self, column: u16) -> Result<ColumnDesc, HandleError> {
        self.call(|state| {
            usize::from(column)
                .checked_sub(1)
                .and_then(|i| state.cursor.columns().get(i))
                .cloned()
                .ok_or_else(|| HandleError::from(CursorError::InvalidIndex(column.into())))
        })
    }

    /// Affected rows for DML, result rows otherwise.
    pub fn row_count(&self) -> u64 {
        self.state.lock().cursor.row_count()
    }

    /// Number of `?` markers in the current statement text.
    pub fn num_params(&self) -> usize {
        self.state
            .lock()
            .cursor
            .sql()
            .map_or(0, count_parameters)
    }

    pub fn close_cursor(&self) -> Result<Completion, HandleError> {
        self.call(|state| {
            let lenient = self.link.session.config().state_checking == StateChecking::Lenient;
            if lenient {
                state.cursor.close_quietly();
            } else {
                state.cursor.close()?;
            }
            Ok(Completion::Success)
        })
    }

    pub fn free_stmt(&self, option: FreeStmtOption) -> Result<Completion, HandleError> {
        self.call(|state| {
            match option {
                FreeStmtOption::Close => state.cursor.close_quietly(),
                FreeStmtOption::Unbind => state.columns.clear(),
                FreeStmtOption::ResetParams => state.params.clear(),
            }
            Ok(Completion::Success)
        })
    }

    /// Stops iteration; fetched rows stay in place.
    pub fn cancel(&self) -> Result<Completion, HandleError> {
        self.call(|state| {
            state.cursor.cancel();
            Ok(Completion::Success)
        })
    }

    pub fn set_cursor_type(&self, cursor_type: CursorType) {
        self.state.lock().cursor.set_cursor_type(cursor_type);
    }

    pub fn cursor_type(&self) -> CursorType {
        self.state.lock().cursor.cursor_type()
    }

    pub fn is_prepared(&self) -> bool {
        self.state.lock().cursor.is_prepared()
    }

    pub fn is_cursor_open(&self) -> bool {
        self.state.lock().cursor.is_open()
    }

    /// Records produced by the most recent call.
    pub fn diagnostics(&self) -> Vec<DiagnosticRecord> {
        self.state.lock().diagnostics.records().to_vec()
    }

    /// `SQLTables`
    pub fn tables(&self, table_pattern: &str, table_types: Option<&str>) -> Result<Completion, HandleError> {
        self.catalog_result(
            "SQLTables",
            Some("Simulated SQLTables failure"),
            |catalog| introspect::tables(catalog, table_pattern, table_types),
        )
    }

    /// `SQLColumns`
    pub fn columns(&self, table_pattern: &str, column_pattern: &str) -> Result<Completion, HandleError> {
        self.catalog_result(
            "SQLColumns",
            Some("Simulated SQLColumns failure"),
            |catalog| introspect::columns(catalog, table_pattern, column_pattern),
        )
    }

    /// `SQLPrimaryKeys`
    pub fn primary_keys(&self, table: &str) -> Result<Completion, HandleError> {
        self.catalog_result("SQLPrimaryKeys", None, |catalog| {
            introspect::primary_keys(catalog, table)
        })
    }

    /// `SQLForeignKeys`; an empty table name matches every table.
    pub fn foreign_keys(&self, pk_table: &str, fk_table: &str) -> Result<Completion, HandleError> {
        self.catalog_result("SQLForeignKeys", None, |catalog| {
            introspect::foreign_keys(catalog, pk_table, fk_table)
        })
    }

    /// `SQLStatistics`
    pub fn statistics(&self, table: &str) -> Result<Completion, HandleError> {
        self.catalog_result("SQLStatistics", None, |catalog| {
            introspect::statistics(catalog, table)
        })
    }

    /// Replaces the statement's result with a catalog projection. When
    /// `failure` is set the call is gated under `operation`.
    fn catalog_result(
        &self,
        operation: &'static str,
        failure: Option<&'static str>,
        build: impl FnOnce(&Catalog) -> QueryResult,
    ) -> Result<Completion, HandleError> {
        self.call(|state| {
            self.link.ensure_connected()?;
            if let Some(message) = failure {
                self.link.session.gate(operation, message)?;
            }
            let result = build(&self.link.session.catalog());
            state.cursor.close_quietly();
            state.load(operation, result);
            Ok(Completion::Success)
        })
    }

    fn call<T>(
        &self,
        f: impl FnOnce(&mut StatementState) -> Result<T, HandleError>,
    ) -> Result<T, HandleError> {
        let mut state = self.state.lock();
        state.diagnostics.clear();
        let result = f(&mut state);
        if let Err(e) = &result {
            for record in e.records() {
                state.diagnostics.push(record);
            }
        }
        result
    }
}
