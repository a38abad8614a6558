//! Connection handles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::info;

use crate::behavior::{Behavior, apply_latency};
use crate::config::{DriverConfig, TransactionMode};
use crate::diag::{DiagnosticRecord, Diagnostics};

use super::completion::Completion;
use super::error::HandleError;
use super::session::Session;
use super::statement::{Statement, StatementState};

/// `SQLEndTran` completion type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndTransaction {
    Commit,
    Rollback,
}

/// State statements read without locking the connection.
#[derive(Debug)]
pub(crate) struct ConnectionLink {
    pub(crate) session: Arc<Session>,
    connected: AtomicBool,
}

impl ConnectionLink {
    pub(crate) fn ensure_connected(&self) -> Result<(), HandleError> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(HandleError::ConnectionNotOpen)
        }
    }
}

#[derive(Debug)]
struct ConnectionState {
    connection_string: String,
    autocommit: bool,
    read_only: bool,
    diagnostics: Diagnostics,
    statements: Vec<Weak<Mutex<StatementState>>>,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            connection_string: String::new(),
            autocommit: true,
            read_only: false,
            diagnostics: Diagnostics::default(),
            statements: Vec::new(),
        }
    }
}

/// A connection handle allocated from a [`Session`].
///
/// Calls on one connection are serialized by its internal lock.
#[derive(Debug)]
pub struct Connection {
    link: Arc<ConnectionLink>,
    state: Mutex<ConnectionState>,
}

impl Connection {
    /// Allocates a disconnected connection handle.
    pub fn new(session: &Arc<Session>) -> Self {
        Self {
            link: Arc::new(ConnectionLink {
                session: Arc::clone(session),
                connected: AtomicBool::new(false),
            }),
            state: Mutex::new(ConnectionState::default()),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.link.session
    }

    pub fn is_connected(&self) -> bool {
        self.link.connected.load(Ordering::Acquire)
    }

    /// Connects by data source name with the default configuration.
    pub fn connect(&self, dsn: &str, uid: &str, _pwd: &str) -> Result<Completion, HandleError> {
        self.call(|state| {
            if self.is_connected() {
                return Err(HandleError::AlreadyConnected);
            }
            self.link.session.acquire_connection(0)?;
            state.connection_string = format!("DSN={dsn};UID={uid};");
            self.establish(state, DriverConfig::default());
            Ok(Completion::Success)
        })
    }

    /// Connects with a full connection string carrying the driver
    /// configuration.
    pub fn driver_connect(&self, conn_str: &str) -> Result<Completion, HandleError> {
        self.call(|state| {
            if self.is_connected() {
                return Err(HandleError::AlreadyConnected);
            }

            let config = DriverConfig::parse(conn_str);
            if Behavior::new(config.clone()).should_fail("SQLDriverConnect") {
                return Err(HandleError::Injected {
                    sqlstate: config.error_code.clone(),
                    message: "Simulated connection failure",
                    records: config.error_count,
                });
            }
            apply_latency(config.latency);

            self.link.session.acquire_connection(config.max_connections)?;
            state.connection_string = conn_str.to_string();
            self.establish(state, config);
            Ok(Completion::Success)
        })
    }

    fn establish(&self, state: &mut ConnectionState, config: DriverConfig) {
        let session = &self.link.session;
        session.catalog_mut().initialize(config.catalog);

        state.read_only = config.transaction_mode == TransactionMode::ReadOnly;
        state.autocommit = config.transaction_mode != TransactionMode::Manual;
        info!(
            catalog = ?config.catalog,
            mode = ?config.mode,
            transaction_mode = ?config.transaction_mode,
            "connected"
        );

        session.configure(config);
        self.link.connected.store(true, Ordering::Release);
    }

    pub fn disconnect(&self) -> Result<Completion, HandleError> {
        self.call(|state| {
            if !self.is_connected() {
                return Err(HandleError::ConnectionNotOpen);
            }
            for statement in live_statements(state) {
                statement.lock().close_for_disconnect();
            }
            state.connection_string.clear();
            self.link.connected.store(false, Ordering::Release);
            self.link.session.release_connection();
            info!("disconnected");
            Ok(Completion::Success)
        })
    }

    /// Commits or rolls back. Every cursor on the connection is closed;
    /// rollback also discards results and the session's inserted rows.
    pub fn end_transaction(&self, completion: EndTransaction) -> Result<Completion, HandleError> {
        self.call(|state| {
            let session = &self.link.session;
            session.gate("SQLEndTran", "Simulated transaction failure")?;
            apply_latency(session.latency());
            self.link.ensure_connected()?;

            for statement in live_statements(state) {
                statement.lock().end_transaction(completion);
            }
            if completion == EndTransaction::Rollback {
                session.catalog_mut().clear_inserted_data(None);
            }
            Ok(Completion::Success)
        })
    }

    /// Allocates a statement on this connection.
    pub fn alloc_statement(&self) -> Result<Statement, HandleError> {
        self.call(|state| {
            self.link.ensure_connected()?;
            let statement = Statement::new(Arc::clone(&self.link));
            state.statements.retain(|s| s.strong_count() > 0);
            state.statements.push(statement.downgrade());
            Ok(statement)
        })
    }

    pub fn set_autocommit(&self, enabled: bool) {
        self.state.lock().autocommit = enabled;
    }

    pub fn autocommit(&self) -> bool {
        self.state.lock().autocommit
    }

    pub fn is_read_only(&self) -> bool {
        self.state.lock().read_only
    }

    pub fn connection_string(&self) -> String {
        self.state.lock().connection_string.clone()
    }

    pub fn diagnostics(&self) -> Vec<DiagnosticRecord> {
        self.state.lock().diagnostics.records().to_vec()
    }

    fn call<T>(
        &self,
        f: impl FnOnce(&mut ConnectionState) -> Result<T, HandleError>,
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

impl Drop for Connection {
    fn drop(&mut self) {
        if self.link.connected.swap(false, Ordering::AcqRel) {
            self.link.session.release_connection();
        }
    }
}

fn live_statements(state: &ConnectionState) -> Vec<Arc<Mutex<StatementState>>> {
    state.statements.iter().filter_map(Weak::upgrade).collect()
}
