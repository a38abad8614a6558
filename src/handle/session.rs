//! Shared state behind a family of connections.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::behavior::Behavior;
use crate::catalog::Catalog;
use crate::config::DriverConfig;

use super::error::HandleError;

/// An isolated driver context.
///
/// A session owns the catalog and behavior configuration that its
/// connections share. Separate sessions never observe each other's tables,
/// inserted rows or failure settings.
#[derive(Debug, Default)]
pub struct Session {
    catalog: RwLock<Catalog>,
    behavior: Mutex<Behavior>,
    open_connections: Mutex<usize>,
}

impl Session {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn catalog(&self) -> RwLockReadGuard<'_, Catalog> {
        self.catalog.read()
    }

    pub fn catalog_mut(&self) -> RwLockWriteGuard<'_, Catalog> {
        self.catalog.write()
    }

    /// A copy of the active configuration.
    pub fn config(&self) -> DriverConfig {
        self.behavior.lock().config().clone()
    }

    pub(crate) fn configure(&self, config: DriverConfig) {
        self.behavior.lock().configure(config);
    }

    /// Fails with the configured SQLSTATE if `operation` should fail.
    pub(crate) fn gate(&self, operation: &str, message: &'static str) -> Result<(), HandleError> {
        let mut behavior = self.behavior.lock();
        if behavior.should_fail(operation) {
            let config = behavior.config();
            return Err(HandleError::Injected {
                sqlstate: config.error_code.clone(),
                message,
                records: config.error_count,
            });
        }
        Ok(())
    }

    pub(crate) fn latency(&self) -> Duration {
        self.behavior.lock().latency()
    }

    pub fn open_connections(&self) -> usize {
        *self.open_connections.lock()
    }

    /// Reserves a connection slot unless `limit` (when non-zero) is reached.
    pub(crate) fn acquire_connection(&self, limit: usize) -> Result<(), HandleError> {
        let mut open = self.open_connections.lock();
        if limit > 0 && *open >= limit {
            return Err(HandleError::MaxConnections);
        }
        *open += 1;
        Ok(())
    }

    pub(crate) fn release_connection(&self) {
        let mut open = self.open_connections.lock();
        *open = open.saturating_sub(1);
    }
}
