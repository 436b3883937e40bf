//! Console application state.
//!
//! One [`AppState`] is constructed at startup and cloned into every handler;
//! there is no ambient global state.

use crate::session::SessionStore;
use datadesk_audit::AuditLogger;
use datadesk_core::DataDeskConfig;
use datadesk_pg::{TableInfo, UserStore};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state for the console.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// The loaded configuration (immutable after startup).
    config: DataDeskConfig,
    /// Upstream connection pool.
    pool: PgPool,
    /// Credential/user store.
    users: UserStore,
    /// Audit logger.
    audit: Arc<AuditLogger>,
    /// In-memory browser sessions.
    sessions: SessionStore,
}

impl AppState {
    /// Create a new application state.
    pub fn new(config: DataDeskConfig, pool: PgPool, audit: Arc<AuditLogger>) -> Self {
        let users = UserStore::new(pool.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                users,
                audit,
                sessions: SessionStore::new(),
            }),
        }
    }

    pub fn config(&self) -> &DataDeskConfig {
        &self.inner.config
    }

    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    pub fn users(&self) -> &UserStore {
        &self.inner.users
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.inner.audit
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    /// Drop configured hidden tables from a table listing.
    pub fn visible_tables(&self, tables: Vec<TableInfo>) -> Vec<TableInfo> {
        tables
            .into_iter()
            .filter(|t| !self.config().is_table_hidden(&t.name))
            .collect()
    }
}
