//! Audit logger implementation.
//!
//! Provides the main `AuditLogger` type with helper methods for logging
//! login attempts, query execution, writes, and account administration.

use datadesk_core::AuditConfig;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::AuditError;
use crate::event::{AuditEvent, AuditEventType};
use crate::storage::{AuditStorage, ConsoleStorage, DualStorage, FileStorage, NullStorage};

/// The main audit logger.
pub struct AuditLogger {
    config: AuditConfig,
    storage: Arc<dyn AuditStorage>,
}

impl AuditLogger {
    /// Create a new audit logger with the given configuration.
    pub fn new(config: AuditConfig) -> Result<Self, AuditError> {
        let storage: Arc<dyn AuditStorage> = if !config.enabled {
            Arc::new(NullStorage::new())
        } else {
            let file_path = Self::resolve_log_path(&config);

            if config.stdout {
                Arc::new(DualStorage::new(&file_path)?)
            } else {
                Arc::new(FileStorage::new(&file_path)?)
            }
        };

        Ok(Self { config, storage })
    }

    /// Create a disabled (no-op) logger.
    pub fn disabled() -> Self {
        Self {
            config: AuditConfig {
                enabled: false,
                ..Default::default()
            },
            storage: Arc::new(NullStorage::new()),
        }
    }

    /// Create a console-only logger (useful for development).
    pub fn console_only() -> Self {
        Self {
            config: AuditConfig {
                enabled: true,
                stdout: true,
                ..Default::default()
            },
            storage: Arc::new(ConsoleStorage::new()),
        }
    }

    /// Resolve the log file path from configuration.
    fn resolve_log_path(config: &AuditConfig) -> PathBuf {
        let mut path = PathBuf::from(&config.directory);
        path.push("audit.log");
        path
    }

    /// Check if logging is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Log an audit event.
    pub async fn log(&self, event: AuditEvent) -> Result<(), AuditError> {
        if !self.config.enabled {
            return Ok(());
        }

        // Also log to tracing for structured logging integration
        tracing::debug!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            actor = %event.actor,
            "audit event"
        );

        self.storage.store(event).await
    }

    /// Log a successful login.
    pub async fn log_login_succeeded(&self, username: &str, role: &str) -> Result<(), AuditError> {
        let event = AuditEvent::builder(AuditEventType::LoginSucceeded, username)
            .payload(serde_json::json!({ "role": role }))
            .build();
        self.log(event).await
    }

    /// Log a failed login attempt with the attempted username.
    pub async fn log_login_failed(&self, username: &str) -> Result<(), AuditError> {
        let event = AuditEvent::builder(AuditEventType::LoginFailed, username)
            .error("invalid credentials")
            .build();
        self.log(event).await
    }

    /// Log a successfully executed query.
    pub async fn log_query_executed(
        &self,
        actor: &str,
        table: &str,
        sql: &str,
        row_count: u64,
        duration_ms: u64,
    ) -> Result<(), AuditError> {
        let event = AuditEvent::builder(AuditEventType::QueryExecuted, actor)
            .table(table)
            .sql(sql)
            .row_count(row_count)
            .duration_ms(duration_ms)
            .build();
        self.log(event).await
    }

    /// Log a query failure.
    pub async fn log_query_failed(
        &self,
        actor: &str,
        table: &str,
        sql: Option<&str>,
        error: &str,
    ) -> Result<(), AuditError> {
        let mut builder = AuditEvent::builder(AuditEventType::QueryFailed, actor)
            .table(table)
            .error(error);

        if let Some(sql) = sql {
            builder = builder.sql(sql);
        }

        self.log(builder.build()).await
    }

    /// Log a successful row insert with the submitted payload.
    pub async fn log_row_inserted(
        &self,
        actor: &str,
        table: &str,
        payload: serde_json::Value,
    ) -> Result<(), AuditError> {
        let event = AuditEvent::builder(AuditEventType::RowInserted, actor)
            .table(table)
            .payload(payload)
            .build();
        self.log(event).await
    }

    /// Log a failed write.
    pub async fn log_write_failed(
        &self,
        actor: &str,
        table: &str,
        error: &str,
    ) -> Result<(), AuditError> {
        let event = AuditEvent::builder(AuditEventType::WriteFailed, actor)
            .table(table)
            .error(error)
            .build();
        self.log(event).await
    }

    /// Log an account creation.
    pub async fn log_user_created(
        &self,
        actor: &str,
        target: &str,
        role: &str,
    ) -> Result<(), AuditError> {
        let event = AuditEvent::builder(AuditEventType::UserCreated, actor)
            .target(target)
            .payload(serde_json::json!({ "role": role }))
            .build();
        self.log(event).await
    }

    /// Log an account deletion.
    pub async fn log_user_deleted(&self, actor: &str, target: &str) -> Result<(), AuditError> {
        let event = AuditEvent::builder(AuditEventType::UserDeleted, actor)
            .target(target)
            .build();
        self.log(event).await
    }

    /// Log a failed or refused account operation.
    pub async fn log_user_admin_failed(
        &self,
        actor: &str,
        target: Option<&str>,
        error: &str,
    ) -> Result<(), AuditError> {
        let mut builder =
            AuditEvent::builder(AuditEventType::UserAdminFailed, actor).error(error);

        if let Some(target) = target {
            builder = builder.target(target);
        }

        self.log(builder.build()).await
    }

    /// Query audit events with filters, newest first.
    pub async fn query(&self, filter: AuditFilter) -> Result<Vec<AuditEvent>, AuditError> {
        self.storage.query(filter).await
    }

    /// Get the most recent events.
    pub async fn recent(&self, limit: usize) -> Result<Vec<AuditEvent>, AuditError> {
        self.query(AuditFilter {
            limit: Some(limit),
            ..Default::default()
        })
        .await
    }
}

/// Filter for querying audit events.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Filter by acting username.
    pub actor: Option<String>,
    /// Filter by event type.
    pub event_type: Option<AuditEventType>,
    /// Maximum number of results.
    pub limit: Option<usize>,
    /// Offset for pagination.
    pub offset: Option<usize>,
}

impl AuditFilter {
    /// Whether an event passes this filter (limit/offset excluded).
    pub fn matches(&self, event: &AuditEvent) -> bool {
        if let Some(ref actor) = self.actor {
            if &event.actor != actor {
                return false;
            }
        }
        if let Some(event_type) = self.event_type {
            if event.event_type != event_type {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_logger_accepts_events() {
        let logger = AuditLogger::disabled();
        assert!(!logger.is_enabled());

        // Should not error even when logging
        logger.log_login_failed("mallory").await.unwrap();
        logger
            .log_query_executed("alice", "orders", "SELECT 1", 1, 3)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn console_only_logger_is_enabled() {
        let logger = AuditLogger::console_only();
        assert!(logger.is_enabled());

        logger
            .log_user_created("admin", "newbie", "user")
            .await
            .unwrap();
    }

    #[test]
    fn filter_matches_actor_and_type() {
        let event = AuditEvent::new(AuditEventType::UserDeleted, "admin");

        let by_actor = AuditFilter {
            actor: Some("admin".to_string()),
            ..Default::default()
        };
        assert!(by_actor.matches(&event));

        let by_type = AuditFilter {
            event_type: Some(AuditEventType::LoginFailed),
            ..Default::default()
        };
        assert!(!by_type.matches(&event));
    }
}
