//! Audit event types.
//!
//! Events follow the format: [actor - action - table - sql], with optional
//! execution details (row count, duration, error, payload).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // ===== Auth events =====
    /// Credentials accepted, session established.
    LoginSucceeded,
    /// Credentials rejected.
    LoginFailed,

    // ===== Query events =====
    /// SELECT executed successfully.
    QueryExecuted,
    /// SELECT execution failed.
    QueryFailed,

    // ===== Write events =====
    /// Single row inserted.
    RowInserted,
    /// Insert failed.
    WriteFailed,

    // ===== Account administration =====
    /// Account created.
    UserCreated,
    /// Account deleted.
    UserDeleted,
    /// Account operation failed or was refused.
    UserAdminFailed,
}

impl std::fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoginSucceeded => write!(f, "LOGIN_OK"),
            Self::LoginFailed => write!(f, "LOGIN_FAILED"),
            Self::QueryExecuted => write!(f, "QUERY_EXECUTED"),
            Self::QueryFailed => write!(f, "QUERY_FAILED"),
            Self::RowInserted => write!(f, "ROW_INSERTED"),
            Self::WriteFailed => write!(f, "WRITE_FAILED"),
            Self::UserCreated => write!(f, "USER_CREATED"),
            Self::UserDeleted => write!(f, "USER_DELETED"),
            Self::UserAdminFailed => write!(f, "USER_ADMIN_FAILED"),
        }
    }
}

/// An audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID.
    pub event_id: Uuid,

    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,

    /// Event type.
    pub event_type: AuditEventType,

    /// Acting username (the attempted username for failed logins).
    pub actor: String,

    /// Table the action targeted (if applicable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Generated SQL (if applicable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,

    /// Target account for user-admin events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Number of rows returned or affected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,

    /// Duration in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    /// Error message (if the event records a failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Submitted payload (for write events).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl AuditEvent {
    /// Create a new audit event with the required fields.
    pub fn new(event_type: AuditEventType, actor: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            event_type,
            actor: actor.into(),
            table: None,
            sql: None,
            target: None,
            row_count: None,
            duration_ms: None,
            error: None,
            payload: None,
        }
    }

    /// Create a builder for an audit event.
    pub fn builder(event_type: AuditEventType, actor: impl Into<String>) -> AuditEventBuilder {
        AuditEventBuilder::new(event_type, actor)
    }

    /// Format the event as a human-readable log line.
    ///
    /// Format: `[timestamp] EVENT_TYPE actor=... [table=...] [sql="..."]`
    pub fn to_log_line(&self) -> String {
        let mut line = format!(
            "[{}] {} actor={}",
            self.occurred_at.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            self.event_type,
            self.actor,
        );

        if let Some(ref table) = self.table {
            line.push_str(&format!(" table={}", table));
        }

        if let Some(ref target) = self.target {
            line.push_str(&format!(" target={}", target));
        }

        if let Some(ref sql) = self.sql {
            // Truncate long SQL for console output
            let sql_preview = if sql.len() > 100 {
                format!("{}...", &sql[..100])
            } else {
                sql.clone()
            };
            line.push_str(&format!(" sql=\"{}\"", sql_preview.replace('\n', " ")));
        }

        if let Some(row_count) = self.row_count {
            line.push_str(&format!(" rows={}", row_count));
        }

        if let Some(duration) = self.duration_ms {
            line.push_str(&format!(" duration_ms={}", duration));
        }

        if let Some(ref error) = self.error {
            line.push_str(&format!(" error=\"{}\"", error.replace('"', "'")));
        }

        line
    }
}

/// Builder for creating audit events.
#[derive(Debug)]
pub struct AuditEventBuilder {
    event: AuditEvent,
}

impl AuditEventBuilder {
    pub fn new(event_type: AuditEventType, actor: impl Into<String>) -> Self {
        Self {
            event: AuditEvent::new(event_type, actor),
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.event.table = Some(table.into());
        self
    }

    pub fn sql(mut self, sql: impl Into<String>) -> Self {
        self.event.sql = Some(sql.into());
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.event.target = Some(target.into());
        self
    }

    pub fn row_count(mut self, count: u64) -> Self {
        self.event.row_count = Some(count);
        self
    }

    pub fn duration_ms(mut self, duration: u64) -> Self {
        self.event.duration_ms = Some(duration);
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.event.error = Some(error.into());
        self
    }

    pub fn payload(mut self, payload: serde_json::Value) -> Self {
        self.event.payload = Some(payload);
        self
    }

    pub fn build(self) -> AuditEvent {
        self.event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_optional_fields() {
        let event = AuditEvent::builder(AuditEventType::QueryExecuted, "alice")
            .table("orders")
            .sql("SELECT to_jsonb(t) AS row FROM \"orders\" AS t LIMIT $1")
            .row_count(42)
            .duration_ms(15)
            .build();

        assert_eq!(event.event_type, AuditEventType::QueryExecuted);
        assert_eq!(event.actor, "alice");
        assert_eq!(event.table.as_deref(), Some("orders"));
        assert_eq!(event.row_count, Some(42));
    }

    #[test]
    fn log_line_carries_core_fields() {
        let event = AuditEvent::builder(AuditEventType::LoginFailed, "mallory")
            .error("invalid credentials")
            .build();

        let line = event.to_log_line();
        assert!(line.contains("LOGIN_FAILED"));
        assert!(line.contains("actor=mallory"));
        assert!(line.contains("error=\"invalid credentials\""));
    }

    #[test]
    fn event_type_display() {
        assert_eq!(format!("{}", AuditEventType::RowInserted), "ROW_INSERTED");
        assert_eq!(format!("{}", AuditEventType::UserDeleted), "USER_DELETED");
    }
}
