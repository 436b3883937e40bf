//! # datadesk-audit
//!
//! Append-only audit logging for the DataDesk console.
//!
//! Every security-relevant user action produces an [`AuditEvent`]: login
//! attempts, query execution, row writes, and account administration. Events
//! are written as JSON lines to a file and/or as human-readable lines to the
//! console, and recent events can be queried back for the activity page.

pub mod error;
pub mod event;
pub mod logger;
pub mod storage;

pub use error::AuditError;
pub use event::{AuditEvent, AuditEventBuilder, AuditEventType};
pub use logger::{AuditFilter, AuditLogger};
pub use storage::{AuditStorage, ConsoleStorage, DualStorage, FileStorage, NullStorage};
