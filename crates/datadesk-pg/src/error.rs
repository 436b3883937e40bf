//! Error taxonomy for the data layer.
//!
//! Each variant corresponds to one recoverable failure class the console
//! reports inline; callers decide presentation vs logging.

use thiserror::Error;

/// Errors from the Postgres access layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Could not reach or authenticate against the upstream database.
    #[error("database connection failed: {0}")]
    Connection(String),

    /// Unknown username or wrong password; the two are indistinguishable.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Schema introspection failed.
    #[error("schema introspection failed: {0}")]
    Introspection(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    Query(String),

    /// Row insert failed.
    #[error("write failed: {0}")]
    Write(String),

    /// Submission rejected because every field was blank.
    #[error("nothing to insert: every field is blank")]
    EmptySubmission,

    /// Account operation failed.
    #[error("user administration failed: {0}")]
    UserAdmin(String),

    /// Deleting the currently signed-in account is refused.
    #[error("refusing to delete the currently signed-in account")]
    SelfDelete,

    /// Identifier did not come from schema introspection or contains
    /// characters outside [A-Za-z0-9_].
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hash(String),
}
