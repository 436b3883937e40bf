//! # datadesk-pg
//!
//! Postgres access layer for the DataDesk console: pool construction,
//! schema introspection, the typed filter builder, the row-capped query
//! executor, the single-row inserter, and the credential/user store.
//!
//! Identifier/literal discipline: table and column names are accepted only
//! after validation against live introspection and pass through
//! [`quote_ident`]; every user-supplied value is bound as a parameter.

use datadesk_core::UpstreamConfig;
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::{Arguments, PgPool};

pub mod error;
pub mod filter;
pub mod insert;
pub mod introspect;
pub mod query;
pub mod users;

pub use error::DbError;
pub use filter::{Filter, WhereClause};
pub use introspect::{ColumnInfo, TableInfo};
pub use users::{User, UserRole, UserStore};

/// Connect a pool against the configured upstream.
pub async fn connect_pool(config: &UpstreamConfig) -> Result<PgPool, DbError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await
        .map_err(|e| DbError::Connection(e.to_string()))
}

/// Quote an identifier for interpolation into SQL.
///
/// Be strict: identifiers must come from schema introspection, so anything
/// outside [A-Za-z0-9_] is rejected rather than escaped.
pub fn quote_ident(ident: &str) -> Result<String, DbError> {
    if ident.is_empty() {
        return Err(DbError::InvalidIdentifier(ident.to_string()));
    }
    if !ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(DbError::InvalidIdentifier(ident.to_string()));
    }
    Ok(format!("\"{}\"", ident))
}

pub(crate) fn args_add<T>(args: &mut PgArguments, v: T) -> Result<(), DbError>
where
    T: Send + Sync + 'static,
    for<'q> T: sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    args.add(v).map_err(|e| DbError::Query(e.to_string()))
}

/// SQL cast for a declared column type, used when binding text values into
/// typed columns. `None` means the text bind needs no cast.
pub(crate) fn cast_for_pg_type(data_type: &str) -> Option<&'static str> {
    match data_type {
        "smallint" => Some("smallint"),
        "integer" => Some("integer"),
        "bigint" => Some("bigint"),
        "numeric" | "decimal" => Some("numeric"),
        "real" => Some("real"),
        "double precision" => Some("double precision"),
        "boolean" => Some("boolean"),
        "uuid" => Some("uuid"),
        "date" => Some("date"),
        "timestamp with time zone" => Some("timestamptz"),
        "timestamp without time zone" => Some("timestamp"),
        "json" => Some("json"),
        "jsonb" => Some("jsonb"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_ident_accepts_plain_names() {
        assert_eq!(quote_ident("orders").unwrap(), "\"orders\"");
        assert_eq!(quote_ident("order_items_2").unwrap(), "\"order_items_2\"");
    }

    #[test]
    fn quote_ident_rejects_injection_attempts() {
        assert!(quote_ident("").is_err());
        assert!(quote_ident("orders; DROP TABLE users").is_err());
        assert!(quote_ident("a\"b").is_err());
        assert!(quote_ident("a.b").is_err());
    }

    #[test]
    fn casts_cover_the_common_declared_types() {
        assert_eq!(cast_for_pg_type("integer"), Some("integer"));
        assert_eq!(cast_for_pg_type("timestamp with time zone"), Some("timestamptz"));
        assert_eq!(cast_for_pg_type("character varying"), None);
        assert_eq!(cast_for_pg_type("text"), None);
    }
}
