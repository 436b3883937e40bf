//! Live schema introspection.
//!
//! The console never caches metadata across requests: every page render asks
//! the database which tables and columns exist right now, and everything the
//! query layer interpolates as an identifier comes from these results.

use crate::error::DbError;
use sqlx::{PgPool, Row};

/// A browsable table. The console works against the `public` schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    /// Table name.
    pub name: String,
}

/// A column of a browsable table, in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Declared data type (information_schema spelling).
    pub data_type: String,
    /// Whether the column is nullable.
    pub nullable: bool,
    /// Default expression, if any.
    pub default: Option<String>,
}

/// List base tables in the `public` schema, sorted by name.
pub async fn list_tables(pool: &PgPool) -> Result<Vec<TableInfo>, DbError> {
    let rows = sqlx::query(
        r#"
        select table_name
        from information_schema.tables
        where table_type = 'BASE TABLE'
          and table_schema = 'public'
        order by table_name
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| DbError::Introspection(e.to_string()))?;

    Ok(rows
        .into_iter()
        .map(|row| TableInfo {
            name: row.get("table_name"),
        })
        .collect())
}

/// List the columns of a table in ordinal order. An unknown table yields an
/// empty list; callers treat that as "no such table".
pub async fn table_columns(pool: &PgPool, table: &str) -> Result<Vec<ColumnInfo>, DbError> {
    let rows = sqlx::query(
        r#"
        select column_name, data_type, is_nullable, column_default
        from information_schema.columns
        where table_schema = 'public' and table_name = $1
        order by ordinal_position
        "#,
    )
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(|e| DbError::Introspection(e.to_string()))?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        let is_nullable: String = row.get("is_nullable");
        columns.push(ColumnInfo {
            name: row.get("column_name"),
            data_type: row.get("data_type"),
            nullable: is_nullable == "YES",
            default: row.get("column_default"),
        });
    }

    Ok(columns)
}

/// Resolve a requested table name against the live table list. This is the
/// gate that keeps free-text table names out of generated SQL.
pub fn resolve_table<'a>(tables: &'a [TableInfo], requested: &str) -> Option<&'a TableInfo> {
    tables.iter().find(|t| t.name == requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str) -> TableInfo {
        TableInfo {
            name: name.to_string(),
        }
    }

    #[test]
    fn resolve_table_is_exact() {
        let tables = vec![table("orders"), table("order_items")];
        assert_eq!(resolve_table(&tables, "orders"), Some(&tables[0]));
        assert_eq!(resolve_table(&tables, "Orders"), None);
        assert_eq!(resolve_table(&tables, "orders; --"), None);
    }
}
