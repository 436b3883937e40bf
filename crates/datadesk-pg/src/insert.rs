//! Single-row inserts from user-entered form values.

use crate::error::DbError;
use crate::introspect::ColumnInfo;
use crate::{args_add, cast_for_pg_type, quote_ident};
use sqlx::postgres::PgArguments;
use sqlx::PgPool;
use std::collections::HashMap;

/// Whether a submission carries no data at all.
pub fn is_all_blank(values: &HashMap<String, String>) -> bool {
    values.values().all(|v| v.trim().is_empty())
}

/// Insert one row into `table`. `values` maps column name to the raw string
/// the user entered; blank fields are omitted so column defaults apply.
/// Values are bound verbatim as text with a cast to the declared column
/// type, leaving coercion to the database.
///
/// An all-blank submission is rejected before any database work.
pub async fn insert_row(
    pool: &PgPool,
    table: &str,
    columns: &[ColumnInfo],
    values: &HashMap<String, String>,
) -> Result<(), DbError> {
    if is_all_blank(values) {
        return Err(DbError::EmptySubmission);
    }

    let mut column_idents: Vec<String> = Vec::new();
    let mut placeholders: Vec<String> = Vec::new();
    let mut args = PgArguments::default();
    let mut idx: usize = 1;

    // Iterate introspected columns, not the submitted map, so column order
    // is stable and unknown keys never reach the SQL.
    for column in columns {
        let value = match values.get(&column.name) {
            Some(v) if !v.trim().is_empty() => v,
            _ => continue,
        };

        let cast = cast_for_pg_type(&column.data_type)
            .map(|c| format!("::{}", c))
            .unwrap_or_default();
        column_idents.push(quote_ident(&column.name)?);
        placeholders.push(format!("${}{}", idx, cast));
        args_add(&mut args, value.clone())?;
        idx += 1;
    }

    if column_idents.is_empty() {
        return Err(DbError::EmptySubmission);
    }

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table)?,
        column_idents.join(", "),
        placeholders.join(", ")
    );

    tracing::debug!(table, sql = %sql, "executing insert");

    sqlx::query_with(&sql, args)
        .execute(pool)
        .await
        .map_err(|e| DbError::Write(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn all_blank_detection_trims_whitespace() {
        assert!(is_all_blank(&values(&[("a", ""), ("b", "   "), ("c", "\t")])));
        assert!(!is_all_blank(&values(&[("a", ""), ("b", "x")])));
        assert!(is_all_blank(&HashMap::new()));
    }
}
