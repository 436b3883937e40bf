//! Row-capped SELECT execution.

use crate::error::DbError;
use crate::filter::{build_where, Filter};
use crate::introspect::ColumnInfo;
use crate::{args_add, quote_ident};
use datadesk_core::QueryResult;
use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::{PgPool, Row};

/// Hard cap on rows returned per query, regardless of filter selectivity.
pub const MAX_ROWS: i64 = 1000;

/// Execute `SELECT * FROM <table> [WHERE ...] LIMIT 1000` and project the
/// rows into introspected column order. Returns the result together with
/// the SQL text for auditing.
///
/// Rows come back as `to_jsonb(t)` objects so arbitrary column types decode
/// uniformly; the cap is bound as the final parameter.
pub async fn run_query(
    pool: &PgPool,
    table: &str,
    columns: &[ColumnInfo],
    filters: &[Filter],
) -> Result<(QueryResult, String), DbError> {
    let table_ident = quote_ident(table)?;
    let clause = build_where(filters)?;

    let sql = if clause.sql.is_empty() {
        format!(
            "SELECT to_jsonb(t) AS row FROM {} AS t LIMIT ${}",
            table_ident,
            clause.next_placeholder()
        )
    } else {
        format!(
            "SELECT to_jsonb(t) AS row FROM {} AS t WHERE {} LIMIT ${}",
            table_ident,
            clause.sql,
            clause.next_placeholder()
        )
    };

    let mut args = PgArguments::default();
    clause.bind_into(&mut args)?;
    args_add(&mut args, MAX_ROWS)?;

    tracing::debug!(table, sql = %sql, "executing query");

    let recs = sqlx::query_with(&sql, args)
        .fetch_all(pool)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

    let mut result = QueryResult::new(columns.iter().map(|c| c.name.clone()).collect());
    for rec in recs {
        let row_json: Value = rec
            .try_get("row")
            .map_err(|e| DbError::Query(e.to_string()))?;
        result.rows.push(project_row(&row_json, columns));
    }

    Ok((result, sql))
}

/// Project a `to_jsonb` row object into introspected column order. Columns
/// missing from the object render as NULL.
fn project_row(row_json: &Value, columns: &[ColumnInfo]) -> Vec<Value> {
    columns
        .iter()
        .map(|c| row_json.get(&c.name).cloned().unwrap_or(Value::Null))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn columns(names: &[&str]) -> Vec<ColumnInfo> {
        names
            .iter()
            .map(|n| ColumnInfo {
                name: n.to_string(),
                data_type: "text".to_string(),
                nullable: true,
                default: None,
            })
            .collect()
    }

    // The SQL shape is what matters here; execution needs a live database
    // and is covered by the builder tests plus the fragment assertions.
    #[test]
    fn sql_shape_without_filters() {
        let clause = build_where(&[]).unwrap();
        let sql = format!(
            "SELECT to_jsonb(t) AS row FROM {} AS t LIMIT ${}",
            quote_ident("metrics").unwrap(),
            clause.next_placeholder()
        );
        assert_eq!(sql, "SELECT to_jsonb(t) AS row FROM \"metrics\" AS t LIMIT $1");
    }

    #[test]
    fn sql_shape_with_filters_binds_the_cap_last() {
        let filters = vec![
            Filter::Range {
                column: "sample_date".into(),
                start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            },
            Filter::InList {
                column: "tag".into(),
                values: vec!["cpu".into()],
            },
        ];
        let clause = build_where(&filters).unwrap();
        assert_eq!(clause.next_placeholder(), 4);

        let sql = format!(
            "SELECT to_jsonb(t) AS row FROM {} AS t WHERE {} LIMIT ${}",
            quote_ident("metrics").unwrap(),
            clause.sql,
            clause.next_placeholder()
        );
        assert_eq!(
            sql,
            "SELECT to_jsonb(t) AS row FROM \"metrics\" AS t WHERE \"sample_date\"::date BETWEEN $1 AND $2 AND \"tag\"::text IN ($3) LIMIT $4"
        );
    }

    #[test]
    fn projection_preserves_introspected_order() {
        let cols = columns(&["b", "a"]);
        let row_json = serde_json::json!({ "a": 1, "b": "x" });
        assert_eq!(
            project_row(&row_json, &cols),
            vec![serde_json::json!("x"), serde_json::json!(1)]
        );
    }

    #[test]
    fn missing_columns_project_as_null() {
        let cols = columns(&["a", "gone"]);
        let row_json = serde_json::json!({ "a": 1 });
        assert_eq!(
            project_row(&row_json, &cols),
            vec![serde_json::json!(1), serde_json::Value::Null]
        );
    }
}
