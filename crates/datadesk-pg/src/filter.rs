//! Typed filter clauses and WHERE-clause assembly.
//!
//! Each filter variant renders to a parameterized SQL fragment with `$n`
//! placeholders plus the values to bind, so the builder can be tested
//! without a database and no user-supplied value ever appears in the SQL
//! text. Fragments are joined with AND.

use crate::error::DbError;
use crate::{args_add, quote_ident};
use chrono::NaiveDate;
use sqlx::postgres::PgArguments;
use sqlx::{PgPool, Row};

/// Upper bound on distinct-value enumeration for the multi-select widget.
/// Columns with more distinct values fall back to the substring filter.
pub const DISTINCT_LIMIT: usize = 200;

/// One active filter on a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Inclusive calendar-date range; the column is compared truncated to
    /// day granularity.
    Range {
        column: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    /// Value must equal one of the selected distinct values.
    InList { column: String, values: Vec<String> },
    /// Value must contain the substring (case sensitivity per collation).
    Like { column: String, substring: String },
}

impl Filter {
    fn column(&self) -> &str {
        match self {
            Filter::Range { column, .. } => column,
            Filter::InList { column, .. } => column,
            Filter::Like { column, .. } => column,
        }
    }

    /// Whether the filter carries nothing to match on.
    fn is_empty(&self) -> bool {
        match self {
            Filter::Range { .. } => false,
            Filter::InList { values, .. } => values.is_empty(),
            Filter::Like { substring, .. } => substring.trim().is_empty(),
        }
    }
}

/// A value to bind into a placeholder, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Date(NaiveDate),
    Text(String),
}

/// A rendered conjunction of filter fragments. `sql` is empty when no
/// filter was active; placeholders are numbered from `$1` and each bind
/// occupies exactly one placeholder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

impl WhereClause {
    /// Placeholder index for the next bind after this clause.
    pub fn next_placeholder(&self) -> usize {
        self.binds.len() + 1
    }

    /// Append the binds to a sqlx argument buffer in placeholder order.
    pub fn bind_into(&self, args: &mut PgArguments) -> Result<(), DbError> {
        for bind in &self.binds {
            match bind {
                BindValue::Date(d) => args_add(args, *d)?,
                BindValue::Text(s) => args_add(args, s.clone())?,
            }
        }
        Ok(())
    }
}

/// Render the active filters into a WHERE conjunction. Empty filters are
/// skipped; an empty filter set renders to an empty clause.
pub fn build_where(filters: &[Filter]) -> Result<WhereClause, DbError> {
    let mut parts: Vec<String> = Vec::new();
    let mut binds: Vec<BindValue> = Vec::new();
    let mut idx: usize = 1;

    for filter in filters {
        if filter.is_empty() {
            continue;
        }
        let column = quote_ident(filter.column())?;
        match filter {
            Filter::Range { start, end, .. } => {
                parts.push(format!("{}::date BETWEEN ${} AND ${}", column, idx, idx + 1));
                binds.push(BindValue::Date(*start));
                binds.push(BindValue::Date(*end));
                idx += 2;
            }
            Filter::InList { values, .. } => {
                let placeholders: Vec<String> =
                    (0..values.len()).map(|i| format!("${}", idx + i)).collect();
                parts.push(format!("{}::text IN ({})", column, placeholders.join(", ")));
                binds.extend(values.iter().map(|v| BindValue::Text(v.clone())));
                idx += values.len();
            }
            Filter::Like { substring, .. } => {
                parts.push(format!("{}::text LIKE ${}", column, idx));
                binds.push(BindValue::Text(format!("%{}%", substring)));
                idx += 1;
            }
        }
    }

    Ok(WhereClause {
        sql: parts.join(" AND "),
        binds,
    })
}

/// Date/time naming heuristic: a column whose lower-cased name contains
/// `date` or `time` is offered as a range filter.
pub fn is_temporal_column(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("date") || lower.contains("time")
}

/// Enumerate the distinct values of a column, rendered as text, for the
/// multi-select widget. Returns `None` when the column has more distinct
/// values than [`DISTINCT_LIMIT`]; a query error (e.g. a type with no text
/// cast) is an `Err` and callers fall back to the substring filter.
pub async fn distinct_values(
    pool: &PgPool,
    table: &str,
    column: &str,
) -> Result<Option<Vec<String>>, DbError> {
    let sql = format!(
        "SELECT DISTINCT {col}::text AS v FROM {table} WHERE {col} IS NOT NULL ORDER BY 1 LIMIT {limit}",
        col = quote_ident(column)?,
        table = quote_ident(table)?,
        limit = DISTINCT_LIMIT + 1,
    );

    let rows = sqlx::query(&sql)
        .fetch_all(pool)
        .await
        .map_err(|e| DbError::Introspection(e.to_string()))?;

    if rows.len() > DISTINCT_LIMIT {
        return Ok(None);
    }

    rows.into_iter()
        .map(|row| {
            row.try_get::<String, _>("v")
                .map_err(|e| DbError::Introspection(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn no_filters_renders_empty_clause() {
        let clause = build_where(&[]).unwrap();
        assert_eq!(clause.sql, "");
        assert!(clause.binds.is_empty());
        assert_eq!(clause.next_placeholder(), 1);
    }

    #[test]
    fn range_renders_inclusive_date_comparison() {
        let clause = build_where(&[Filter::Range {
            column: "trade_date".into(),
            start: date("2024-01-01"),
            end: date("2024-01-02"),
        }])
        .unwrap();

        assert_eq!(clause.sql, "\"trade_date\"::date BETWEEN $1 AND $2");
        assert_eq!(
            clause.binds,
            vec![
                BindValue::Date(date("2024-01-01")),
                BindValue::Date(date("2024-01-02")),
            ]
        );
    }

    #[test]
    fn in_list_gets_one_placeholder_per_value() {
        let clause = build_where(&[Filter::InList {
            column: "region".into(),
            values: vec!["eu".into(), "us".into(), "apac".into()],
        }])
        .unwrap();

        assert_eq!(clause.sql, "\"region\"::text IN ($1, $2, $3)");
        assert_eq!(clause.binds.len(), 3);
    }

    #[test]
    fn like_binds_the_wrapped_substring() {
        let clause = build_where(&[Filter::Like {
            column: "note".into(),
            substring: "refund".into(),
        }])
        .unwrap();

        assert_eq!(clause.sql, "\"note\"::text LIKE $1");
        assert_eq!(clause.binds, vec![BindValue::Text("%refund%".into())]);
    }

    #[test]
    fn filters_are_joined_with_and_and_numbered_across() {
        let clause = build_where(&[
            Filter::Range {
                column: "ts".into(),
                start: date("2024-01-01"),
                end: date("2024-01-31"),
            },
            Filter::InList {
                column: "tag".into(),
                values: vec!["cpu".into(), "mem".into()],
            },
            Filter::Like {
                column: "host".into(),
                substring: "web-".into(),
            },
        ])
        .unwrap();

        assert_eq!(
            clause.sql,
            "\"ts\"::date BETWEEN $1 AND $2 AND \"tag\"::text IN ($3, $4) AND \"host\"::text LIKE $5"
        );
        assert_eq!(clause.binds.len(), 5);
        assert_eq!(clause.next_placeholder(), 6);
    }

    #[test]
    fn user_values_never_appear_in_the_sql_text() {
        let hostile = "x' OR '1'='1";
        let clause = build_where(&[
            Filter::InList {
                column: "region".into(),
                values: vec![hostile.into()],
            },
            Filter::Like {
                column: "note".into(),
                substring: hostile.into(),
            },
        ])
        .unwrap();

        assert!(!clause.sql.contains(hostile));
        assert_eq!(clause.binds.len(), 2);
    }

    #[test]
    fn empty_filters_are_skipped() {
        let clause = build_where(&[
            Filter::InList {
                column: "region".into(),
                values: vec![],
            },
            Filter::Like {
                column: "note".into(),
                substring: "   ".into(),
            },
            Filter::Like {
                column: "host".into(),
                substring: "db".into(),
            },
        ])
        .unwrap();

        assert_eq!(clause.sql, "\"host\"::text LIKE $1");
        assert_eq!(clause.binds.len(), 1);
    }

    #[test]
    fn hostile_column_names_are_rejected() {
        let err = build_where(&[Filter::Like {
            column: "note\" OR 1=1 --".into(),
            substring: "x".into(),
        }])
        .unwrap_err();
        assert!(matches!(err, DbError::InvalidIdentifier(_)));
    }

    #[test]
    fn temporal_heuristic_matches_date_and_time_names() {
        assert!(is_temporal_column("trade_date"));
        assert!(is_temporal_column("created_time"));
        assert!(is_temporal_column("UpdateTime"));
        assert!(!is_temporal_column("region"));
        assert!(!is_temporal_column("value"));
    }
}
