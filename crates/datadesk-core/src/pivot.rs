//! Long-to-wide pivot transform.
//!
//! Reshapes a result whose rows look like `(index, tag, value)` into one row
//! per distinct index value with one column per distinct tag. The first
//! value seen for an (index, tag) pair wins; later duplicates are dropped.

use crate::table::{cell_text, QueryResult};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Column every pivotable result must carry for the category axis.
pub const TAG_COLUMN: &str = "tag";

/// Column every pivotable result must carry for the cell values.
pub const VALUE_COLUMN: &str = "value";

/// Errors from the pivot transform. The caller is expected to fall back to
/// the flat table on any of these.
#[derive(Debug, Error, PartialEq)]
pub enum PivotError {
    #[error("result has no '{0}' column")]
    MissingColumn(String),
}

/// Pivot `result` around `index_column`, spreading `tag` values into columns
/// filled from `value`.
pub fn pivot_result(result: &QueryResult, index_column: &str) -> Result<QueryResult, PivotError> {
    let index_idx = result
        .column_index(index_column)
        .ok_or_else(|| PivotError::MissingColumn(index_column.to_string()))?;
    let tag_idx = result
        .column_index(TAG_COLUMN)
        .ok_or_else(|| PivotError::MissingColumn(TAG_COLUMN.to_string()))?;
    let value_idx = result
        .column_index(VALUE_COLUMN)
        .ok_or_else(|| PivotError::MissingColumn(VALUE_COLUMN.to_string()))?;

    // Index values and tags both keep first-seen order.
    let mut index_order: Vec<Value> = Vec::new();
    let mut index_pos: HashMap<String, usize> = HashMap::new();
    let mut tags: Vec<String> = Vec::new();
    let mut cells: Vec<HashMap<String, Value>> = Vec::new();
    let mut dropped = 0usize;

    for row in &result.rows {
        let index_value = &row[index_idx];
        let key = cell_text(index_value);
        let pos = match index_pos.get(&key) {
            Some(&pos) => pos,
            None => {
                index_pos.insert(key, index_order.len());
                index_order.push(index_value.clone());
                cells.push(HashMap::new());
                index_order.len() - 1
            }
        };

        let tag = cell_text(&row[tag_idx]);
        if !tags.contains(&tag) {
            tags.push(tag.clone());
        }

        // First value wins for a given (index, tag) pair.
        if cells[pos].contains_key(&tag) {
            dropped += 1;
        } else {
            cells[pos].insert(tag, row[value_idx].clone());
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, "pivot dropped duplicate (index, tag) cells");
    }

    let mut columns = Vec::with_capacity(tags.len() + 1);
    columns.push(index_column.to_string());
    columns.extend(tags.iter().cloned());

    let rows = index_order
        .into_iter()
        .zip(cells.iter_mut())
        .map(|(index_value, row_cells)| {
            let mut out = Vec::with_capacity(tags.len() + 1);
            out.push(index_value);
            for tag in &tags {
                out.push(row_cells.remove(tag).unwrap_or(Value::Null));
            }
            out
        })
        .collect();

    Ok(QueryResult { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn long_result(rows: Vec<Vec<Value>>) -> QueryResult {
        QueryResult {
            columns: vec!["date".into(), "tag".into(), "value".into()],
            rows,
        }
    }

    #[test]
    fn spreads_tags_into_columns() {
        let result = long_result(vec![
            vec![json!("2024-01-01"), json!("A"), json!(1)],
            vec![json!("2024-01-01"), json!("B"), json!(2)],
            vec![json!("2024-01-02"), json!("A"), json!(3)],
        ]);

        let pivoted = pivot_result(&result, "date").unwrap();
        assert_eq!(pivoted.columns, vec!["date", "A", "B"]);
        assert_eq!(
            pivoted.rows,
            vec![
                vec![json!("2024-01-01"), json!(1), json!(2)],
                vec![json!("2024-01-02"), json!(3), Value::Null],
            ]
        );
    }

    #[test]
    fn first_value_wins_on_duplicates() {
        let result = long_result(vec![
            vec![json!("2024-01-01"), json!("A"), json!(1)],
            vec![json!("2024-01-01"), json!("A"), json!(99)],
        ]);

        let pivoted = pivot_result(&result, "date").unwrap();
        assert_eq!(pivoted.rows, vec![vec![json!("2024-01-01"), json!(1)]]);
    }

    #[test]
    fn missing_tag_column_is_reported() {
        let result = QueryResult {
            columns: vec!["date".into(), "value".into()],
            rows: vec![],
        };
        assert_eq!(
            pivot_result(&result, "date"),
            Err(PivotError::MissingColumn("tag".to_string()))
        );
    }

    #[test]
    fn missing_index_column_is_reported() {
        let result = long_result(vec![]);
        assert_eq!(
            pivot_result(&result, "ts"),
            Err(PivotError::MissingColumn("ts".to_string()))
        );
    }
}
