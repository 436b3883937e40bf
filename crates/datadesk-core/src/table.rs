//! Columnar result model shared by the data layer, the transforms, and the
//! console pages.

use serde_json::Value;

/// An in-memory tabular result: ordered column names plus rows of JSON
/// values in the same order. Built by the query executor, reshaped by the
/// pivot transform, rendered by the pages and the CSV exporter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Render a cell for display or export. Strings pass through unquoted,
/// numbers and booleans use their canonical form, NULL renders empty, and
/// anything structured falls back to compact JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn column_index_finds_exact_names() {
        let result = QueryResult::new(vec!["id".into(), "tag".into(), "value".into()]);
        assert_eq!(result.column_index("tag"), Some(1));
        assert_eq!(result.column_index("Tag"), None);
    }

    #[test]
    fn cell_text_renders_scalars() {
        assert_eq!(cell_text(&json!("plain")), "plain");
        assert_eq!(cell_text(&json!(42)), "42");
        assert_eq!(cell_text(&json!(1.5)), "1.5");
        assert_eq!(cell_text(&json!(true)), "true");
        assert_eq!(cell_text(&Value::Null), "");
        assert_eq!(cell_text(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
