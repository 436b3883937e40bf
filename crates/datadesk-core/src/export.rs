//! CSV serialization of query results.

use crate::table::{cell_text, QueryResult};

/// Serialize a result as CSV: one header row of column names followed by one
/// line per row, in display order. Fields containing a comma, quote, or
/// newline are double-quoted with embedded quotes doubled.
pub fn write_csv(result: &QueryResult) -> String {
    let mut csv = String::new();

    let headers: Vec<String> = result.columns.iter().map(|c| escape_csv(c)).collect();
    csv.push_str(&headers.join(","));
    csv.push('\n');

    for row in &result.rows {
        let fields: Vec<String> = row.iter().map(|v| escape_csv(&cell_text(v))).collect();
        csv.push_str(&fields.join(","));
        csv.push('\n');
    }

    csv
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    /// Minimal CSV reader used to check the export round-trips.
    fn parse_csv(input: &str) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let mut record = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '"' if in_quotes => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                '"' => in_quotes = true,
                ',' if !in_quotes => {
                    record.push(std::mem::take(&mut field));
                }
                '\n' if !in_quotes => {
                    record.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut record));
                }
                other => field.push(other),
            }
        }
        rows
    }

    #[test]
    fn plain_values_pass_through() {
        let result = QueryResult {
            columns: vec!["id".into(), "name".into()],
            rows: vec![
                vec![json!(1), json!("alpha")],
                vec![json!(2), Value::Null],
            ],
        };
        assert_eq!(write_csv(&result), "id,name\n1,alpha\n2,\n");
    }

    #[test]
    fn commas_quotes_and_newlines_are_quoted() {
        let result = QueryResult {
            columns: vec!["note".into()],
            rows: vec![
                vec![json!("a,b")],
                vec![json!("say \"hi\"")],
                vec![json!("two\nlines")],
            ],
        };
        assert_eq!(
            write_csv(&result),
            "note\n\"a,b\"\n\"say \"\"hi\"\"\"\n\"two\nlines\"\n"
        );
    }

    #[test]
    fn export_round_trips() {
        let result = QueryResult {
            columns: vec!["id".into(), "note".into()],
            rows: vec![
                vec![json!(1), json!("plain")],
                vec![json!(2), json!("quoted, \"field\"")],
                vec![json!(3), json!("multi\nline")],
            ],
        };

        let parsed = parse_csv(&write_csv(&result));
        assert_eq!(parsed.len(), result.row_count() + 1);
        assert_eq!(parsed[0], vec!["id", "note"]);
        for (parsed_row, row) in parsed[1..].iter().zip(&result.rows) {
            let expected: Vec<String> = row.iter().map(crate::table::cell_text).collect();
            assert_eq!(parsed_row, &expected);
        }
    }
}
