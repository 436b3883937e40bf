//! Browse-page query parameters and their translation into typed filters.
//!
//! The filter form submits with GET so the export link can reproduce the
//! exact view. Multi-select values arrive as repeated `f.<column>` pairs,
//! substring filters as `q.<column>`, the date range as `start`/`end`, and
//! the pivot toggle as `pivot=1`. Only column names that exist in the live
//! introspection result ever make it into a filter.

use chrono::NaiveDate;
use datadesk_pg::filter::Filter;
use datadesk_pg::ColumnInfo;
use std::collections::BTreeMap;

const SELECT_PREFIX: &str = "f.";
const TEXT_PREFIX: &str = "q.";

/// Raw browse parameters, decoded from the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrowseParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub pivot: bool,
    /// Multi-select selections per column (`f.<column>`).
    pub selections: BTreeMap<String, Vec<String>>,
    /// Substring filters per column (`q.<column>`).
    pub substrings: BTreeMap<String, String>,
}

impl BrowseParams {
    /// Decode from query-string pairs. Repeated keys accumulate for
    /// multi-selects; unknown keys are ignored.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut params = BrowseParams::default();

        for (key, value) in pairs {
            if let Some(column) = key.strip_prefix(SELECT_PREFIX) {
                params
                    .selections
                    .entry(column.to_string())
                    .or_default()
                    .push(value.clone());
            } else if let Some(column) = key.strip_prefix(TEXT_PREFIX) {
                if !value.trim().is_empty() {
                    params
                        .substrings
                        .insert(column.to_string(), value.trim().to_string());
                }
            } else {
                match key.as_str() {
                    "start" if !value.is_empty() => params.start = Some(value.clone()),
                    "end" if !value.is_empty() => params.end = Some(value.clone()),
                    "pivot" if value == "1" || value == "on" => params.pivot = true,
                    _ => {}
                }
            }
        }

        params
    }

    /// Selected values for one column, for re-rendering the form.
    pub fn selected(&self, column: &str) -> &[String] {
        self.selections
            .get(column)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Substring filter for one column, for re-rendering the form.
    pub fn substring(&self, column: &str) -> Option<&str> {
        self.substrings.get(column).map(|s| s.as_str())
    }
}

/// Build typed filters from decoded parameters.
///
/// Filter columns are validated against the introspected column list and
/// the date field is excluded from value filters, so free-text column names
/// in a crafted URL are silently dropped rather than reaching the SQL.
/// A malformed date range is a user-facing error.
pub fn build_filters(
    params: &BrowseParams,
    date_field: Option<&str>,
    columns: &[ColumnInfo],
) -> Result<Vec<Filter>, String> {
    let mut filters = Vec::new();

    if let (Some(field), Some(start), Some(end)) = (date_field, &params.start, &params.end) {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        filters.push(Filter::Range {
            column: field.to_string(),
            start,
            end,
        });
    }

    let known = |name: &str| {
        columns.iter().any(|c| c.name == name) && Some(name) != date_field
    };

    for (column, values) in &params.selections {
        if !known(column) || values.is_empty() {
            continue;
        }
        filters.push(Filter::InList {
            column: column.clone(),
            values: values.clone(),
        });
    }

    for (column, substring) in &params.substrings {
        if !known(column) {
            continue;
        }
        filters.push(Filter::Like {
            column: column.clone(),
            substring: substring.clone(),
        });
    }

    Ok(filters)
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a valid date (expected YYYY-MM-DD)", value))
}

/// Default range for the date widget: yesterday through today.
pub fn default_date_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today.pred_opt().unwrap_or(today), today)
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn repeated_select_keys_accumulate() {
        let params = BrowseParams::from_pairs(&pairs(&[
            ("f.region", "eu"),
            ("f.region", "us"),
            ("q.note", " refund "),
            ("start", "2024-01-01"),
            ("end", "2024-01-31"),
            ("pivot", "1"),
            ("unrelated", "x"),
        ]));

        assert_eq!(params.selected("region"), &["eu", "us"]);
        assert_eq!(params.substring("note"), Some("refund"));
        assert_eq!(params.start.as_deref(), Some("2024-01-01"));
        assert!(params.pivot);
    }

    #[test]
    fn filters_require_introspected_columns() {
        let params = BrowseParams::from_pairs(&pairs(&[
            ("f.region", "eu"),
            ("f.bogus; DROP TABLE users", "x"),
            ("q.note", "refund"),
            ("q.also_bogus", "y"),
        ]));

        let filters = build_filters(&params, None, &columns(&["region", "note"])).unwrap();
        assert_eq!(filters.len(), 2);
        assert!(filters.iter().all(|f| matches!(
            f,
            Filter::InList { column, .. } if column == "region"
        ) || matches!(
            f,
            Filter::Like { column, .. } if column == "note"
        )));
    }

    #[test]
    fn date_field_is_excluded_from_value_filters() {
        let params = BrowseParams::from_pairs(&pairs(&[
            ("start", "2024-01-01"),
            ("end", "2024-01-02"),
            ("f.sample_date", "2024-01-01"),
        ]));

        let filters = build_filters(
            &params,
            Some("sample_date"),
            &columns(&["sample_date", "tag"]),
        )
        .unwrap();

        assert_eq!(filters.len(), 1);
        assert!(matches!(&filters[0], Filter::Range { column, .. } if column == "sample_date"));
    }

    #[test]
    fn range_needs_both_bounds() {
        let params = BrowseParams::from_pairs(&pairs(&[("start", "2024-01-01")]));
        let filters =
            build_filters(&params, Some("sample_date"), &columns(&["sample_date"])).unwrap();
        assert!(filters.is_empty());
    }

    #[test]
    fn malformed_dates_are_a_user_error() {
        let params = BrowseParams::from_pairs(&pairs(&[
            ("start", "01/02/2024"),
            ("end", "2024-01-31"),
        ]));
        let err = build_filters(&params, Some("sample_date"), &columns(&["sample_date"]))
            .unwrap_err();
        assert!(err.contains("01/02/2024"));
    }

    #[test]
    fn default_range_is_yesterday_through_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let (start, end) = default_date_range(today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(end, today);
    }
}
