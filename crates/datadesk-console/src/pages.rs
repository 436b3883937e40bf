//! Page HTML for the console.

use crate::params::BrowseParams;
use crate::session::Session;
use crate::templates::{
    empty_state, error_banner, html_escape, layout, result_table, success_banner,
};
use chrono::NaiveDate;
use datadesk_audit::AuditEvent;
use datadesk_core::QueryResult;
use datadesk_pg::query::MAX_ROWS;
use datadesk_pg::{ColumnInfo, TableInfo, User, UserRole};

/// One filter widget on the browse page: a multi-select when the column's
/// distinct values could be enumerated, a free-text substring box otherwise.
#[derive(Debug, Clone)]
pub struct FilterWidget {
    pub column: String,
    pub options: Option<Vec<String>>,
}

/// Everything the browse page needs to render.
pub struct BrowseView<'a> {
    pub table: &'a str,
    pub date_field: Option<&'a str>,
    pub default_start: NaiveDate,
    pub default_end: NaiveDate,
    pub widgets: &'a [FilterWidget],
    pub params: &'a BrowseParams,
    /// Inline error from filtering, querying, or pivoting.
    pub banner: Option<String>,
    pub result: Option<&'a QueryResult>,
    /// Whether the displayed result is the pivoted reshape.
    pub pivoted: bool,
    /// Query string reproducing this view, for the export link.
    pub query_string: String,
}

/// Home page: the table listing.
pub fn home_page(session: &Session, project: Option<&str>, tables: &[TableInfo]) -> String {
    let heading = project.unwrap_or("Tables");

    let content = if tables.is_empty() {
        empty_state(
            "No tables",
            "The connected database has no browsable tables.",
            None,
        )
    } else {
        let items: Vec<String> = tables
            .iter()
            .map(|t| {
                let insert_link = if session.is_admin() {
                    format!(
                        r#" <a href="/tables/{name}/insert" class="text-sm text-gray-400 hover:text-indigo-600">+ insert</a>"#,
                        name = html_escape(&t.name)
                    )
                } else {
                    String::new()
                };
                format!(
                    r#"<li class="py-2 border-b border-gray-100 last:border-0">
                        <a href="/tables/{name}" class="text-indigo-700 hover:underline font-medium">{name}</a>{insert_link}
                    </li>"#,
                    name = html_escape(&t.name),
                    insert_link = insert_link
                )
            })
            .collect();

        format!(
            r#"<div class="bg-white rounded-lg border border-gray-200 p-6">
                <ul>{}</ul>
            </div>"#,
            items.join("\n")
        )
    };

    let body = format!(
        r#"<h1 class="text-xl font-semibold text-gray-800 mb-4">{}</h1>{}"#,
        html_escape(heading),
        content
    );

    layout("Tables", Some(session), &body)
}

/// Table browser: filter form plus the (possibly pivoted) result grid.
pub fn browse_page(session: &Session, view: &BrowseView<'_>) -> String {
    let mut body = format!(
        r#"<h1 class="text-xl font-semibold text-gray-800 mb-4">{}</h1>"#,
        html_escape(view.table)
    );

    if let Some(banner) = &view.banner {
        body.push_str(&error_banner(banner));
    }

    body.push_str(&filter_form(view));

    if let Some(result) = view.result {
        let cap_note = if result.row_count() as i64 >= MAX_ROWS {
            format!(" (capped at {})", MAX_ROWS)
        } else {
            String::new()
        };
        let pivot_note = if view.pivoted { ", pivoted" } else { "" };

        let export_href = format!(
            "/tables/{}/export.csv{}",
            html_escape(view.table),
            if view.query_string.is_empty() {
                String::new()
            } else {
                format!("?{}", view.query_string)
            }
        );

        body.push_str(&format!(
            r#"<div class="flex items-center justify-between mt-6 mb-2">
                <p class="text-sm text-gray-600">{} rows{}{}</p>
                <a href="{}" class="text-sm px-3 py-1 bg-indigo-600 text-white rounded hover:bg-indigo-700">Export CSV</a>
            </div>"#,
            result.row_count(),
            cap_note,
            pivot_note,
            export_href
        ));

        if result.is_empty() {
            body.push_str(&empty_state("No rows", "Nothing matched the active filters.", None));
        } else {
            body.push_str(&result_table(result));
        }
    }

    layout(view.table, Some(session), &body)
}

fn filter_form(view: &BrowseView<'_>) -> String {
    let mut form = format!(
        r#"<form method="GET" action="/tables/{}" class="bg-white rounded-lg border border-gray-200 p-4 space-y-4">"#,
        html_escape(view.table)
    );

    if view.date_field.is_some() {
        let start = view
            .params
            .start
            .clone()
            .unwrap_or_else(|| view.default_start.to_string());
        let end = view
            .params
            .end
            .clone()
            .unwrap_or_else(|| view.default_end.to_string());

        form.push_str(&format!(
            r#"<div class="flex items-end gap-4">
                <div>
                    <label class="block text-sm text-gray-600 mb-1">Start date</label>
                    <input type="date" name="start" value="{start}" class="border border-gray-300 rounded px-2 py-1">
                </div>
                <div>
                    <label class="block text-sm text-gray-600 mb-1">End date</label>
                    <input type="date" name="end" value="{end}" class="border border-gray-300 rounded px-2 py-1">
                </div>
            </div>"#,
            start = html_escape(&start),
            end = html_escape(&end),
        ));
    }

    if !view.widgets.is_empty() {
        form.push_str(r#"<div class="grid grid-cols-1 md:grid-cols-3 gap-4">"#);
        for widget in view.widgets {
            form.push_str(&filter_widget(widget, view.params));
        }
        form.push_str("</div>");
    }

    let mut controls = String::new();
    if view.date_field.is_some() {
        let checked = if view.params.pivot { " checked" } else { "" };
        controls.push_str(&format!(
            r#"<label class="flex items-center gap-2 text-sm text-gray-600">
                <input type="checkbox" name="pivot" value="1"{checked}> Pivot tag values into columns
            </label>"#,
        ));
    }

    form.push_str(&format!(
        r#"<div class="flex items-center justify-between">
            {}
            <button type="submit" class="px-4 py-2 bg-indigo-600 text-white rounded hover:bg-indigo-700">Run query</button>
        </div>
    </form>"#,
        controls
    ));

    form
}

fn filter_widget(widget: &FilterWidget, params: &BrowseParams) -> String {
    let name = html_escape(&widget.column);

    match &widget.options {
        Some(options) => {
            let selected = params.selected(&widget.column);
            let option_html: Vec<String> = options
                .iter()
                .map(|option| {
                    let marker = if selected.iter().any(|s| s == option) {
                        " selected"
                    } else {
                        ""
                    };
                    format!(
                        r#"<option value="{value}"{marker}>{value}</option>"#,
                        value = html_escape(option),
                        marker = marker
                    )
                })
                .collect();

            format!(
                r#"<div>
                    <label class="block text-sm text-gray-600 mb-1">{name}</label>
                    <select multiple name="f.{name}" size="4" class="w-full border border-gray-300 rounded px-2 py-1">
                        {options}
                    </select>
                </div>"#,
                name = name,
                options = option_html.join("\n")
            )
        }
        None => {
            let value = params.substring(&widget.column).unwrap_or("");
            format!(
                r#"<div>
                    <label class="block text-sm text-gray-600 mb-1">{name} (contains)</label>
                    <input type="text" name="q.{name}" value="{value}" class="w-full border border-gray-300 rounded px-2 py-1">
                </div>"#,
                name = name,
                value = html_escape(value)
            )
        }
    }
}

/// Row-insert form: one text input per introspected column.
pub fn insert_page(
    session: &Session,
    table: &str,
    columns: &[ColumnInfo],
    banner: Option<(bool, &str)>,
) -> String {
    let mut body = format!(
        r#"<h1 class="text-xl font-semibold text-gray-800 mb-4">Insert into {}</h1>"#,
        html_escape(table)
    );

    if let Some((ok, message)) = banner {
        body.push_str(&if ok {
            success_banner(message)
        } else {
            error_banner(message)
        });
    }

    let fields: Vec<String> = columns
        .iter()
        .map(|column| {
            format!(
                r#"<div>
                    <label class="block text-sm text-gray-600 mb-1">{name} <span class="text-gray-400">({data_type})</span></label>
                    <input type="text" name="{name}" class="w-full border border-gray-300 rounded px-2 py-1">
                </div>"#,
                name = html_escape(&column.name),
                data_type = html_escape(&column.data_type),
            )
        })
        .collect();

    body.push_str(&format!(
        r#"<form method="POST" action="/tables/{table}/insert" class="bg-white rounded-lg border border-gray-200 p-4 space-y-4 max-w-2xl">
            {fields}
            <p class="text-sm text-gray-400">Blank fields are left to the column default.</p>
            <button type="submit" class="px-4 py-2 bg-indigo-600 text-white rounded hover:bg-indigo-700">Insert row</button>
        </form>"#,
        table = html_escape(table),
        fields = fields.join("\n")
    ));

    layout("Insert", Some(session), &body)
}

/// Account administration: listing plus the create form.
pub fn users_page(session: &Session, users: &[User], banner: Option<(bool, &str)>) -> String {
    let mut body = String::from(r#"<h1 class="text-xl font-semibold text-gray-800 mb-4">Users</h1>"#);

    if let Some((ok, message)) = banner {
        body.push_str(&if ok {
            success_banner(message)
        } else {
            error_banner(message)
        });
    }

    let rows: Vec<String> = users
        .iter()
        .map(|user| {
            let action = if user.username == session.username {
                r#"<span class="text-gray-400 text-sm">current session</span>"#.to_string()
            } else {
                format!(
                    r#"<form method="POST" action="/users/{}/delete">
                        <button type="submit" class="text-sm text-red-600 hover:underline">Delete</button>
                    </form>"#,
                    user.id
                )
            };
            format!(
                r#"<tr class="border-t border-gray-100">
                    <td class="px-3 py-2">{}</td>
                    <td class="px-3 py-2">{}</td>
                    <td class="px-3 py-2">{}</td>
                    <td class="px-3 py-2">{}</td>
                    <td class="px-3 py-2">{}</td>
                </tr>"#,
                user.id,
                html_escape(&user.username),
                html_escape(&user.role),
                user.created_at.format("%Y-%m-%d %H:%M"),
                action
            )
        })
        .collect();

    body.push_str(&format!(
        r#"<div class="overflow-x-auto bg-white rounded-lg border border-gray-200 mb-6">
            <table class="min-w-full text-sm">
                <thead class="bg-gray-100 text-left"><tr>
                    <th class="px-3 py-2 font-medium text-gray-700">ID</th>
                    <th class="px-3 py-2 font-medium text-gray-700">Username</th>
                    <th class="px-3 py-2 font-medium text-gray-700">Role</th>
                    <th class="px-3 py-2 font-medium text-gray-700">Created</th>
                    <th class="px-3 py-2"></th>
                </tr></thead>
                <tbody>{}</tbody>
            </table>
        </div>"#,
        rows.join("\n")
    ));

    let role_options: Vec<String> = UserRole::all()
        .iter()
        .map(|role| format!(r#"<option value="{role}">{role}</option>"#))
        .collect();

    body.push_str(&format!(
        r#"<h2 class="text-lg font-semibold text-gray-800 mb-2">Create account</h2>
        <form method="POST" action="/users" class="bg-white rounded-lg border border-gray-200 p-4 flex items-end gap-4 max-w-2xl">
            <div>
                <label class="block text-sm text-gray-600 mb-1">Username</label>
                <input type="text" name="username" required class="border border-gray-300 rounded px-2 py-1">
            </div>
            <div>
                <label class="block text-sm text-gray-600 mb-1">Password</label>
                <input type="password" name="password" required class="border border-gray-300 rounded px-2 py-1">
            </div>
            <div>
                <label class="block text-sm text-gray-600 mb-1">Role</label>
                <select name="role" class="border border-gray-300 rounded px-2 py-1">{}</select>
            </div>
            <button type="submit" class="px-4 py-2 bg-indigo-600 text-white rounded hover:bg-indigo-700">Create</button>
        </form>"#,
        role_options.join("")
    ));

    layout("Users", Some(session), &body)
}

/// Activity log: recent audit events, newest first.
pub fn activity_page(session: &Session, events: &[AuditEvent]) -> String {
    let mut body =
        String::from(r#"<h1 class="text-xl font-semibold text-gray-800 mb-4">Activity</h1>"#);

    if events.is_empty() {
        body.push_str(&empty_state(
            "No activity",
            "Nothing has been recorded since startup.",
            None,
        ));
    } else {
        let rows: Vec<String> = events
            .iter()
            .map(|event| {
                format!(
                    r#"<tr class="border-t border-gray-100">
                        <td class="px-3 py-2 whitespace-nowrap">{}</td>
                        <td class="px-3 py-2">{}</td>
                        <td class="px-3 py-2">{}</td>
                        <td class="px-3 py-2">{}</td>
                        <td class="px-3 py-2 text-red-600">{}</td>
                    </tr>"#,
                    event.occurred_at.format("%Y-%m-%d %H:%M:%S"),
                    event.event_type,
                    html_escape(&event.actor),
                    html_escape(event.table.as_deref().or(event.target.as_deref()).unwrap_or("")),
                    html_escape(event.error.as_deref().unwrap_or("")),
                )
            })
            .collect();

        body.push_str(&format!(
            r#"<div class="overflow-x-auto bg-white rounded-lg border border-gray-200">
                <table class="min-w-full text-sm">
                    <thead class="bg-gray-100 text-left"><tr>
                        <th class="px-3 py-2 font-medium text-gray-700">Time</th>
                        <th class="px-3 py-2 font-medium text-gray-700">Event</th>
                        <th class="px-3 py-2 font-medium text-gray-700">Actor</th>
                        <th class="px-3 py-2 font-medium text-gray-700">Target</th>
                        <th class="px-3 py-2 font-medium text-gray-700">Error</th>
                    </tr></thead>
                    <tbody>{}</tbody>
                </table>
            </div>"#,
            rows.join("\n")
        ));
    }

    layout("Activity", Some(session), &body)
}
