//! HTML building blocks for the console pages.
//!
//! Server-rendered strings with Tailwind via CDN; no template engine and no
//! embedded asset bundle.

use crate::session::Session;
use datadesk_core::table::{cell_text, QueryResult};

/// Base HTML layout wrapper.
pub fn layout(title: &str, session: Option<&Session>, content: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - DataDesk</title>
    <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-gray-50 min-h-screen">
    {nav}
    <main class="p-6 lg:p-8">
        <div class="max-w-7xl mx-auto">
            {content}
        </div>
    </main>
</body>
</html>"##,
        title = html_escape(title),
        nav = nav_bar(session),
        content = content,
    )
}

fn nav_bar(session: Option<&Session>) -> String {
    let Some(session) = session else {
        return String::new();
    };

    let mut links = vec![r#"<a href="/" class="hover:underline">Tables</a>"#.to_string()];
    if session.is_admin() {
        links.push(r#"<a href="/users" class="hover:underline">Users</a>"#.to_string());
        links.push(r#"<a href="/activity" class="hover:underline">Activity</a>"#.to_string());
    }

    format!(
        r##"<nav class="bg-indigo-700 text-white px-6 py-3 flex items-center justify-between shadow">
        <div class="flex items-center gap-6">
            <a href="/" class="font-semibold text-lg">DataDesk</a>
            {links}
        </div>
        <div class="flex items-center gap-4 text-sm">
            <span>{username} ({role})</span>
            <a href="/logout" class="bg-indigo-600 hover:bg-indigo-500 px-3 py-1 rounded">Sign out</a>
        </div>
    </nav>"##,
        links = links.join("\n            "),
        username = html_escape(&session.username),
        role = session.role,
    )
}

/// Inline banner for a recoverable error.
pub fn error_banner(message: &str) -> String {
    format!(
        r#"<div class="mb-4 p-3 bg-red-50 border border-red-200 rounded text-red-700">{}</div>"#,
        html_escape(message)
    )
}

/// Inline banner for a success message.
pub fn success_banner(message: &str) -> String {
    format!(
        r#"<div class="mb-4 p-3 bg-green-50 border border-green-200 rounded text-green-700">{}</div>"#,
        html_escape(message)
    )
}

/// Placeholder content for an empty page.
pub fn empty_state(title: &str, message: &str, action: Option<(&str, &str)>) -> String {
    let action_html = action
        .map(|(label, href)| {
            format!(
                r#"<a href="{}" class="inline-block mt-4 px-4 py-2 bg-indigo-600 text-white rounded">{}</a>"#,
                href,
                html_escape(label)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="text-center py-16 bg-white rounded-lg border border-gray-200">
            <h2 class="text-lg font-semibold text-gray-700">{}</h2>
            <p class="text-gray-500 mt-1">{}</p>
            {}
        </div>"#,
        html_escape(title),
        html_escape(message),
        action_html
    )
}

/// Render a query result as an HTML grid.
pub fn result_table(result: &QueryResult) -> String {
    let mut html = String::from(
        r#"<div class="overflow-x-auto bg-white rounded-lg border border-gray-200"><table class="min-w-full text-sm"><thead class="bg-gray-100 text-left"><tr>"#,
    );

    for column in &result.columns {
        html.push_str(&format!(
            r#"<th class="px-3 py-2 font-medium text-gray-700">{}</th>"#,
            html_escape(column)
        ));
    }
    html.push_str("</tr></thead><tbody>");

    for row in &result.rows {
        html.push_str(r#"<tr class="border-t border-gray-100">"#);
        for cell in row {
            html.push_str(&format!(
                r#"<td class="px-3 py-2 text-gray-600">{}</td>"#,
                html_escape(&cell_text(cell))
            ));
        }
        html.push_str("</tr>");
    }

    html.push_str("</tbody></table></div>");
    html
}

/// Simple HTML escape function.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn html_escape_covers_the_specials() {
        assert_eq!(
            html_escape(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;"
        );
    }

    #[test]
    fn result_table_escapes_cells() {
        let result = QueryResult {
            columns: vec!["note".into()],
            rows: vec![vec![json!("<script>alert(1)</script>")]],
        };
        let html = result_table(&result);
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
