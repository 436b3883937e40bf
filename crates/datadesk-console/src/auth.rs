//! Authentication for the console.
//!
//! Form-based login validated against the user store, with an in-memory
//! session keyed by a random cookie token. Every route except the login
//! page and the health check requires a valid session.

use axum::{
    extract::{Query, Request, State},
    http::header,
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use datadesk_pg::DbError;
use serde::Deserialize;

use crate::state::AppState;
use crate::templates::html_escape;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "datadesk_session";

/// Session middleware: resolves the cookie to a session and stashes it in
/// request extensions, or redirects to the login page.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();

    // The login flow and the health check stay reachable without a session.
    if path == "/login" || path == "/healthz" {
        return next.run(request).await;
    }

    if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        if let Ok(cookies) = cookie_header.to_str() {
            if let Some(token) = extract_session_cookie(cookies) {
                if let Some(session) = state.sessions().get(&token) {
                    request.extensions_mut().insert(session);
                    return next.run(request).await;
                }
            }
        }
    }

    let redirect_to = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    Redirect::to(&format!(
        "/login?redirect={}",
        urlencoding::encode(redirect_to)
    ))
    .into_response()
}

/// Extract the session token from a cookie header.
fn extract_session_cookie(cookies: &str) -> Option<String> {
    for cookie in cookies.split(';') {
        let cookie = cookie.trim();
        if let Some(value) = cookie.strip_prefix(&format!("{}=", SESSION_COOKIE_NAME)) {
            return Some(value.to_string());
        }
    }
    None
}

/// Login page query parameters.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub redirect: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Handler for the login page (GET).
pub async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    Html(login_page_template(
        query.redirect.as_deref(),
        query.error.as_deref(),
    ))
}

/// Handler for login form submission (POST).
pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match state.users().authenticate(&form.username, &form.password).await {
        Ok(role) => {
            if let Err(e) = state.audit().log_login_succeeded(&form.username, role.as_str()).await {
                tracing::warn!(error = %e, "failed to audit login");
            }

            let token = state.sessions().create(&form.username, role);

            let redirect_url = form
                .redirect
                .filter(|r| !r.is_empty() && r.starts_with('/'))
                .unwrap_or_else(|| "/".to_string());

            let cookie = format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age=86400",
                SESSION_COOKIE_NAME, token
            );

            ([(header::SET_COOKIE, cookie)], Redirect::to(&redirect_url)).into_response()
        }
        Err(DbError::InvalidCredentials) => {
            if let Err(e) = state.audit().log_login_failed(&form.username).await {
                tracing::warn!(error = %e, "failed to audit login failure");
            }

            let redirect = form
                .redirect
                .map(|r| format!("&redirect={}", urlencoding::encode(&r)))
                .unwrap_or_default();

            Redirect::to(&format!("/login?error=invalid{}", redirect)).into_response()
        }
        Err(e) => crate::error::ConsoleError::from(e).into_response(),
    }
}

/// Handler for logout.
pub async fn logout(State(state): State<AppState>, request: Request) -> Response {
    if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        if let Ok(cookies) = cookie_header.to_str() {
            if let Some(token) = extract_session_cookie(cookies) {
                state.sessions().remove(&token);
            }
        }
    }

    let cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE_NAME
    );

    ([(header::SET_COOKIE, cookie)], Redirect::to("/login")).into_response()
}

/// Generate the login page HTML.
fn login_page_template(redirect: Option<&str>, error: Option<&str>) -> String {
    let error_html = if error.is_some() {
        r#"<div class="mb-6 p-3 bg-red-50 border border-red-200 rounded text-red-700">
            Invalid username or password. Please try again.
        </div>"#
    } else {
        ""
    };

    let redirect_input = redirect
        .map(|r| {
            format!(
                r#"<input type="hidden" name="redirect" value="{}">"#,
                html_escape(r)
            )
        })
        .unwrap_or_default();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Sign in - DataDesk</title>
    <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-gradient-to-br from-indigo-600 to-indigo-900 min-h-screen flex items-center justify-center p-4">
    <div class="w-full max-w-md">
        <div class="text-center mb-8">
            <h1 class="text-2xl font-semibold text-white">DataDesk</h1>
            <p class="text-indigo-200 mt-1">Sign in to browse your data</p>
        </div>

        <div class="bg-white rounded-2xl shadow-2xl p-8">
            {error_html}

            <form method="POST" action="/login" class="space-y-5">
                {redirect_input}

                <div>
                    <label for="username" class="block text-sm font-medium text-gray-700 mb-2">Username</label>
                    <input type="text" id="username" name="username" required autofocus
                        class="block w-full px-4 py-3 border border-gray-300 rounded-lg focus:ring-2 focus:ring-indigo-500">
                </div>

                <div>
                    <label for="password" class="block text-sm font-medium text-gray-700 mb-2">Password</label>
                    <input type="password" id="password" name="password" required
                        class="block w-full px-4 py-3 border border-gray-300 rounded-lg focus:ring-2 focus:ring-indigo-500">
                </div>

                <button type="submit"
                    class="w-full py-3 px-4 bg-indigo-600 hover:bg-indigo-700 text-white font-medium rounded-lg">
                    Sign in
                </button>
            </form>
        </div>
    </div>
</body>
</html>"##,
        error_html = error_html,
        redirect_input = redirect_input,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_extracted_among_others() {
        let cookies = "theme=dark; datadesk_session=abc123; other=1";
        assert_eq!(extract_session_cookie(cookies), Some("abc123".to_string()));
        assert_eq!(extract_session_cookie("theme=dark"), None);
    }

    #[test]
    fn login_template_reflects_error_and_redirect() {
        let html = login_page_template(Some("/tables/orders"), Some("invalid"));
        assert!(html.contains("Invalid username or password"));
        assert!(html.contains(r#"value="/tables/orders""#));

        let clean = login_page_template(None, None);
        assert!(!clean.contains("Invalid username or password"));
    }
}
