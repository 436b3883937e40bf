//! Request handlers for the console.
//!
//! Recoverable failures (bad filter input, query errors, refused writes)
//! render as inline banners on the page that caused them; only missing
//! tables, missing permissions, and infrastructure failures become HTTP
//! error responses.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, Response},
    Extension, Form, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Instant;

use crate::error::ConsoleError;
use crate::pages::{self, BrowseView, FilterWidget};
use crate::params::{build_filters, default_date_range, BrowseParams};
use crate::session::Session;
use crate::state::AppState;

use datadesk_core::{pivot_result, QueryResult};
use datadesk_pg::filter::{distinct_values, is_temporal_column};
use datadesk_pg::query::run_query;
use datadesk_pg::{insert, introspect, DbError, UserRole};

/// Unauthenticated health check.
pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "service": "datadesk" }))
}

/// Home page: the visible table listing.
pub async fn home(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, ConsoleError> {
    let tables = state.visible_tables(introspect::list_tables(state.pool()).await?);
    let config = state.config();
    Ok(Html(pages::home_page(
        &session,
        config.project.as_deref(),
        &tables,
    )))
}

// =============================================================================
// Table browser
// =============================================================================

struct BrowseContext {
    columns: Vec<introspect::ColumnInfo>,
    date_field: Option<String>,
}

/// Resolve a requested table against live introspection, or 404.
async fn browse_context(state: &AppState, table: &str) -> Result<BrowseContext, ConsoleError> {
    let tables = state.visible_tables(introspect::list_tables(state.pool()).await?);
    if introspect::resolve_table(&tables, table).is_none() {
        return Err(ConsoleError::NotFound(format!("table '{}'", table)));
    }

    let columns = introspect::table_columns(state.pool(), table).await?;
    if columns.is_empty() {
        return Err(ConsoleError::NotFound(format!("table '{}'", table)));
    }

    // The first date/time-named column drives the range filter.
    let date_field = columns
        .iter()
        .find(|c| is_temporal_column(&c.name))
        .map(|c| c.name.clone());

    Ok(BrowseContext {
        columns,
        date_field,
    })
}

/// Build the filter widgets: a multi-select per enumerable column, a
/// substring box for the rest. Enumeration failures degrade to the text
/// box rather than failing the page.
async fn filter_widgets(
    state: &AppState,
    table: &str,
    ctx: &BrowseContext,
) -> Vec<FilterWidget> {
    let mut widgets = Vec::new();

    for column in &ctx.columns {
        if Some(column.name.as_str()) == ctx.date_field.as_deref() {
            continue;
        }

        let options = match distinct_values(state.pool(), table, &column.name).await {
            Ok(options) => options,
            Err(e) => {
                tracing::warn!(
                    table,
                    column = %column.name,
                    error = %e,
                    "distinct-value enumeration failed, falling back to substring filter"
                );
                None
            }
        };

        widgets.push(FilterWidget {
            column: column.name.clone(),
            options,
        });
    }

    widgets
}

/// Run the filtered, row-capped query, auditing both outcomes. The error
/// side is a user-facing message for the inline banner.
async fn run_browse_query(
    state: &AppState,
    actor: &str,
    table: &str,
    ctx: &BrowseContext,
    params: &BrowseParams,
) -> Result<QueryResult, String> {
    let filters = build_filters(params, ctx.date_field.as_deref(), &ctx.columns)?;

    let started = Instant::now();
    match run_query(state.pool(), table, &ctx.columns, &filters).await {
        Ok((result, sql)) => {
            let duration_ms = started.elapsed().as_millis() as u64;
            if let Err(e) = state
                .audit()
                .log_query_executed(actor, table, &sql, result.row_count() as u64, duration_ms)
                .await
            {
                tracing::warn!(error = %e, "failed to audit query");
            }
            Ok(result)
        }
        Err(e) => {
            tracing::error!(actor, table, error = %e, "query failed");
            if let Err(audit_err) = state
                .audit()
                .log_query_failed(actor, table, None, &e.to_string())
                .await
            {
                tracing::warn!(error = %audit_err, "failed to audit query failure");
            }
            Err(e.to_string())
        }
    }
}

/// Apply the pivot reshape when requested. Returns the result to display,
/// whether it is pivoted, and an optional banner message on fallback.
fn apply_pivot(
    result: QueryResult,
    ctx: &BrowseContext,
    params: &BrowseParams,
) -> (QueryResult, bool, Option<String>) {
    if !params.pivot {
        return (result, false, None);
    }

    let Some(date_field) = ctx.date_field.as_deref() else {
        return (
            result,
            false,
            Some("pivot needs a date column; showing the flat table".to_string()),
        );
    };

    match pivot_result(&result, date_field) {
        Ok(pivoted) => (pivoted, true, None),
        Err(e) => (
            result,
            false,
            Some(format!("pivot failed: {}; showing the flat table", e)),
        ),
    }
}

fn encode_query_string(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Table browser page.
pub async fn browse(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(table): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Html<String>, ConsoleError> {
    let ctx = browse_context(&state, &table).await?;
    let params = BrowseParams::from_pairs(&pairs);
    let widgets = filter_widgets(&state, &table, &ctx).await;

    let (result, pivoted, banner) =
        match run_browse_query(&state, &session.username, &table, &ctx, &params).await {
            Ok(result) => {
                let (result, pivoted, pivot_banner) = apply_pivot(result, &ctx, &params);
                (Some(result), pivoted, pivot_banner)
            }
            Err(message) => (None, false, Some(message)),
        };

    let (default_start, default_end) = default_date_range(Utc::now().date_naive());

    let view = BrowseView {
        table: &table,
        date_field: ctx.date_field.as_deref(),
        default_start,
        default_end,
        widgets: &widgets,
        params: &params,
        banner,
        result: result.as_ref(),
        pivoted,
        query_string: encode_query_string(&pairs),
    };

    Ok(Html(pages::browse_page(&session, &view)))
}

/// CSV export of the current view (flat or pivoted).
pub async fn export_csv(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(table): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ConsoleError> {
    let ctx = browse_context(&state, &table).await?;
    let params = BrowseParams::from_pairs(&pairs);

    let result = run_browse_query(&state, &session.username, &table, &ctx, &params)
        .await
        .map_err(ConsoleError::InvalidRequest)?;

    let (result, pivoted, _) = apply_pivot(result, &ctx, &params);

    let filename = if pivoted {
        format!("{}_pivot_export.csv", table)
    } else {
        format!("{}_export.csv", table)
    };

    let csv = datadesk_core::export::write_csv(&result);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(Body::from(csv))
        .map_err(|e| ConsoleError::Internal(e.into()))
}

// =============================================================================
// Row insert (admin)
// =============================================================================

/// Insert form (GET).
pub async fn insert_form(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(table): Path<String>,
) -> Result<Html<String>, ConsoleError> {
    require_admin(&session)?;
    let ctx = browse_context(&state, &table).await?;
    Ok(Html(pages::insert_page(&session, &table, &ctx.columns, None)))
}

/// Insert submission (POST).
pub async fn insert_submit(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(table): Path<String>,
    Form(submitted): Form<HashMap<String, String>>,
) -> Result<Html<String>, ConsoleError> {
    require_admin(&session)?;
    let ctx = browse_context(&state, &table).await?;

    // Keep only introspected columns; anything else in the form body is
    // not ours.
    let values: HashMap<String, String> = ctx
        .columns
        .iter()
        .filter_map(|c| submitted.get(&c.name).map(|v| (c.name.clone(), v.clone())))
        .collect();

    let banner = match insert::insert_row(state.pool(), &table, &ctx.columns, &values).await {
        Ok(()) => {
            let payload: serde_json::Value = values
                .iter()
                .filter(|(_, v)| !v.trim().is_empty())
                .map(|(k, v)| (k.clone(), json!(v)))
                .collect::<serde_json::Map<_, _>>()
                .into();
            if let Err(e) = state
                .audit()
                .log_row_inserted(&session.username, &table, payload)
                .await
            {
                tracing::warn!(error = %e, "failed to audit insert");
            }
            (true, "Row inserted.".to_string())
        }
        Err(DbError::EmptySubmission) => {
            (false, DbError::EmptySubmission.to_string())
        }
        Err(e) => {
            tracing::error!(actor = %session.username, table = %table, error = %e, "insert failed");
            if let Err(audit_err) = state
                .audit()
                .log_write_failed(&session.username, &table, &e.to_string())
                .await
            {
                tracing::warn!(error = %audit_err, "failed to audit write failure");
            }
            (false, e.to_string())
        }
    };

    Ok(Html(pages::insert_page(
        &session,
        &table,
        &ctx.columns,
        Some((banner.0, banner.1.as_str())),
    )))
}

// =============================================================================
// Account administration (admin)
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateUserForm {
    pub username: String,
    pub password: String,
    pub role: String,
}

async fn render_users_page(
    state: &AppState,
    session: &Session,
    banner: Option<(bool, &str)>,
) -> Result<Html<String>, ConsoleError> {
    let users = state.users().list().await?;
    Ok(Html(pages::users_page(session, &users, banner)))
}

/// User listing plus create form (GET).
pub async fn users_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, ConsoleError> {
    require_admin(&session)?;
    render_users_page(&state, &session, None).await
}

/// Create an account (POST).
pub async fn users_create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<CreateUserForm>,
) -> Result<Html<String>, ConsoleError> {
    require_admin(&session)?;

    let outcome = match UserRole::from_str(&form.role) {
        Ok(role) => state
            .users()
            .create(&form.username, &form.password, role)
            .await
            .map(|_| role),
        Err(e) => Err(e),
    };

    let banner = match outcome {
        Ok(role) => {
            if let Err(e) = state
                .audit()
                .log_user_created(&session.username, &form.username, role.as_str())
                .await
            {
                tracing::warn!(error = %e, "failed to audit account creation");
            }
            (true, format!("Account '{}' created.", form.username))
        }
        Err(e) => {
            tracing::error!(actor = %session.username, target = %form.username, error = %e, "account creation failed");
            if let Err(audit_err) = state
                .audit()
                .log_user_admin_failed(&session.username, Some(&form.username), &e.to_string())
                .await
            {
                tracing::warn!(error = %audit_err, "failed to audit account failure");
            }
            (false, e.to_string())
        }
    };

    render_users_page(&state, &session, Some((banner.0, banner.1.as_str()))).await
}

/// Delete an account (POST).
pub async fn users_delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
) -> Result<Html<String>, ConsoleError> {
    require_admin(&session)?;

    let banner = match state.users().delete(id, &session.username).await {
        Ok(username) => {
            if let Err(e) = state
                .audit()
                .log_user_deleted(&session.username, &username)
                .await
            {
                tracing::warn!(error = %e, "failed to audit account deletion");
            }
            (true, format!("Account '{}' deleted.", username))
        }
        Err(e) => {
            tracing::warn!(actor = %session.username, id, error = %e, "account deletion refused or failed");
            if let Err(audit_err) = state
                .audit()
                .log_user_admin_failed(&session.username, None, &e.to_string())
                .await
            {
                tracing::warn!(error = %audit_err, "failed to audit account failure");
            }
            (false, e.to_string())
        }
    };

    render_users_page(&state, &session, Some((banner.0, banner.1.as_str()))).await
}

/// Activity log (admin, GET).
pub async fn activity(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, ConsoleError> {
    require_admin(&session)?;

    let events = state
        .audit()
        .recent(100)
        .await
        .map_err(|e| ConsoleError::Internal(e.into()))?;

    Ok(Html(pages::activity_page(&session, &events)))
}

fn require_admin(session: &Session) -> Result<(), ConsoleError> {
    if session.is_admin() {
        Ok(())
    } else {
        Err(ConsoleError::NotAuthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_gate_rejects_plain_users() {
        let admin = Session {
            username: "root".into(),
            role: UserRole::Admin,
        };
        let user = Session {
            username: "reader".into(),
            role: UserRole::User,
        };
        assert!(require_admin(&admin).is_ok());
        assert!(matches!(
            require_admin(&user),
            Err(ConsoleError::NotAuthorized)
        ));
    }

    #[test]
    fn query_string_round_trips_reserved_characters() {
        let pairs = vec![
            ("f.region".to_string(), "eu west".to_string()),
            ("q.note".to_string(), "a&b=c".to_string()),
        ];
        assert_eq!(
            encode_query_string(&pairs),
            "f.region=eu%20west&q.note=a%26b%3Dc"
        );
    }
}
