//! Route definitions for the console.

use crate::state::AppState;
use crate::{auth, handlers};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the console router.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/", get(handlers::home))
        .route("/logout", get(auth::logout))
        .route("/tables/{table}", get(handlers::browse))
        .route("/tables/{table}/export.csv", get(handlers::export_csv))
        .route(
            "/tables/{table}/insert",
            get(handlers::insert_form).post(handlers::insert_submit),
        )
        .route(
            "/users",
            get(handlers::users_page).post(handlers::users_create),
        )
        .route("/users/{id}/delete", post(handlers::users_delete))
        .route("/activity", get(handlers::activity))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/healthz", get(handlers::healthz))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
