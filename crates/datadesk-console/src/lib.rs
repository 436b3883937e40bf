//! # datadesk-console
//!
//! The DataDesk web console: an axum application serving the login flow,
//! the table browser with dynamic filters, CSV export, the row-insert form,
//! account administration, and the activity log. Session state lives in
//! memory and every handler receives the explicit [`AppState`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod params;
pub mod routes;
pub mod server;
pub mod session;
pub mod state;
pub mod templates;

pub use error::ConsoleError;
pub use server::ConsoleServer;
pub use state::AppState;
