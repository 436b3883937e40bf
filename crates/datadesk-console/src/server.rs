//! Console server implementation.

use crate::error::ConsoleError;
use crate::routes;
use crate::state::AppState;
use tokio::net::TcpListener;

/// The console HTTP server.
pub struct ConsoleServer {
    state: AppState,
}

impl ConsoleServer {
    /// Create a new console server over prepared application state.
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Start the server and serve until shutdown.
    pub async fn run(self) -> Result<(), ConsoleError> {
        let console = &self.state.config().console;
        let addr = format!("{}:{}", console.listen_addr, console.listen_port);
        tracing::info!(address = %addr, "starting DataDesk console");

        let app = routes::create_router(self.state.clone());

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ConsoleError::StartupFailed(e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ConsoleError::StartupFailed(e.to_string()))?;

        Ok(())
    }
}
