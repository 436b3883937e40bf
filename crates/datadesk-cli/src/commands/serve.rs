//! Serve command: start the DataDesk console.

use anyhow::Context;
use datadesk_audit::AuditLogger;
use datadesk_console::{AppState, ConsoleServer};
use datadesk_core::DataDeskConfig;
use datadesk_pg::{connect_pool, UserStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Load configuration, prepare the database, and run the console.
///
/// A missing or unparsable configuration file is fatal: we bail with an
/// operator-facing error before binding any socket.
pub async fn serve(config_path: PathBuf) -> anyhow::Result<()> {
    let config = DataDeskConfig::from_file(&config_path)
        .with_context(|| format!("cannot start without '{}'", config_path.display()))?;

    tracing::info!(config = %config_path.display(), "configuration loaded");

    let pool = connect_pool(&config.upstream)
        .await
        .context("upstream database is unreachable")?;

    let users = UserStore::new(pool.clone());
    users.ensure_schema().await?;

    let bootstrap_password = config.bootstrap.resolve_password();
    if users
        .bootstrap_admin(
            &config.bootstrap.admin_username,
            bootstrap_password.as_deref(),
        )
        .await?
    {
        tracing::info!(username = %config.bootstrap.admin_username, "admin account bootstrapped");
    }

    let audit = AuditLogger::new(config.audit.clone())?;

    tracing::info!(
        listen_port = config.console.listen_port,
        upstream_host = %config.upstream.host,
        audit_enabled = audit.is_enabled(),
        "starting DataDesk"
    );

    let state = AppState::new(config, pool, Arc::new(audit));
    ConsoleServer::new(state).run().await?;

    Ok(())
}
