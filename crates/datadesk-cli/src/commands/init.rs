//! Init command: write a starter configuration file.

use std::fs;
use std::path::PathBuf;

const TEMPLATE: &str = r#"# DataDesk configuration.

# Shown in page titles.
# project: My Project

upstream:
  host: localhost
  port: 5432
  database: postgres
  username: postgres
  # password: secret
  # Or point at an environment variable holding a full DATABASE_URL:
  # credentials_env: DATABASE_URL

console:
  listen_addr: 0.0.0.0
  listen_port: 8080
  hidden_tables:
    - users

audit:
  enabled: true
  directory: logs
  stdout: false

bootstrap:
  admin_username: admin
  # Prefer the DATADESK_ADMIN_PASSWORD environment variable.
  # admin_password: changeme
"#;

/// Write the starter configuration, refusing to overwrite without `--force`.
pub fn init(path: PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "'{}' already exists (use --force to overwrite)",
            path.display()
        );
    }

    fs::write(&path, TEMPLATE)?;
    tracing::info!(path = %path.display(), "wrote starter configuration");
    println!("Wrote {}", path.display());

    Ok(())
}
