//! First-run admin account bootstrap.

use serde::{Deserialize, Serialize};

/// Environment variable that overrides the configured bootstrap password.
pub const ADMIN_PASSWORD_ENV: &str = "DATADESK_ADMIN_PASSWORD";

/// Settings for creating the initial admin account when the user table is
/// empty at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Username of the bootstrap admin.
    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    /// Password of the bootstrap admin. For security: prefer setting env var
    /// `DATADESK_ADMIN_PASSWORD`.
    #[serde(default)]
    pub admin_password: Option<String>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_username: default_admin_username(),
            admin_password: None,
        }
    }
}

impl BootstrapConfig {
    /// Resolve the bootstrap password: env var first, then config.
    pub fn resolve_password(&self) -> Option<String> {
        std::env::var(ADMIN_PASSWORD_ENV)
            .ok()
            .or_else(|| self.admin_password.clone())
            .filter(|p| !p.trim().is_empty())
    }
}

fn default_admin_username() -> String {
    "admin".to_string()
}
