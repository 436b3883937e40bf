//! Web console configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the HTTP console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Address to listen on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Port to listen on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Tables that never appear in the data browser.
    /// The `users` table is hidden by default; account management has its
    /// own page.
    #[serde(default = "default_hidden_tables")]
    pub hidden_tables: Vec<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            listen_port: default_listen_port(),
            hidden_tables: default_hidden_tables(),
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    8080
}

fn default_hidden_tables() -> Vec<String> {
    vec!["users".to_string()]
}
