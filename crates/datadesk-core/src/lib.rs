//! # datadesk-core
//!
//! Shared foundation for the DataDesk admin console:
//! - configuration types loaded from `datadesk.yaml`
//! - the columnar [`QueryResult`] model produced by the data layer
//! - result transforms: long-to-wide [`pivot`] and CSV [`export`]

pub mod config;
pub mod export;
pub mod pivot;
pub mod table;

pub use config::{
    AuditConfig, BootstrapConfig, ConfigError, ConsoleConfig, DataDeskConfig, UpstreamConfig,
};
pub use pivot::{pivot_result, PivotError};
pub use table::QueryResult;
