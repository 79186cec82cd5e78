//! Configuration
//!
//! Settings are read from CLI flags with environment fallbacks; a `.env` file is loaded first
//! when present.

use thiserror::Error;

pub mod db;
pub mod observability;
pub mod store;

pub use db::DatabaseConfig;
pub use observability::{LogFormat, LoggingConfig};
pub use store::StoreConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    #[error("{name} must be a non-negative amount, got {value}")]
    InvalidAmount { name: &'static str, value: String },
}
