//! Error types.
//!
//! Validation problems are not errors: they come back as
//! [`Diagnostic`](crate::rules::Diagnostic) values. These types cover caller
//! mistakes (bad configuration, unreadable input) only.

use thiserror::Error;

use crate::parser::ParseError;
use crate::rules::Diagnostic;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "Unsupported SQL dialect: {0} (expected mysql, postgresql, sqlite, oracle or sqlserver)"
    )]
    UnsupportedDialect(String),

    #[error("Configuration error: {0}")]
    Load(#[from] config_crate::ConfigError),

    #[error("Cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Notation error: {0}")]
    Parse(#[from] ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model has {errors} validation error(s); refusing to generate SQL")]
    InvalidModel {
        errors: usize,
        diagnostics: Vec<Diagnostic>,
    },
}
