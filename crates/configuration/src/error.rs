use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to load configuration from file: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed:{}", .0.iter().map(|m| format!("\n  - {m}")).collect::<String>())]
    ValidationFailure(Vec<String>),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}
