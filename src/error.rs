//! Error types for MargaNav

use thiserror::Error;

/// MargaNav error type
#[derive(Error, Debug)]
pub enum MargaError {
    /// Malformed request, rejected before any planning begins
    #[error("Invalid input: {0}")]
    Input(String),

    /// No feasible path exists under the current obstacle layout
    #[error("No feasible plan: {0}")]
    NoPath(String),

    /// The overall planning deadline elapsed mid-search
    #[error("Planning timed out after {0} ms")]
    Timeout(u64),

    /// The per-leg expansion budget ran out before the search concluded.
    /// Unlike [`MargaError::NoPath`] this proves nothing about
    /// feasibility.
    #[error("Expansion budget exhausted after {0} nodes")]
    BudgetExhausted(usize),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for MargaError {
    fn from(e: toml::de::Error) -> Self {
        MargaError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for MargaError {
    fn from(e: serde_json::Error) -> Self {
        MargaError::Input(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MargaError>;
