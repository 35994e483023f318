//! Error types for the survey analysis core

use thiserror::Error;

/// Errors raised by the analysis core. File handling uses `anyhow` instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurveyError {
    /// One or more selected columns do not exist in the dataset.
    #[error("unknown column(s) {}; available columns: {}", missing.join(", "), available.join(", "))]
    UnknownColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },

    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
