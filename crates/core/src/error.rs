//! Error types for the datasift domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Two failure kinds exist: malformed data handed to a component, and
//! inconsistent caller configuration. Running over budget or selecting
//! fewer rows than requested are reported as data, never as errors.

use thiserror::Error;

/// The top-level error type for all datasift operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Data shape errors ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for an [`Error::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Shorthand for an [`Error::Config`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error came from caller-supplied configuration.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Whether this error came from a malformed table or schema.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;
