// packages/routing/src/utils/errors.rs
//! Error types for the routing layer

use thiserror::Error;

/// Errors produced while configuring or using the routing layer
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Namespace roots or endpoint templates are malformed, identical or
    /// overlapping. Raised only while building a configuration.
    #[error("Invalid routing configuration: {0}")]
    InvalidConfiguration(String),

    /// A URI matches neither namespace root, or a path cannot be
    /// re-composed unambiguously under a root.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Settings could not be loaded from files or the environment
    #[error("Failed to load settings: {0}")]
    Config(#[from] config::ConfigError),

    /// Context headers are missing or carry an unusable value
    #[error("Invalid context header: {0}")]
    Header(String),
}

impl RoutingError {
    /// True when the HTTP layer should answer with a not-found response
    pub fn is_not_found(&self) -> bool {
        matches!(self, RoutingError::ResourceNotFound(_))
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, RoutingError>;
