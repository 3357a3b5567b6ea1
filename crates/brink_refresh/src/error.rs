//! Refresh error types

use brink_core::Edge;
use thiserror::Error;

use crate::state::EdgeState;

/// Errors raised inside edge controllers
///
/// The public container API treats all of these as no-ops: they are logged
/// at debug level and never surface to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RefreshError {
    /// The controller has no live container
    #[error("{0} edge controller is not attached to a container")]
    ContainerDetached(Edge),

    /// The requested state change is not allowed
    #[error("invalid {edge} edge transition {from:?} -> {to:?}")]
    InvalidTransition {
        edge: Edge,
        from: EdgeState,
        to: EdgeState,
    },

    /// The controller is already borrowed by an outer call
    #[error("{0} edge controller is busy")]
    Busy(Edge),
}

/// Result type for controller operations
pub type Result<T> = std::result::Result<T, RefreshError>;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse refresh config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize refresh config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid refresh config: {0}")]
    Invalid(String),
}
