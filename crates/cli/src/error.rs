//! CLI error types.

use crate::config::ConfigError;
use thiserror::Error;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A `--value` argument could not be parsed, or output could not be encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to install the log subscriber.
    #[error("failed to initialize logging: {0}")]
    Logging(String),

    /// Configuration is invalid or unreadable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred while building entitlements from the profile.
    #[error(transparent)]
    Entitlement(#[from] entitlement::Error),

    /// An error occurred while applying entitlements.
    #[error(transparent)]
    Manager(#[from] manager::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
