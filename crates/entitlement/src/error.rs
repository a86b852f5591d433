//! Entitlement error types.

use thiserror::Error;

/// Entitlement errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A required entitlement field (identifier, domain or value) is not set.
    #[error("entitlement {0} is not set")]
    Unset(&'static str),

    /// The value payload does not have the shape the entitlement expects.
    #[error("invalid value for {identifier}: {reason}")]
    InvalidValue { identifier: String, reason: String },

    /// The entitlement cannot be legally applied to the context.
    #[error("enforcement rejected: {0}")]
    Rejected(String),

    /// No entitlement kind is known for this domain and identifier.
    #[error("unknown entitlement {domain}/{identifier}")]
    Unknown { domain: String, identifier: String },

    /// Failed to parse a profile file.
    #[error("failed to parse profile: {0}")]
    Parse(String),

    /// An I/O error occurred while reading a profile.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_value(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
