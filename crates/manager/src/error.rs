use crate::InvalidEntitlement;
use entitlement::EntitlementKey;
use thiserror::Error;

/// Entitlements manager errors.
///
/// `position` is the zero-based index of the offending entitlement: within
/// the batch for [`add`](crate::EntitlementsManager::add), within the
/// recorded list for [`enforce`](crate::EntitlementsManager::enforce) and
/// [`replay`](crate::EntitlementsManager::replay).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid entitlement at position {position}: {source}")]
    InvalidEntitlement {
        position: usize,
        #[source]
        source: InvalidEntitlement,
    },

    #[error("failed to enforce {key} at position {position}: {source}")]
    Enforcement {
        position: usize,
        key: EntitlementKey,
        #[source]
        source: entitlement::Error,
    },

    /// The entitlement given to a membership query is itself invalid.
    #[error("couldn't validate invalid entitlement: {0}")]
    Validation(#[source] InvalidEntitlement),
}

pub type Result<T> = std::result::Result<T, Error>;
