//! Structural validation of entitlements.

use entitlement::{Entitlement, EntitlementKey};
use std::fmt;
use thiserror::Error;

/// The accessor that failed during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    Identifier,
    Domain,
    Value,
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Accessor::Identifier => "identifier",
            Accessor::Domain => "domain",
            Accessor::Value => "value",
        })
    }
}

/// An entitlement could not be queried for its identity.
#[derive(Debug, Error)]
#[error("{accessor} failed: {source}")]
pub struct InvalidEntitlement {
    pub accessor: Accessor,
    #[source]
    pub source: entitlement::Error,
}

fn failed(accessor: Accessor) -> impl FnOnce(entitlement::Error) -> InvalidEntitlement {
    move |source| InvalidEntitlement { accessor, source }
}

/// Check that an entitlement is well-formed and return its identity.
///
/// Queries identifier, domain and value in that order and stops at the first
/// failure. Value contents are not inspected.
pub fn validate<C, E>(entitlement: &E) -> Result<EntitlementKey, InvalidEntitlement>
where
    E: Entitlement<C> + ?Sized,
{
    let identifier = entitlement
        .identifier()
        .map_err(failed(Accessor::Identifier))?;
    let domain = entitlement.domain().map_err(failed(Accessor::Domain))?;
    let value = entitlement.value().map_err(failed(Accessor::Value))?;

    Ok(EntitlementKey::new(domain, identifier, value.clone()))
}

/// Whether [`validate`] succeeds.
pub fn is_valid<C, E>(entitlement: &E) -> bool
where
    E: Entitlement<C> + ?Sized,
{
    validate::<C, E>(entitlement).is_ok()
}
