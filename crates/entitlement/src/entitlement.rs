//! The entitlement contract.

use crate::{Error, Result, SecurityContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A named, domain-classified security constraint.
///
/// Implementations are immutable once constructed. The accessors report
/// [`Error::Unset`](crate::Error::Unset) for missing fields; `enforce`
/// borrows the current context snapshot and returns the next one, leaving
/// the input untouched.
pub trait Entitlement<C = SecurityContext> {
    /// Name of the entitlement within its domain.
    fn identifier(&self) -> Result<&str>;

    /// Category tag, e.g. `network` or `filesystem`.
    fn domain(&self) -> Result<&str>;

    /// Opaque payload.
    fn value(&self) -> Result<&Value>;

    /// Apply the constraint to `context`, producing the updated context.
    fn enforce(&self, context: &C) -> Result<C>;
}

impl<C, E: Entitlement<C> + ?Sized> Entitlement<C> for Box<E> {
    fn identifier(&self) -> Result<&str> {
        (**self).identifier()
    }

    fn domain(&self) -> Result<&str> {
        (**self).domain()
    }

    fn value(&self) -> Result<&Value> {
        (**self).value()
    }

    fn enforce(&self, context: &C) -> Result<C> {
        (**self).enforce(context)
    }
}

/// Identity of an entitlement: its data, never its behavior.
///
/// Two entitlements with the same identifier, domain and value are the same
/// entitlement regardless of how they enforce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitlementKey {
    pub domain: String,
    pub identifier: String,
    pub value: Value,
}

impl EntitlementKey {
    pub fn new(domain: impl Into<String>, identifier: impl Into<String>, value: Value) -> Self {
        Self {
            domain: domain.into(),
            identifier: identifier.into(),
            value,
        }
    }
}

impl fmt::Display for EntitlementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}={}", self.domain, self.identifier, self.value)
    }
}

/// Read a payload that must be an array of strings.
pub(crate) fn string_list(identifier: &str, value: &Value) -> Result<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::invalid_value(identifier, "expected an array of strings"))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| Error::invalid_value(identifier, format!("{item} is not a string")))
        })
        .collect()
}
