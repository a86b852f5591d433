//! Closure-backed entitlements.

use crate::{Entitlement, Error, Result, SecurityContext};
use serde_json::Value;
use std::fmt;

type EnforceFn<C> = Box<dyn Fn(&C) -> Result<C>>;

/// An entitlement whose enforcement is an arbitrary closure.
///
/// Identifier, domain and value start out unset; an unset field makes the
/// matching accessor fail, which the manager treats as an invalid entitlement.
pub struct CustomEntitlement<C = SecurityContext> {
    identifier: Option<String>,
    domain: Option<String>,
    value: Option<Value>,
    enforce: EnforceFn<C>,
}

impl<C> CustomEntitlement<C> {
    pub fn new(enforce: impl Fn(&C) -> Result<C> + 'static) -> Self {
        Self {
            identifier: None,
            domain: None,
            value: None,
            enforce: Box::new(enforce),
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl<C: Clone> CustomEntitlement<C> {
    /// An entitlement that returns the context unchanged.
    ///
    /// Handy for membership queries, where only the data matters.
    pub fn passthrough() -> Self {
        Self::new(|ctx: &C| Ok(ctx.clone()))
    }
}

impl<C> Entitlement<C> for CustomEntitlement<C> {
    fn identifier(&self) -> Result<&str> {
        self.identifier.as_deref().ok_or(Error::Unset("identifier"))
    }

    fn domain(&self) -> Result<&str> {
        self.domain.as_deref().ok_or(Error::Unset("domain"))
    }

    fn value(&self) -> Result<&Value> {
        self.value.as_ref().ok_or(Error::Unset("value"))
    }

    fn enforce(&self, context: &C) -> Result<C> {
        (self.enforce)(context)
    }
}

impl<C> fmt::Debug for CustomEntitlement<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomEntitlement")
            .field("identifier", &self.identifier)
            .field("domain", &self.domain)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unset_fields_fail() {
        let ent = CustomEntitlement::<u32>::new(|n| Ok(n + 1));
        assert!(matches!(ent.identifier(), Err(Error::Unset("identifier"))));
        assert!(matches!(ent.domain(), Err(Error::Unset("domain"))));
        assert!(matches!(ent.value(), Err(Error::Unset("value"))));
    }

    #[test]
    fn test_accessors_and_enforce() {
        let ent = CustomEntitlement::<u32>::new(|n| Ok(n * 2))
            .with_identifier("double")
            .with_domain("math")
            .with_value(json!(2));

        assert_eq!(ent.identifier().unwrap(), "double");
        assert_eq!(ent.domain().unwrap(), "math");
        assert_eq!(ent.value().unwrap(), &json!(2));
        assert_eq!(ent.enforce(&21).unwrap(), 42);
    }

    #[test]
    fn test_passthrough_keeps_context() {
        let ent = CustomEntitlement::<String>::passthrough();
        assert_eq!(ent.enforce(&"ctx".to_string()).unwrap(), "ctx");
    }

    #[test]
    fn test_debug_omits_closure() {
        let ent = CustomEntitlement::<u32>::passthrough().with_identifier("noop");
        let debug = format!("{ent:?}");
        assert!(debug.contains("noop"));
        assert!(debug.contains(".."));
    }
}
