//! Network entitlements.

use crate::capability::{NET_ADMIN, NET_RAW};
use crate::{Capability, Entitlement, Error, NetworkMode, Result, SecurityContext};
use serde_json::Value;

pub const DOMAIN: &str = "network";

/// Selects the network mode of the sandbox.
///
/// `none` also drops `CAP_NET_RAW` and `CAP_NET_ADMIN`; `private` drops
/// `CAP_NET_ADMIN`. Choosing a mode different from one already set is rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkEntitlement {
    mode: NetworkMode,
    value: Value,
}

impl NetworkEntitlement {
    pub const MODE: &'static str = "mode";

    pub fn new(mode: NetworkMode) -> Self {
        Self {
            mode,
            value: Value::String(mode.as_str().to_string()),
        }
    }

    pub fn none() -> Self {
        Self::new(NetworkMode::None)
    }

    pub fn private() -> Self {
        Self::new(NetworkMode::Private)
    }

    pub fn host() -> Self {
        Self::new(NetworkMode::Host)
    }

    /// Build from profile data.
    pub fn from_parts(identifier: &str, value: &Value) -> Result<Self> {
        if identifier != Self::MODE {
            return Err(Error::Unknown {
                domain: DOMAIN.to_string(),
                identifier: identifier.to_string(),
            });
        }

        let mode = match value.as_str() {
            Some("none") => NetworkMode::None,
            Some("private") => NetworkMode::Private,
            Some("host") => NetworkMode::Host,
            _ => {
                return Err(Error::invalid_value(
                    identifier,
                    format!("expected \"none\", \"private\" or \"host\", got {value}"),
                ));
            }
        };
        Ok(Self::new(mode))
    }

    pub fn mode(&self) -> NetworkMode {
        self.mode
    }
}

impl Entitlement for NetworkEntitlement {
    fn identifier(&self) -> Result<&str> {
        Ok(Self::MODE)
    }

    fn domain(&self) -> Result<&str> {
        Ok(DOMAIN)
    }

    fn value(&self) -> Result<&Value> {
        Ok(&self.value)
    }

    fn enforce(&self, context: &SecurityContext) -> Result<SecurityContext> {
        if let Some(current) = context.network {
            if current != self.mode {
                return Err(Error::Rejected(format!(
                    "network mode already set to {current}, cannot switch to {}",
                    self.mode
                )));
            }
        }

        let mut next = context.clone();
        next.network = Some(self.mode);

        let dropped: &[&str] = match self.mode {
            NetworkMode::None => &[NET_RAW, NET_ADMIN],
            NetworkMode::Private => &[NET_ADMIN],
            NetworkMode::Host => &[],
        };
        for name in dropped {
            next.drop_capability(Capability::new(*name)?);
        }

        next.touch();
        Ok(next)
    }
}
