use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const NET_ADMIN: &str = "CAP_NET_ADMIN";
pub const NET_RAW: &str = "CAP_NET_RAW";

/// Capabilities a container process holds unless an entitlement says otherwise.
pub const DEFAULT_CAPABILITIES: &[&str] = &[
    "CAP_AUDIT_WRITE",
    "CAP_CHOWN",
    "CAP_DAC_OVERRIDE",
    "CAP_FOWNER",
    "CAP_FSETID",
    "CAP_KILL",
    "CAP_MKNOD",
    "CAP_NET_BIND_SERVICE",
    NET_RAW,
    "CAP_SETFCAP",
    "CAP_SETGID",
    "CAP_SETPCAP",
    "CAP_SETUID",
    "CAP_SYS_CHROOT",
];

/// A Linux process capability name, e.g. `CAP_NET_ADMIN`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Capability(String);

impl Capability {
    /// Parse a capability name.
    ///
    /// Names must be `CAP_` followed by uppercase ASCII letters, digits or `_`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let valid = name
            .strip_prefix("CAP_")
            .is_some_and(|rest| {
                !rest.is_empty()
                    && rest
                        .chars()
                        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
            });

        if valid {
            Ok(Self(name))
        } else {
            Err(Error::invalid_value(
                "capability",
                format!("'{name}' is not a capability name"),
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The default container capability set.
    pub fn defaults() -> impl Iterator<Item = Capability> {
        DEFAULT_CAPABILITIES
            .iter()
            .map(|name| Capability((*name).to_string()))
    }
}

impl TryFrom<String> for Capability {
    type Error = Error;

    fn try_from(name: String) -> Result<Self> {
        Self::new(name)
    }
}

impl From<Capability> for String {
    fn from(cap: Capability) -> Self {
        cap.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(Capability::new("CAP_NET_ADMIN").is_ok());
        assert!(Capability::new("CAP_SYS_PTRACE").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert!(Capability::new("NET_ADMIN").is_err());
        assert!(Capability::new("CAP_").is_err());
        assert!(Capability::new("cap_net_admin").is_err());
        assert!(Capability::new("CAP_NET ADMIN").is_err());
    }

    #[test]
    fn test_defaults_are_valid() {
        for cap in Capability::defaults() {
            assert!(Capability::new(cap.as_str()).is_ok(), "{cap}");
        }
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        let ok: std::result::Result<Capability, _> = serde_json::from_str("\"CAP_KILL\"");
        assert!(ok.is_ok());
        let bad: std::result::Result<Capability, _> = serde_json::from_str("\"kill\"");
        assert!(bad.is_err());
    }
}
