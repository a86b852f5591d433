//! Entitlement profiles loaded from TOML.

use crate::{
    Entitlement, Error, FilesystemEntitlement, NetworkEntitlement, ProcessEntitlement,
    Result, filesystem, network, process,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::Path;

/// An ordered list of entitlements to apply to a security context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    /// Entries in application order.
    #[serde(default, rename = "entitlement")]
    pub entitlements: Vec<EntitlementSpec>,
}

/// One profile entry, as written in TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitlementSpec {
    pub domain: String,
    pub identifier: String,
    #[serde(default)]
    pub value: Value,
}

impl EntitlementSpec {
    pub fn new(domain: impl Into<String>, identifier: impl Into<String>, value: Value) -> Self {
        Self {
            domain: domain.into(),
            identifier: identifier.into(),
            value,
        }
    }

    /// Resolve the entry to a catalog entitlement.
    pub fn build(&self) -> Result<Box<dyn Entitlement>> {
        let ent: Box<dyn Entitlement> = match self.domain.as_str() {
            network::DOMAIN => Box::new(NetworkEntitlement::from_parts(&self.identifier, &self.value)?),
            filesystem::DOMAIN => {
                Box::new(FilesystemEntitlement::from_parts(&self.identifier, &self.value)?)
            }
            process::DOMAIN => Box::new(ProcessEntitlement::from_parts(&self.identifier, &self.value)?),
            _ => {
                return Err(Error::Unknown {
                    domain: self.domain.clone(),
                    identifier: self.identifier.clone(),
                });
            }
        };
        Ok(ent)
    }
}

impl Profile {
    /// Load a profile from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse a profile from a TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| Error::Parse(e.to_string()))
    }

    /// A locked-down default: no network, no privilege escalation,
    /// kernel interfaces hidden or read-only.
    pub fn restrictive() -> Self {
        Self {
            entitlements: vec![
                EntitlementSpec::new(network::DOMAIN, NetworkEntitlement::MODE, json!("none")),
                EntitlementSpec::new(process::DOMAIN, "no-new-privileges", json!(true)),
                EntitlementSpec::new(
                    process::DOMAIN,
                    "drop-capabilities",
                    json!(["CAP_MKNOD", "CAP_SETFCAP"]),
                ),
                EntitlementSpec::new(
                    filesystem::DOMAIN,
                    "masked",
                    json!(["/proc/kcore", "/proc/keys", "/sys/firmware"]),
                ),
                EntitlementSpec::new(filesystem::DOMAIN, "readonly", json!(["/proc/sys", "/sys"])),
            ],
        }
    }

    /// Resolve every entry, in order. Fails on the first unknown or malformed entry.
    pub fn build(&self) -> Result<Vec<Box<dyn Entitlement>>> {
        self.entitlements.iter().map(EntitlementSpec::build).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::NET_ADMIN;
    use crate::{Capability, NetworkMode, SecurityContext};

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[[entitlement]]
domain = "network"
identifier = "mode"
value = "private"

[[entitlement]]
domain = "filesystem"
identifier = "mount"
value = ["/data", "/tmp"]

[[entitlement]]
domain = "process"
identifier = "no-new-privileges"
value = true
"#;
        let profile = Profile::parse(toml).unwrap();
        assert_eq!(profile.entitlements.len(), 3);
        assert_eq!(
            profile.entitlements[1],
            EntitlementSpec::new("filesystem", "mount", json!(["/data", "/tmp"]))
        );

        let ents = profile.build().unwrap();
        assert_eq!(ents[0].domain().unwrap(), "network");
        assert_eq!(ents[2].identifier().unwrap(), "no-new-privileges");
    }

    #[test]
    fn test_empty_profile() {
        let profile = Profile::parse("").unwrap();
        assert!(profile.entitlements.is_empty());
        assert!(profile.build().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_domain() {
        let profile = Profile {
            entitlements: vec![EntitlementSpec::new("debug", "ptrace", json!(true))],
        };
        assert!(matches!(profile.build(), Err(Error::Unknown { .. })));
    }

    #[test]
    fn test_missing_value_is_invalid() {
        let toml = r#"
[[entitlement]]
domain = "network"
identifier = "mode"
"#;
        let profile = Profile::parse(toml).unwrap();
        assert_eq!(profile.entitlements[0].value, Value::Null);
        assert!(matches!(profile.build(), Err(Error::InvalidValue { .. })));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(Profile::parse("[[entitlement]"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_restrictive_applies_cleanly() {
        let mut ctx = SecurityContext::new();
        for ent in Profile::restrictive().build().unwrap() {
            ctx = ent.enforce(&ctx).unwrap();
        }

        assert_eq!(ctx.network, Some(NetworkMode::None));
        assert!(ctx.no_new_privileges);
        assert!(!ctx.has_capability(NET_ADMIN));
        assert!(ctx.dropped_capabilities.contains(&Capability::new("CAP_MKNOD").unwrap()));
        assert!(ctx.masked_paths.contains("/proc/kcore"));
        assert_eq!(ctx.metadata.version, 5);
    }
}
