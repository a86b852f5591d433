//! Process entitlements.

use crate::entitlement::string_list;
use crate::{Capability, Entitlement, Error, Result, SecurityContext};
use serde_json::Value;

pub const DOMAIN: &str = "process";

const ADD_CAPABILITIES: &str = "add-capabilities";
const DROP_CAPABILITIES: &str = "drop-capabilities";
const NO_NEW_PRIVILEGES: &str = "no-new-privileges";

#[derive(Debug, Clone, PartialEq)]
enum ProcessRule {
    Add(Vec<Capability>),
    Drop(Vec<Capability>),
    NoNewPrivileges(bool),
}

/// Constrains the capabilities and privilege escalation of the sandboxed process.
///
/// Like dropped capabilities, `no-new-privileges` is sticky: once set, an
/// entitlement clearing it is rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessEntitlement {
    rule: ProcessRule,
    value: Value,
}

fn capability_list(identifier: &str, value: &Value) -> Result<Vec<Capability>> {
    string_list(identifier, value)?
        .into_iter()
        .map(|name| {
            Capability::new(name).map_err(|e| Error::invalid_value(identifier, e.to_string()))
        })
        .collect()
}

fn capability_value(caps: &[Capability]) -> Value {
    Value::Array(
        caps.iter()
            .map(|c| Value::String(c.as_str().to_string()))
            .collect(),
    )
}

impl ProcessEntitlement {
    /// Grant capabilities. Granting one that was dropped earlier is rejected.
    pub fn add_capabilities(caps: impl IntoIterator<Item = Capability>) -> Self {
        let caps: Vec<_> = caps.into_iter().collect();
        Self {
            value: capability_value(&caps),
            rule: ProcessRule::Add(caps),
        }
    }

    pub fn drop_capabilities(caps: impl IntoIterator<Item = Capability>) -> Self {
        let caps: Vec<_> = caps.into_iter().collect();
        Self {
            value: capability_value(&caps),
            rule: ProcessRule::Drop(caps),
        }
    }

    pub fn no_new_privileges(enabled: bool) -> Self {
        Self {
            rule: ProcessRule::NoNewPrivileges(enabled),
            value: Value::Bool(enabled),
        }
    }

    /// Build from profile data.
    pub fn from_parts(identifier: &str, value: &Value) -> Result<Self> {
        match identifier {
            ADD_CAPABILITIES => Ok(Self::add_capabilities(capability_list(identifier, value)?)),
            DROP_CAPABILITIES => Ok(Self::drop_capabilities(capability_list(identifier, value)?)),
            NO_NEW_PRIVILEGES => value
                .as_bool()
                .map(Self::no_new_privileges)
                .ok_or_else(|| Error::invalid_value(identifier, "expected a boolean")),
            _ => Err(Error::Unknown {
                domain: DOMAIN.to_string(),
                identifier: identifier.to_string(),
            }),
        }
    }
}

impl Entitlement for ProcessEntitlement {
    fn identifier(&self) -> Result<&str> {
        Ok(match self.rule {
            ProcessRule::Add(_) => ADD_CAPABILITIES,
            ProcessRule::Drop(_) => DROP_CAPABILITIES,
            ProcessRule::NoNewPrivileges(_) => NO_NEW_PRIVILEGES,
        })
    }

    fn domain(&self) -> Result<&str> {
        Ok(DOMAIN)
    }

    fn value(&self) -> Result<&Value> {
        Ok(&self.value)
    }

    fn enforce(&self, context: &SecurityContext) -> Result<SecurityContext> {
        let mut next = context.clone();

        match &self.rule {
            ProcessRule::Add(caps) => {
                for cap in caps {
                    if next.dropped_capabilities.contains(cap) {
                        return Err(Error::Rejected(format!("{cap} was dropped")));
                    }
                    next.capabilities.insert(cap.clone());
                }
            }
            ProcessRule::Drop(caps) => {
                for cap in caps {
                    next.drop_capability(cap.clone());
                }
            }
            ProcessRule::NoNewPrivileges(enabled) => {
                if next.no_new_privileges && !*enabled {
                    return Err(Error::Rejected(
                        "no-new-privileges is already set and cannot be cleared".to_string(),
                    ));
                }
                next.no_new_privileges = *enabled;
            }
        }

        next.touch();
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cap(name: &str) -> Capability {
        Capability::new(name).unwrap()
    }

    #[test]
    fn test_add_capabilities() {
        let ent = ProcessEntitlement::add_capabilities([cap("CAP_SYS_PTRACE")]);
        let next = ent.enforce(&SecurityContext::new()).unwrap();
        assert!(next.has_capability("CAP_SYS_PTRACE"));
        assert_eq!(ent.value().unwrap(), &json!(["CAP_SYS_PTRACE"]));
    }

    #[test]
    fn test_adding_dropped_capability_rejected() {
        let ctx = ProcessEntitlement::drop_capabilities([cap("CAP_MKNOD")])
            .enforce(&SecurityContext::new())
            .unwrap();
        assert!(!ctx.has_capability("CAP_MKNOD"));

        let err = ProcessEntitlement::add_capabilities([cap("CAP_MKNOD")])
            .enforce(&ctx)
            .unwrap_err();
        assert!(matches!(err, Error::Rejected(_)));
    }

    #[test]
    fn test_no_new_privileges() {
        let ent = ProcessEntitlement::no_new_privileges(true);
        assert_eq!(ent.identifier().unwrap(), "no-new-privileges");
        let next = ent.enforce(&SecurityContext::new()).unwrap();
        assert!(next.no_new_privileges);
    }

    #[test]
    fn test_no_new_privileges_cannot_be_cleared() {
        let ctx = ProcessEntitlement::no_new_privileges(true)
            .enforce(&SecurityContext::new())
            .unwrap();

        let err = ProcessEntitlement::no_new_privileges(false)
            .enforce(&ctx)
            .unwrap_err();
        assert!(matches!(err, Error::Rejected(_)));

        // Re-applying the same setting is fine
        let again = ProcessEntitlement::no_new_privileges(true).enforce(&ctx).unwrap();
        assert!(again.no_new_privileges);

        // Clearing an unset flag is a no-op
        let unset = ProcessEntitlement::no_new_privileges(false)
            .enforce(&SecurityContext::new())
            .unwrap();
        assert!(!unset.no_new_privileges);
    }

    #[test]
    fn test_from_parts() {
        let ent = ProcessEntitlement::from_parts("drop-capabilities", &json!(["CAP_KILL"])).unwrap();
        assert_eq!(ent.identifier().unwrap(), "drop-capabilities");

        assert!(matches!(
            ProcessEntitlement::from_parts("drop-capabilities", &json!(["kill"])),
            Err(Error::InvalidValue { .. })
        ));
        assert!(matches!(
            ProcessEntitlement::from_parts("no-new-privileges", &json!("yes")),
            Err(Error::InvalidValue { .. })
        ));
        assert!(matches!(
            ProcessEntitlement::from_parts("seccomp", &json!({})),
            Err(Error::Unknown { .. })
        ));
    }
}
