//! Security context threaded through entitlement enforcement.

use crate::Capability;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// A unique identifier for a security context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(pub Uuid);

impl ContextId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Network namespace configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkMode {
    /// Loopback only.
    None,
    /// Private namespace with its own interfaces.
    Private,
    /// Share the host network namespace.
    Host,
}

impl NetworkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkMode::None => "none",
            NetworkMode::Private => "private",
            NetworkMode::Host => "host",
        }
    }
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Number of enforcement steps applied to this context.
    pub version: u32,
}

/// Accumulated security configuration for one sandboxed execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityContext {
    pub id: ContextId,

    /// Network mode, if an entitlement has chosen one.
    pub network: Option<NetworkMode>,

    /// Capabilities granted to the process.
    pub capabilities: BTreeSet<Capability>,

    /// Capabilities explicitly dropped; these may not be granted again.
    pub dropped_capabilities: BTreeSet<Capability>,

    pub no_new_privileges: bool,

    /// Paths mounted read-only.
    pub readonly_paths: BTreeSet<String>,

    /// Paths hidden from the process.
    pub masked_paths: BTreeSet<String>,

    /// Host paths allowed to be bind-mounted.
    pub mounts: BTreeSet<String>,

    pub metadata: ContextMetadata,
}

impl SecurityContext {
    /// Create a context holding the default container capability set.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: ContextId::new(),
            network: None,
            capabilities: Capability::defaults().collect(),
            dropped_capabilities: BTreeSet::new(),
            no_new_privileges: false,
            readonly_paths: BTreeSet::new(),
            masked_paths: BTreeSet::new(),
            mounts: BTreeSet::new(),
            metadata: ContextMetadata {
                created_at: now,
                updated_at: now,
                version: 0,
            },
        }
    }

    /// Remove a capability and remember that it was dropped.
    pub fn drop_capability(&mut self, cap: Capability) {
        self.capabilities.remove(&cap);
        self.dropped_capabilities.insert(cap);
    }

    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities.iter().any(|c| c.as_str() == name)
    }

    /// Record that one more enforcement step produced this context.
    pub fn touch(&mut self) {
        self.metadata.version += 1;
        self.metadata.updated_at = Utc::now();
    }
}

impl Default for SecurityContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_has_defaults() {
        let ctx = SecurityContext::new();
        assert!(ctx.has_capability("CAP_CHOWN"));
        assert!(ctx.has_capability("CAP_NET_RAW"));
        assert!(!ctx.has_capability("CAP_SYS_ADMIN"));
        assert_eq!(ctx.network, None);
        assert_eq!(ctx.metadata.version, 0);
    }

    #[test]
    fn test_drop_capability_is_remembered() {
        let mut ctx = SecurityContext::new();
        let cap = Capability::new("CAP_KILL").unwrap();
        ctx.drop_capability(cap.clone());
        assert!(!ctx.has_capability("CAP_KILL"));
        assert!(ctx.dropped_capabilities.contains(&cap));
    }

    #[test]
    fn test_touch_bumps_version() {
        let mut ctx = SecurityContext::new();
        ctx.touch();
        ctx.touch();
        assert_eq!(ctx.metadata.version, 2);
        assert!(ctx.metadata.updated_at >= ctx.metadata.created_at);
    }

    #[test]
    fn test_serializes_network_mode() {
        let mut ctx = SecurityContext::new();
        ctx.network = Some(NetworkMode::Private);
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["network"], "private");
    }
}
