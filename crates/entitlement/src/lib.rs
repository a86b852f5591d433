//! Entitlements: declarative security constraints for sandboxed execution.
//!
//! An [`Entitlement`] is a named, domain-classified constraint carrying an
//! opaque value and an enforcement step that maps one context snapshot to the
//! next. Equality between entitlements is defined by [`EntitlementKey`] and
//! never involves enforcement behavior.
//!
//! The crate also ships a small reference catalog acting on
//! [`SecurityContext`]:
//!
//! - [`NetworkEntitlement`]: network mode (`network` domain)
//! - [`FilesystemEntitlement`]: read-only, masked and mountable paths (`filesystem` domain)
//! - [`ProcessEntitlement`]: capabilities and privilege escalation (`process` domain)
//!
//! and a TOML [`Profile`] format listing entitlements to apply.

mod capability;
mod context;
mod custom;
mod entitlement;
mod error;
pub mod filesystem;
pub mod network;
pub mod process;
mod profile;

pub use capability::{Capability, DEFAULT_CAPABILITIES};
pub use context::{ContextId, ContextMetadata, NetworkMode, SecurityContext};
pub use custom::CustomEntitlement;
pub use entitlement::{Entitlement, EntitlementKey};
pub use error::{Error, Result};
pub use filesystem::{FilesystemEntitlement, FsRule};
pub use network::NetworkEntitlement;
pub use process::ProcessEntitlement;
pub use profile::{EntitlementSpec, Profile};
