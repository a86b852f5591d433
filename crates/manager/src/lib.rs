//! Entitlements manager: validation, accumulation and enforcement.
//!
//! The [`EntitlementsManager`] owns a security context and an ordered list of
//! entitlements. Adding an entitlement validates it, enforces it against the
//! current context, and records it; the context is threaded through every
//! enforcement step in order.
//!
//! # Overview
//!
//! - [`validate`] checks that an entitlement exposes an identifier, a domain
//!   and a value, and returns its [`EntitlementKey`](entitlement::EntitlementKey).
//! - [`EntitlementsManager::add`] validates, enforces and records, stopping at
//!   the first failure. Earlier entitlements of the same batch stay applied.
//! - [`EntitlementsManager::enforce`] re-applies every recorded entitlement on
//!   top of the current context; [`EntitlementsManager::replay`] re-applies
//!   them on top of a fresh base context instead.
//! - [`EntitlementsManager::has_entitlement`] answers membership by identity,
//!   ignoring enforcement behavior.
//!
//! # Example
//!
//! ```
//! use entitlement::{NetworkEntitlement, ProcessEntitlement, SecurityContext};
//! use manager::EntitlementsManager;
//!
//! let mut manager = EntitlementsManager::new(SecurityContext::new());
//! manager.add_entitlement(NetworkEntitlement::none())?;
//! manager.add_entitlement(ProcessEntitlement::no_new_privileges(true))?;
//!
//! assert!(manager.has_entitlement(&NetworkEntitlement::none())?);
//! assert!(manager.context().no_new_privileges);
//! # Ok::<(), manager::Error>(())
//! ```

mod error;
mod manager;
mod validation;

pub use error::{Error, Result};
pub use manager::EntitlementsManager;
pub use validation::{Accessor, InvalidEntitlement, is_valid, validate};
