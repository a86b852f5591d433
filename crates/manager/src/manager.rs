//! Ordered accumulation and enforcement of entitlements.

use crate::{Error, Result, validate};
use entitlement::{Entitlement, EntitlementKey, SecurityContext};
use std::fmt;
use tracing::{debug, warn};

/// A recorded entitlement together with the identity it had when validated.
struct Recorded<C> {
    key: EntitlementKey,
    entitlement: Box<dyn Entitlement<C>>,
}

/// Accumulates entitlements and threads a context through their enforcement.
///
/// The manager owns the current context snapshot. Every enforcement step
/// borrows the snapshot and, on success, replaces it with the returned one;
/// a failed step never changes it. Mutating operations take `&mut self`, so
/// sharing a manager across threads requires wrapping it in a lock.
pub struct EntitlementsManager<C = SecurityContext> {
    context: C,
    entitlements: Vec<Recorded<C>>,
}

/// Run one enforcement step against `context`.
fn enforce_step<C>(
    context: &C,
    position: usize,
    key: &EntitlementKey,
    entitlement: &dyn Entitlement<C>,
) -> Result<C> {
    match entitlement.enforce(context) {
        Ok(next) => {
            debug!(position, %key, "entitlement enforced");
            Ok(next)
        }
        Err(source) => {
            warn!(position, %key, error = %source, "entitlement enforcement failed");
            Err(Error::Enforcement {
                position,
                key: key.clone(),
                source,
            })
        }
    }
}

fn validate_at<C>(position: usize, entitlement: &dyn Entitlement<C>) -> Result<EntitlementKey> {
    validate::<C, _>(entitlement).map_err(|source| {
        warn!(position, error = %source, "invalid entitlement");
        Error::InvalidEntitlement { position, source }
    })
}

impl<C> EntitlementsManager<C> {
    /// Create a manager starting from `context`.
    pub fn new(context: C) -> Self {
        Self {
            context,
            entitlements: Vec::new(),
        }
    }

    /// Validate, enforce and record each entitlement, in order.
    ///
    /// Processing stops at the first entitlement that is invalid or fails to
    /// enforce; that entitlement is not recorded and the context keeps the
    /// value it had before it. Entitlements earlier in the same batch stay
    /// recorded and enforced: a failed batch is partially applied, and the
    /// error's `position` says how far it got.
    pub fn add<I>(&mut self, entitlements: I) -> Result<()>
    where
        I: IntoIterator<Item = Box<dyn Entitlement<C>>>,
    {
        for (position, entitlement) in entitlements.into_iter().enumerate() {
            let key = validate_at(position, entitlement.as_ref())?;
            self.context = enforce_step(&self.context, position, &key, entitlement.as_ref())?;
            self.entitlements.push(Recorded { key, entitlement });
        }
        Ok(())
    }

    /// Add a single entitlement. See [`add`](Self::add).
    pub fn add_entitlement<E>(&mut self, entitlement: E) -> Result<()>
    where
        E: Entitlement<C> + 'static,
    {
        let boxed: Box<dyn Entitlement<C>> = Box::new(entitlement);
        self.add([boxed])
    }

    /// Enforce every recorded entitlement again, in order, on top of the
    /// current context.
    ///
    /// This continues from the current context; it does not reset it. Since
    /// [`add`](Self::add) already enforced each entitlement once, every
    /// entitlement ends up applied twice unless its enforcement is idempotent.
    /// Use [`replay`](Self::replay) to start over from a base context.
    ///
    /// Each entitlement is validated again first. On failure, iteration
    /// stops and the context keeps whatever progress was made.
    pub fn enforce(&mut self) -> Result<()> {
        for (position, recorded) in self.entitlements.iter().enumerate() {
            let entitlement = recorded.entitlement.as_ref();
            let key = validate_at(position, entitlement)?;
            self.context = enforce_step(&self.context, position, &key, entitlement)?;
        }
        debug!(count = self.entitlements.len(), "enforced recorded entitlements");
        Ok(())
    }

    /// Reset the context to `base`, then enforce every recorded entitlement
    /// once, in order.
    ///
    /// Failure semantics match [`enforce`](Self::enforce): no rollback.
    pub fn replay(&mut self, base: C) -> Result<()> {
        self.context = base;
        self.enforce()
    }

    /// Whether an entitlement with the same identifier, domain and value has
    /// been recorded. Enforcement behavior is not compared.
    ///
    /// An invalid query is an [`Error::Validation`], never `Ok(false)`.
    pub fn has_entitlement<E>(&self, entitlement: &E) -> Result<bool>
    where
        E: Entitlement<C> + ?Sized,
    {
        let key = validate::<C, E>(entitlement).map_err(Error::Validation)?;
        Ok(self.entitlements.iter().any(|recorded| recorded.key == key))
    }

    /// The current context snapshot.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Consume the manager and return the final context.
    pub fn into_context(self) -> C {
        self.context
    }

    /// Recorded entitlements, in the order they were added.
    pub fn entitlements(&self) -> impl Iterator<Item = &dyn Entitlement<C>> {
        self.entitlements.iter().map(|r| r.entitlement.as_ref())
    }

    /// Identities of the recorded entitlements, in order.
    pub fn keys(&self) -> impl Iterator<Item = &EntitlementKey> {
        self.entitlements.iter().map(|r| &r.key)
    }

    pub fn len(&self) -> usize {
        self.entitlements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entitlements.is_empty()
    }
}

impl<C: Default> Default for EntitlementsManager<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C: fmt::Debug> fmt::Debug for EntitlementsManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitlementsManager")
            .field("context", &self.context)
            .field("entitlements", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}
