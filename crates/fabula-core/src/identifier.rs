//! Entity identifiers and the allocator that mints them.
//!
//! Every entity in a Fabula project (chapter, event, character,
//! association, association point) is referenced by an [`EntityId`] across
//! independent collections rather than owned directly. Identifiers are
//! unique among all currently-live entities regardless of entity kind, so
//! a single [`IdAllocator`] is shared by all entity managers.
//!
//! The value `-1` is reserved as the sentinel meaning "no entity"; it is
//! exposed as [`EntityId::NONE`] and is never handed out by the allocator.

use std::collections::HashSet;
use std::fmt;

use log::trace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by [`IdAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// An identifier was released that is not currently allocated.
    #[error("identifier {0} is not currently allocated")]
    InvalidIdentifier(EntityId),
}

/// A 64-bit identifier referencing a single live entity.
///
/// Identifiers are plain values: copying one does not affect the entity's
/// lifetime. The sentinel [`EntityId::NONE`] stands for "no entity" and is
/// used for dangling references (for example an association point that is
/// not attached to any character).
///
/// # Examples
///
/// ```
/// use fabula_core::identifier::EntityId;
///
/// let id = EntityId::new(7);
/// assert!(id.is_some());
/// assert!(EntityId::NONE.is_none());
/// assert_eq!(id.raw(), 7);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(i64);

impl EntityId {
    /// The sentinel identifier meaning "no entity".
    pub const NONE: EntityId = EntityId(-1);

    /// Creates an identifier from its raw value.
    pub fn new(raw: i64) -> Self {
        EntityId(raw)
    }

    /// Returns the raw 64-bit value.
    pub fn raw(self) -> i64 {
        self.0
    }

    /// Returns `true` if this is the sentinel identifier.
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Returns `true` if this identifier references an entity.
    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EntityId {
    fn from(raw: i64) -> Self {
        EntityId(raw)
    }
}

/// Mints and reclaims process-unique entity identifiers.
///
/// `allocate` never returns a value that collides with a currently-live
/// identifier. Values increase monotonically except when a previously
/// released identifier is recycled; recycling only happens after an
/// explicit [`IdAllocator::release`]. Constructing a fresh allocator per
/// test gives fully deterministic identifier sequences.
///
/// # Examples
///
/// ```
/// use fabula_core::identifier::IdAllocator;
///
/// let mut alloc = IdAllocator::new();
/// let a = alloc.allocate();
/// let b = alloc.allocate();
/// assert_ne!(a, b);
///
/// alloc.release(a).unwrap();
/// let c = alloc.allocate(); // may recycle `a`
/// assert!(alloc.is_live(c));
/// ```
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: i64,
    live: HashSet<EntityId>,
    free: Vec<EntityId>,
}

impl IdAllocator {
    /// Creates a new allocator with no live identifiers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a new identifier, unique among all live identifiers.
    ///
    /// Released identifiers are recycled before the monotonic counter is
    /// advanced; no ordering is guaranteed for recycled values.
    pub fn allocate(&mut self) -> EntityId {
        let id = match self.free.pop() {
            Some(recycled) => recycled,
            None => {
                let id = EntityId::new(self.next);
                self.next += 1;
                id
            }
        };
        self.live.insert(id);
        trace!(id:% = id; "Allocated identifier");
        id
    }

    /// Marks an identifier as free for reuse.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidIdentifier`] if `id` is not
    /// currently allocated, including the sentinel [`EntityId::NONE`].
    pub fn release(&mut self, id: EntityId) -> Result<(), IdentityError> {
        if !self.live.remove(&id) {
            return Err(IdentityError::InvalidIdentifier(id));
        }
        self.free.push(id);
        trace!(id:% = id; "Released identifier");
        Ok(())
    }

    /// Returns `true` if `id` is currently allocated.
    pub fn is_live(&self, id: EntityId) -> bool {
        self.live.contains(&id)
    }

    /// Returns the number of currently-live identifiers.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    /// Any interleaving of allocations and releases keeps live identifiers
    /// distinct from each other.
    fn check_live_ids_are_distinct(ops: Vec<bool>) -> Result<(), TestCaseError> {
        let mut alloc = IdAllocator::new();
        let mut held: Vec<EntityId> = Vec::new();

        for allocate in ops {
            if allocate || held.is_empty() {
                let id = alloc.allocate();
                prop_assert!(!held.contains(&id));
                held.push(id);
            } else {
                let id = held.remove(held.len() / 2);
                prop_assert!(alloc.release(id).is_ok());
            }
        }

        prop_assert_eq!(alloc.live_count(), held.len());
        for id in &held {
            prop_assert!(alloc.is_live(*id));
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn live_ids_are_distinct(ops in proptest::collection::vec(any::<bool>(), 0..64)) {
            check_live_ids_are_distinct(ops)?;
        }
    }
}
