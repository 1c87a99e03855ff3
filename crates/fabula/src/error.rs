//! Error types for chart, interaction, and timeline operations.
//!
//! All variants are local, synchronous, and recoverable; none are fatal to
//! the process. Operations either apply fully or reject without mutating
//! state.

use thiserror::Error;

use fabula_core::identifier::{EntityId, IdentityError};

/// The main error type for Fabula operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FabulaError {
    /// An operation referenced an identifier with no live entity behind it.
    #[error("no entity with identifier {0}")]
    EntityNotFound(EntityId),

    /// A creation operation collided with an existing identifier.
    #[error("an entity with identifier {0} already exists")]
    DuplicateEntity(EntityId),

    /// An identifier was released that is not currently allocated.
    #[error(transparent)]
    InvalidIdentifier(#[from] IdentityError),

    /// An order-list handle does not name an existing list.
    #[error("unknown order list handle {0}")]
    InvalidHandle(usize),

    /// A reorder index fell outside the order list.
    #[error("index {index} out of range for order list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}
