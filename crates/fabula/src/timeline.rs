//! Ordered event sequences and timeline layout.
//!
//! An [`OrderedIndex`] maintains one or more named order lists over a
//! shared universe of event identifiers, plus a position cache mapping
//! each identifier to a pixel x-coordinate. The cache is populated lazily
//! by [`OrderedIndex::layout`] and survives relayout, so an event dragged
//! to a raw pointer coordinate keeps that coordinate on every subsequent
//! layout until it is explicitly invalidated.
//!
//! Two reordering operations exist deliberately side by side:
//!
//! - [`OrderedIndex::swap_positions`] trades the cached x-coordinates of
//!   two events without touching any order list, producing a visual swap.
//! - [`OrderedIndex::reorder`] moves an element within one order list's
//!   sequence, independent of cached coordinates.
//!
//! Mutating operations on unknown identifiers are no-ops, so event
//! handlers can call them speculatively.

use indexmap::IndexMap;
use log::{debug, trace};

use fabula_core::identifier::EntityId;

use crate::config::TimelineConfig;
use crate::error::FabulaError;

/// An opaque handle naming one order list of an [`OrderedIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListHandle(usize);

impl ListHandle {
    /// Returns the raw handle value.
    pub fn raw(self) -> usize {
        self.0
    }
}

/// The result of one layout pass: an x-coordinate per event plus the
/// total extent.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineLayout {
    positions: IndexMap<EntityId, f64>,
    extent: f64,
}

impl TimelineLayout {
    /// Returns the laid-out x-coordinate of an event, if it was part of
    /// the layout.
    pub fn position(&self, id: EntityId) -> Option<f64> {
        self.positions.get(&id).copied()
    }

    /// Returns an iterator over `(identifier, x)` pairs in display order.
    pub fn positions(&self) -> impl Iterator<Item = (EntityId, f64)> + '_ {
        self.positions.iter().map(|(id, x)| (*id, *x))
    }

    /// Returns the total width of the layout in pixels.
    ///
    /// Includes one spacing unit of padding after the last slot, and is
    /// never smaller than the configured minimum width, even for an
    /// empty timeline.
    pub fn extent(&self) -> f64 {
        self.extent
    }
}

/// Ordered event sequences with a drag-surviving position cache.
///
/// A fresh index starts with one default order list; further lists over
/// the same identifier universe can be added with
/// [`OrderedIndex::add_order_list`]. The position cache is shared by all
/// lists, so a drag performed while one ordering is displayed carries
/// over to the others.
///
/// # Examples
///
/// ```
/// use fabula::config::TimelineConfig;
/// use fabula::timeline::OrderedIndex;
/// use fabula_core::identifier::IdAllocator;
///
/// let mut alloc = IdAllocator::new();
/// let mut index = OrderedIndex::new(TimelineConfig::default());
/// let handle = index.default_list();
///
/// let first = alloc.allocate();
/// let second = alloc.allocate();
/// index.insert(first);
/// index.insert(second);
///
/// let layout = index.layout(handle, |_| 80.0).unwrap();
/// assert_eq!(layout.position(first), Some(20.0));
/// assert_eq!(layout.position(second), Some(120.0));
/// ```
#[derive(Debug)]
pub struct OrderedIndex {
    config: TimelineConfig,
    lists: Vec<Vec<EntityId>>,
    cache: IndexMap<EntityId, f64>,
}

impl OrderedIndex {
    /// Creates an index with an empty default order list.
    pub fn new(config: TimelineConfig) -> Self {
        Self {
            config,
            lists: vec![Vec::new()],
            cache: IndexMap::new(),
        }
    }

    /// Returns the timeline configuration.
    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Returns the handle of the default order list.
    pub fn default_list(&self) -> ListHandle {
        ListHandle(0)
    }

    /// Creates a new empty order list and returns its handle.
    pub fn add_order_list(&mut self) -> ListHandle {
        self.lists.push(Vec::new());
        let handle = ListHandle(self.lists.len() - 1);
        debug!(handle:? = handle; "Added order list");
        handle
    }

    /// Appends an event to every order list that does not already
    /// contain it.
    pub fn insert(&mut self, id: EntityId) {
        for list in &mut self.lists {
            if !list.contains(&id) {
                list.push(id);
            }
        }
        debug!(event:% = id; "Inserted event into order lists");
    }

    /// Removes an event from every order list and from the position
    /// cache. Unknown identifiers are ignored.
    pub fn remove(&mut self, id: EntityId) {
        for list in &mut self.lists {
            list.retain(|entry| *entry != id);
        }
        self.cache.shift_remove(&id);
        debug!(event:% = id; "Removed event from order lists");
    }

    /// Returns `true` if any order list contains the event.
    pub fn contains(&self, id: EntityId) -> bool {
        self.lists.iter().any(|list| list.contains(&id))
    }

    /// Returns an order list's current sequence.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::InvalidHandle`] for an unknown handle.
    pub fn order(&self, handle: ListHandle) -> Result<&[EntityId], FabulaError> {
        self.lists
            .get(handle.0)
            .map(Vec::as_slice)
            .ok_or(FabulaError::InvalidHandle(handle.0))
    }

    /// Returns the position of an event within an order list, or `None`
    /// if the list does not contain it.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::InvalidHandle`] for an unknown handle.
    pub fn index_of(
        &self,
        handle: ListHandle,
        id: EntityId,
    ) -> Result<Option<usize>, FabulaError> {
        Ok(self.order(handle)?.iter().position(|entry| *entry == id))
    }

    /// Lays out an order list left to right and returns the resulting
    /// coordinates.
    ///
    /// `slot_width` gives each event's own display width. An event with a
    /// cached x-coordinate keeps it; an uncached event is assigned the
    /// running coordinate and cached. The running coordinate starts at
    /// one spacing unit and advances by `slot_width(id) + spacing` for
    /// every event, cached or not, so freshly inserted events land after
    /// the sequence's accumulated extent.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::InvalidHandle`] for an unknown handle.
    pub fn layout(
        &mut self,
        handle: ListHandle,
        slot_width: impl Fn(EntityId) -> f64,
    ) -> Result<TimelineLayout, FabulaError> {
        let order = self
            .lists
            .get(handle.0)
            .ok_or(FabulaError::InvalidHandle(handle.0))?
            .clone();

        let spacing = self.config.spacing();
        let mut running_x = spacing;
        let mut positions = IndexMap::with_capacity(order.len());

        for id in order {
            let x = match self.cache.get(&id) {
                Some(cached) => *cached,
                None => {
                    self.cache.insert(id, running_x);
                    running_x
                }
            };
            positions.insert(id, x);
            running_x += slot_width(id) + spacing;
        }

        // The right edge gets a full spacing unit beyond the last slot.
        let extent = (running_x + spacing).max(self.config.min_width());
        trace!(events = positions.len(), extent = extent; "Laid out timeline");
        Ok(TimelineLayout { positions, extent })
    }

    /// Overwrites an event's cached x-coordinate with a raw pointer
    /// coordinate.
    ///
    /// Used when an event is dropped at an arbitrary position rather
    /// than swapped with a neighbor. Unknown identifiers are ignored.
    pub fn move_to_absolute_x(&mut self, id: EntityId, target_x: f64) {
        if !self.contains(id) {
            return;
        }
        self.cache.insert(id, target_x);
        trace!(event:% = id, x = target_x; "Moved event to absolute position");
    }

    /// Exchanges the cached x-coordinates of two events, leaving every
    /// order list's sequence unchanged.
    ///
    /// A no-op unless both events have cached coordinates.
    pub fn swap_positions(&mut self, a: EntityId, b: EntityId) {
        let (Some(x_a), Some(x_b)) = (self.cache.get(&a).copied(), self.cache.get(&b).copied())
        else {
            return;
        };
        self.cache.insert(a, x_b);
        self.cache.insert(b, x_a);
        trace!(first:% = a, second:% = b; "Swapped event positions");
    }

    /// Moves the element at `from` to position `to` within one order
    /// list's sequence.
    ///
    /// A true order change, independent of cached coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::InvalidHandle`] for an unknown handle, or
    /// [`FabulaError::IndexOutOfRange`] if either index falls outside the
    /// list.
    pub fn reorder(
        &mut self,
        handle: ListHandle,
        from: usize,
        to: usize,
    ) -> Result<(), FabulaError> {
        let list = self
            .lists
            .get_mut(handle.0)
            .ok_or(FabulaError::InvalidHandle(handle.0))?;

        let len = list.len();
        for index in [from, to] {
            if index >= len {
                return Err(FabulaError::IndexOutOfRange { index, len });
            }
        }

        let id = list.remove(from);
        list.insert(to, id);
        debug!(event:% = id, from = from, to = to; "Reordered event");
        Ok(())
    }

    /// Forgets an event's cached x-coordinate so the next layout assigns
    /// it a fresh one. Unknown identifiers are ignored.
    pub fn invalidate(&mut self, id: EntityId) {
        self.cache.shift_remove(&id);
    }

    /// Removes all events and cached positions, keeping the default
    /// order list (empty) and dropping any additional lists.
    pub fn clear(&mut self) {
        self.lists.clear();
        self.lists.push(Vec::new());
        self.cache.clear();
        debug!("Cleared ordered index");
    }
}
