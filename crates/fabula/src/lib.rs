//! Core models for a narrative authoring tool: a character relationship
//! chart, the drag-gesture state machine driving it, and an ordered
//! timeline index.
//!
//! The crate is a pure library: it owns spatial, ordered, and identity
//! state and leaves rendering, persistence, and record management to the
//! host. All mutation is synchronous and single-threaded; embed the types
//! behind a single lock if the host is multi-threaded.
//!
//! # Overview
//!
//! - [`chart`] - [`chart::RelationshipChart`]: character nodes and labeled
//!   associations whose endpoints can be dragged, reattached, or left
//!   dangling, with deterministic boundary snapping.
//! - [`interaction`] - [`interaction::InteractionController`]: translates
//!   host pointer events into chart mutations, one gesture at a time, and
//!   reports each completed gesture's outcome.
//! - [`timeline`] - [`timeline::OrderedIndex`]: named event orderings with
//!   a position cache that lets manual drags survive relayout.
//! - [`config`] - serde-deserializable configuration for both models.
//! - [`error`] - the [`error::FabulaError`] taxonomy shared by all
//!   operations.
//!
//! Identifier and geometry primitives live in the `fabula-core` crate.
//!
//! # Example
//!
//! ```
//! use fabula::chart::RelationshipChart;
//! use fabula::config::AppConfig;
//! use fabula::interaction::{InteractionController, PressTarget};
//! use fabula::timeline::OrderedIndex;
//! use fabula_core::geometry::Point;
//! use fabula_core::identifier::IdAllocator;
//!
//! let config = AppConfig::default();
//! let mut alloc = IdAllocator::new();
//! let mut chart = RelationshipChart::new(config.chart().clone());
//! let mut timeline = OrderedIndex::new(config.timeline().clone());
//!
//! // Characters on the chart, events on the timeline.
//! let hero = alloc.allocate();
//! chart.add_node(hero, "Hero")?;
//! let meeting = alloc.allocate();
//! timeline.insert(meeting);
//!
//! // Drag the hero; positions snap to the node grid.
//! let mut controller = InteractionController::new();
//! controller.press(&mut chart, Point::new(5.0, 5.0), PressTarget::Node(hero))?;
//! controller.pointer_move(&mut chart, Point::new(78.0, 44.0))?;
//! controller.release(&mut chart, Point::new(78.0, 44.0))?;
//! assert_eq!(chart.node(hero)?.origin(), Point::new(70.0, 30.0));
//! # Ok::<(), fabula::error::FabulaError>(())
//! ```

pub mod chart;
pub mod config;
pub mod error;
pub mod interaction;
pub mod timeline;

pub use chart::RelationshipChart;
pub use config::AppConfig;
pub use error::FabulaError;
pub use interaction::InteractionController;
pub use timeline::OrderedIndex;
