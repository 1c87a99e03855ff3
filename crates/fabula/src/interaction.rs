//! The drag-interaction gesture state machine.
//!
//! An [`InteractionController`] sits between the host's pointer events and
//! a [`RelationshipChart`]. Exactly one gesture is active at a time; press
//! events arriving while a gesture is in progress are ignored, so the five
//! gesture kinds are mutually exclusive by construction:
//!
//! - moving a character node (grid-snapped, continuously committed)
//! - dragging an association point live with the button held
//! - a deferred click-to-attach started from a context action
//! - moving an association label (grid-snapped, continuously committed)
//!
//! The controller never lets a chart error escape a gesture in an
//! inconsistent state: on any mid-gesture failure it rolls back the drag
//! snapshot, resets to [`Gesture::Idle`], and returns the error to the
//! caller.
//!
//! The controller does not own the chart; the host passes it into each
//! event handler, which keeps the event loop single-threaded and the
//! borrow explicit.

use log::{debug, trace};

use fabula_core::geometry::Point;
use fabula_core::identifier::EntityId;

use crate::chart::RelationshipChart;
use crate::error::FabulaError;

/// What a primary-button press landed on, as hit-tested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    /// A character node rectangle.
    Node(EntityId),
    /// An association point handle.
    Endpoint(EntityId),
    /// An association's label text; carries the association identifier.
    Label(EntityId),
    /// Empty canvas.
    Canvas,
}

/// The currently active gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A node follows the pointer, snapped to the node grid.
    MovingNode {
        node: EntityId,
        /// Press point minus node origin; keeps the grab point fixed
        /// under the pointer.
        grab_offset: Point,
    },
    /// An association point follows the pointer with the button held.
    DraggingEndpoint {
        endpoint: EntityId,
        /// Node whose hit region the pointer is currently inside, or
        /// [`EntityId::NONE`]. Set and cleared by hover signals.
        hovered: EntityId,
        /// Pre-drag position, restored if the drag does not commit.
        origin: Point,
    },
    /// A deferred attach: the next press anywhere resolves it.
    PendingAttach { endpoint: EntityId },
    /// A label follows the pointer, snapped to the label grid.
    MovingLabel {
        association: EntityId,
        grab_offset: Point,
    },
}

/// The result of the most recently completed gesture, for the host to
/// persist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// A node was dragged to a new position.
    NodeMoved { node: EntityId, position: Point },
    /// An association point was attached to a node.
    EndpointAttached { endpoint: EntityId, node: EntityId },
    /// An association point was detached and left dangling.
    EndpointDetached { endpoint: EntityId },
    /// A drag ended without committing; the point was restored to its
    /// pre-drag state.
    EndpointRestored { endpoint: EntityId },
    /// An association label was dragged to a new position.
    LabelMoved {
        association: EntityId,
        position: Point,
    },
}

/// Translates pointer events into chart mutations, one gesture at a time.
///
/// # Examples
///
/// ```
/// use fabula::chart::RelationshipChart;
/// use fabula::config::ChartConfig;
/// use fabula::interaction::{InteractionController, PressTarget};
/// use fabula_core::geometry::Point;
/// use fabula_core::identifier::IdAllocator;
///
/// let mut alloc = IdAllocator::new();
/// let mut chart = RelationshipChart::new(ChartConfig::default());
/// let hero = alloc.allocate();
/// chart.add_node(hero, "Hero").unwrap();
///
/// let mut controller = InteractionController::new();
/// controller
///     .press(&mut chart, Point::new(5.0, 5.0), PressTarget::Node(hero))
///     .unwrap();
/// controller.pointer_move(&mut chart, Point::new(108.0, 57.0)).unwrap();
/// controller.release(&mut chart, Point::new(108.0, 57.0)).unwrap();
///
/// // Snapped to the 10 px node grid.
/// assert_eq!(chart.node(hero).unwrap().origin(), Point::new(100.0, 50.0));
/// ```
#[derive(Debug, Default)]
pub struct InteractionController {
    gesture: Gesture,
    outcome: Option<GestureOutcome>,
}

impl InteractionController {
    /// Creates an idle controller with no recorded outcome.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the currently active gesture.
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Returns `true` if no gesture is in progress.
    pub fn is_idle(&self) -> bool {
        matches!(self.gesture, Gesture::Idle)
    }

    /// Returns the outcome of the most recently completed gesture.
    ///
    /// The value persists until the next gesture completes, so the host
    /// can read it at any point after its event handler returns.
    pub fn last_outcome(&self) -> Option<GestureOutcome> {
        self.outcome
    }

    /// Handles a primary-button press.
    ///
    /// From [`Gesture::Idle`] this starts a gesture matching the press
    /// target. From [`Gesture::PendingAttach`] it resolves the deferred
    /// attach: a press on a node attaches the point there, anywhere else
    /// detaches it. During any other gesture the press is ignored.
    ///
    /// # Errors
    ///
    /// Returns the underlying chart error if the target identifier is
    /// unknown; the controller is reset to idle first.
    pub fn press(
        &mut self,
        chart: &mut RelationshipChart,
        point: Point,
        target: PressTarget,
    ) -> Result<(), FabulaError> {
        match self.handle_press(chart, point, target) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.abort(chart);
                Err(err)
            }
        }
    }

    /// Handles a pointer move.
    ///
    /// Node and label gestures commit their grid-snapped position on
    /// every move. An endpoint drag follows the raw pointer, or snaps to
    /// the hovered node's boundary when a node is hovered. Idle and
    /// pending-attach states ignore moves.
    ///
    /// # Errors
    ///
    /// Returns the underlying chart error if the dragged entity vanished
    /// mid-gesture; the controller rolls back and resets to idle first.
    pub fn pointer_move(
        &mut self,
        chart: &mut RelationshipChart,
        point: Point,
    ) -> Result<(), FabulaError> {
        match self.handle_move(chart, point) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.abort(chart);
                Err(err)
            }
        }
    }

    /// Handles a primary-button release, completing the active gesture.
    ///
    /// A node or label gesture records its last committed position. An
    /// endpoint drag commits to the hovered node if there is one (with
    /// the label re-centered when the attachment changed), otherwise
    /// rolls back to the pre-drag snapshot.
    ///
    /// # Errors
    ///
    /// Returns the underlying chart error on failure; the controller
    /// rolls back and resets to idle first.
    pub fn release(
        &mut self,
        chart: &mut RelationshipChart,
        point: Point,
    ) -> Result<(), FabulaError> {
        match self.handle_release(chart, point) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.abort(chart);
                Err(err)
            }
        }
    }

    /// Signals that the pointer entered a node's hit region.
    ///
    /// Only an endpoint drag reacts; it records the node as the current
    /// attach candidate.
    pub fn hover_enter(&mut self, node: EntityId) {
        if let Gesture::DraggingEndpoint { hovered, .. } = &mut self.gesture {
            *hovered = node;
            trace!(node:% = node; "Hover entered during endpoint drag");
        }
    }

    /// Signals that the pointer left a node's hit region.
    ///
    /// Clears the attach candidate if it matches `node`; a stale exit for
    /// a different node is ignored.
    pub fn hover_exit(&mut self, node: EntityId) {
        if let Gesture::DraggingEndpoint { hovered, .. } = &mut self.gesture {
            if *hovered == node {
                *hovered = EntityId::NONE;
            }
        }
    }

    /// Starts a deferred click-to-attach gesture for one side of an
    /// association.
    ///
    /// This is the entry point for attach gestures initiated from a
    /// context action rather than a pointer press. `end` selects the end
    /// point of the association's line; `false` selects the start point.
    /// Ignored if a gesture is already active.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::EntityNotFound`] for an unknown
    /// association.
    pub fn begin_pending_attach(
        &mut self,
        chart: &RelationshipChart,
        association: EntityId,
        end: bool,
    ) -> Result<(), FabulaError> {
        if !self.is_idle() {
            return Ok(());
        }

        let assoc = chart.association(association)?;
        let endpoint = if end {
            assoc.end_point()
        } else {
            assoc.start_point()
        };
        self.gesture = Gesture::PendingAttach { endpoint };
        debug!(endpoint:% = endpoint; "Started deferred attach");
        Ok(())
    }

    /// Signals loss of pointer capture, cancelling the active gesture.
    ///
    /// An endpoint drag rolls back to its pre-drag snapshot; node and
    /// label gestures keep their last committed position. No outcome is
    /// recorded.
    pub fn capture_lost(&mut self, chart: &mut RelationshipChart) {
        if !self.is_idle() {
            debug!("Pointer capture lost, cancelling gesture");
        }
        self.abort(chart);
    }

    fn handle_press(
        &mut self,
        chart: &mut RelationshipChart,
        point: Point,
        target: PressTarget,
    ) -> Result<(), FabulaError> {
        match self.gesture {
            Gesture::Idle => self.start_gesture(chart, point, target),
            Gesture::PendingAttach { endpoint } => {
                self.resolve_pending_attach(chart, endpoint, target)
            }
            // One gesture at a time; the press passes through unconsumed.
            _ => Ok(()),
        }
    }

    fn start_gesture(
        &mut self,
        chart: &RelationshipChart,
        point: Point,
        target: PressTarget,
    ) -> Result<(), FabulaError> {
        match target {
            PressTarget::Node(node) => {
                let origin = chart.node(node)?.origin();
                self.gesture = Gesture::MovingNode {
                    node,
                    grab_offset: point.sub(origin),
                };
                debug!(node:% = node; "Started node drag");
            }
            PressTarget::Endpoint(endpoint) => {
                let origin = chart.endpoint(endpoint)?.position();
                self.gesture = Gesture::DraggingEndpoint {
                    endpoint,
                    hovered: EntityId::NONE,
                    origin,
                };
                debug!(endpoint:% = endpoint; "Started endpoint drag");
            }
            PressTarget::Label(association) => {
                let origin = chart.association(association)?.label_position();
                self.gesture = Gesture::MovingLabel {
                    association,
                    grab_offset: point.sub(origin),
                };
                debug!(association:% = association; "Started label drag");
            }
            PressTarget::Canvas => {}
        }
        Ok(())
    }

    fn resolve_pending_attach(
        &mut self,
        chart: &mut RelationshipChart,
        endpoint: EntityId,
        target: PressTarget,
    ) -> Result<(), FabulaError> {
        self.gesture = Gesture::Idle;

        if let PressTarget::Node(node) = target {
            let previous = chart.endpoint(endpoint)?.node();
            chart.attach_endpoint(endpoint, node)?;

            // A rejected self-loop leaves the attachment unchanged.
            if chart.endpoint(endpoint)?.node() != node {
                self.outcome = Some(GestureOutcome::EndpointRestored { endpoint });
                return Ok(());
            }
            if previous != node {
                chart.center_label(chart.endpoint(endpoint)?.association())?;
            }
            self.outcome = Some(GestureOutcome::EndpointAttached { endpoint, node });
        } else {
            chart.detach_endpoint(endpoint)?;
            self.outcome = Some(GestureOutcome::EndpointDetached { endpoint });
        }
        Ok(())
    }

    fn handle_move(
        &mut self,
        chart: &mut RelationshipChart,
        point: Point,
    ) -> Result<(), FabulaError> {
        match self.gesture {
            Gesture::MovingNode { node, grab_offset } => {
                let grid = chart.config().node_grid();
                let position = point.sub(grab_offset).snap_to_grid(grid);
                chart.set_node_position(node, position)?;
            }
            Gesture::DraggingEndpoint {
                endpoint, hovered, ..
            } => {
                let position = if hovered.is_some() {
                    chart.snap_to_node_edge(hovered, point)?
                } else {
                    point
                };
                chart.set_endpoint_position(endpoint, position)?;
            }
            Gesture::MovingLabel {
                association,
                grab_offset,
            } => {
                let grid = chart.config().label_grid();
                let position = point.sub(grab_offset).snap_to_grid(grid);
                chart.set_label_position(association, position)?;
            }
            Gesture::Idle | Gesture::PendingAttach { .. } => {}
        }
        Ok(())
    }

    fn handle_release(
        &mut self,
        chart: &mut RelationshipChart,
        point: Point,
    ) -> Result<(), FabulaError> {
        match self.gesture {
            Gesture::MovingNode { node, .. } => {
                self.gesture = Gesture::Idle;
                let position = chart.node(node)?.origin();
                self.outcome = Some(GestureOutcome::NodeMoved { node, position });
                debug!(node:% = node; "Completed node drag");
            }
            Gesture::DraggingEndpoint {
                endpoint,
                hovered,
                origin,
            } => {
                self.gesture = Gesture::Idle;
                if hovered.is_some() {
                    self.commit_endpoint_drag(chart, endpoint, hovered, point, origin)?;
                } else {
                    chart.set_endpoint_position(endpoint, origin)?;
                    self.outcome = Some(GestureOutcome::EndpointRestored { endpoint });
                    debug!(endpoint:% = endpoint; "Endpoint drag rolled back");
                }
            }
            Gesture::MovingLabel { association, .. } => {
                self.gesture = Gesture::Idle;
                let position = chart.association(association)?.label_position();
                self.outcome = Some(GestureOutcome::LabelMoved {
                    association,
                    position,
                });
                debug!(association:% = association; "Completed label drag");
            }
            Gesture::Idle | Gesture::PendingAttach { .. } => {}
        }
        Ok(())
    }

    fn commit_endpoint_drag(
        &mut self,
        chart: &mut RelationshipChart,
        endpoint: EntityId,
        node: EntityId,
        point: Point,
        origin: Point,
    ) -> Result<(), FabulaError> {
        let previous = chart.endpoint(endpoint)?.node();
        chart.attach_endpoint(endpoint, node)?;

        // A rejected self-loop resets the point to its pre-drag position.
        if chart.endpoint(endpoint)?.node() != node {
            chart.set_endpoint_position(endpoint, origin)?;
            self.outcome = Some(GestureOutcome::EndpointRestored { endpoint });
            debug!(endpoint:% = endpoint; "Endpoint drag rolled back");
            return Ok(());
        }

        let snapped = chart.snap_to_node_edge(node, point)?;
        chart.set_endpoint_position(endpoint, snapped)?;
        if previous != node {
            chart.center_label(chart.endpoint(endpoint)?.association())?;
        }
        self.outcome = Some(GestureOutcome::EndpointAttached { endpoint, node });
        debug!(endpoint:% = endpoint, node:% = node; "Endpoint attached");
        Ok(())
    }

    /// Resets to idle, rolling back an uncommitted endpoint drag.
    fn abort(&mut self, chart: &mut RelationshipChart) {
        if let Gesture::DraggingEndpoint {
            endpoint, origin, ..
        } = self.gesture
        {
            // Best effort; the endpoint may be the entity that vanished.
            let _ = chart.set_endpoint_position(endpoint, origin);
        }
        self.gesture = Gesture::Idle;
    }
}
