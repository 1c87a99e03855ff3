//! The relationship chart model.
//!
//! A [`RelationshipChart`] owns character nodes and the labeled
//! associations connecting them. Each association has exactly two
//! [`AssociationPoint`]s (start and end), permanently paired to each
//! other for the association's lifetime. Each point independently tracks
//! its own position and the node it is attached to, so the host can drag
//! one end of a relationship line without disturbing the other, or leave
//! an end dangling in empty space.
//!
//! All entities are kept in identifier-keyed maps and related by
//! identifier rather than by direct references, which lets the chart check
//! the node/point consistency invariants centrally:
//!
//! - a point's attached node, if any, lists that point in its endpoint set
//! - a point is never attached to the node holding its opposite point
//!
//! Operations either apply fully or reject without mutating state.

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};
use serde::Serialize;

use fabula_core::geometry::{Point, Rect, Size};
use fabula_core::identifier::{EntityId, IdAllocator, IdentityError};

use crate::config::ChartConfig;
use crate::error::FabulaError;

mod snap;

pub use snap::snap_to_rect_boundary;

/// A positioned character node on the chart.
#[derive(Debug, Clone)]
pub struct CharacterNode {
    id: EntityId,
    name: String,
    origin: Point,
    size: Size,
    points: IndexSet<EntityId>,
}

impl CharacterNode {
    /// Returns the node's identifier.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the display name passed through from the character record.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the top-left origin of the node rectangle.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Returns the size of the node rectangle.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns the node's rectangle in chart space.
    pub fn rect(&self) -> Rect {
        Rect::new(self.origin, self.size)
    }

    /// Returns an iterator over the association points attached to this
    /// node.
    pub fn endpoints(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.points.iter().copied()
    }
}

/// A labeled association between two characters.
///
/// The label's position is stored independently of the line geometry; it
/// defaults to the line midpoint and is only re-centered on explicit
/// request ([`RelationshipChart::center_label`]).
#[derive(Debug, Clone)]
pub struct Association {
    id: EntityId,
    label: String,
    start_point: EntityId,
    end_point: EntityId,
    label_position: Point,
}

impl Association {
    /// Returns the association's identifier.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the label text.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the identifier of the start point.
    pub fn start_point(&self) -> EntityId {
        self.start_point
    }

    /// Returns the identifier of the end point.
    pub fn end_point(&self) -> EntityId {
        self.end_point
    }

    /// Returns the position of the label text.
    pub fn label_position(&self) -> Point {
        self.label_position
    }
}

/// One attachable end of an association line.
#[derive(Debug, Clone)]
pub struct AssociationPoint {
    id: EntityId,
    association: EntityId,
    node: EntityId,
    opposite: EntityId,
    position: Point,
    // Routes position writes to the correct side of the line when the
    // host renders it; fixed at creation.
    is_end: bool,
}

impl AssociationPoint {
    /// Returns the point's identifier.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the identifier of the owning association.
    pub fn association(&self) -> EntityId {
        self.association
    }

    /// Returns the identifier of the attached node, or [`EntityId::NONE`]
    /// when dangling.
    pub fn node(&self) -> EntityId {
        self.node
    }

    /// Returns the identifier of the opposite point on the same
    /// association.
    pub fn opposite(&self) -> EntityId {
        self.opposite
    }

    /// Returns the point's position in chart space.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Returns `true` if this is the end (rather than start) point of its
    /// association's line.
    pub fn is_end(&self) -> bool {
        self.is_end
    }

    /// Returns `true` if the point is not attached to any node.
    pub fn is_dangling(&self) -> bool {
        self.node.is_none()
    }
}

/// Persistable state of a single node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub id: EntityId,
    pub name: String,
    pub origin: Point,
    pub size: Size,
}

/// Persistable state and render geometry of a single association.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssociationSnapshot {
    pub id: EntityId,
    pub start_node: EntityId,
    pub end_node: EntityId,
    pub start: Point,
    pub end: Point,
    pub label: String,
    pub label_position: Point,
}

/// The relationship chart: nodes, associations, and association points.
///
/// # Examples
///
/// ```
/// use fabula::chart::RelationshipChart;
/// use fabula::config::ChartConfig;
/// use fabula_core::geometry::Point;
/// use fabula_core::identifier::{EntityId, IdAllocator};
///
/// let mut alloc = IdAllocator::new();
/// let mut chart = RelationshipChart::new(ChartConfig::default());
///
/// let hero = alloc.allocate();
/// let rival = alloc.allocate();
/// chart.add_node(hero, "Hero").unwrap();
/// chart.add_node(rival, "Rival").unwrap();
///
/// let assoc = alloc.allocate();
/// chart
///     .add_association(&mut alloc, assoc, hero, rival, "knows")
///     .unwrap();
///
/// chart.set_node_position(hero, Point::new(50.0, 50.0)).unwrap();
/// assert_eq!(chart.node(hero).unwrap().origin(), Point::new(50.0, 50.0));
/// ```
#[derive(Debug)]
pub struct RelationshipChart {
    config: ChartConfig,
    nodes: IndexMap<EntityId, CharacterNode>,
    associations: IndexMap<EntityId, Association>,
    points: IndexMap<EntityId, AssociationPoint>,
}

impl RelationshipChart {
    /// Creates an empty chart with the given configuration.
    pub fn new(config: ChartConfig) -> Self {
        Self {
            config,
            nodes: IndexMap::new(),
            associations: IndexMap::new(),
            points: IndexMap::new(),
        }
    }

    /// Returns the chart configuration.
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Returns the number of nodes on the chart.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of associations on the chart.
    pub fn association_count(&self) -> usize {
        self.associations.len()
    }

    /// Checks whether a node with the given identifier exists.
    pub fn contains_node(&self, id: EntityId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Returns the node with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::EntityNotFound`] for an unknown identifier.
    pub fn node(&self, id: EntityId) -> Result<&CharacterNode, FabulaError> {
        self.nodes.get(&id).ok_or(FabulaError::EntityNotFound(id))
    }

    /// Returns the association with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::EntityNotFound`] for an unknown identifier.
    pub fn association(&self, id: EntityId) -> Result<&Association, FabulaError> {
        self.associations
            .get(&id)
            .ok_or(FabulaError::EntityNotFound(id))
    }

    /// Returns the association point with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::EntityNotFound`] for an unknown identifier.
    pub fn endpoint(&self, id: EntityId) -> Result<&AssociationPoint, FabulaError> {
        self.points.get(&id).ok_or(FabulaError::EntityNotFound(id))
    }

    /// Returns an iterator over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &CharacterNode> {
        self.nodes.values()
    }

    /// Returns an iterator over all associations in insertion order.
    pub fn associations(&self) -> impl Iterator<Item = &Association> {
        self.associations.values()
    }

    /// Adds a character node at the origin with the configured default
    /// size.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::DuplicateEntity`] if a node with `id`
    /// already exists. Existing nodes are never silently replaced.
    pub fn add_node(
        &mut self,
        id: EntityId,
        name: impl Into<String>,
    ) -> Result<(), FabulaError> {
        if self.nodes.contains_key(&id) {
            return Err(FabulaError::DuplicateEntity(id));
        }

        let node = CharacterNode {
            id,
            name: name.into(),
            origin: Point::default(),
            size: self.config.node_size(),
            points: IndexSet::new(),
        };
        self.nodes.insert(id, node);
        debug!(node:% = id; "Added character node");
        Ok(())
    }

    /// Removes a node, detaching every association point attached to it.
    ///
    /// The points themselves are not deleted; they become dangling and
    /// keep their positions.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::EntityNotFound`] for an unknown identifier.
    pub fn remove_node(&mut self, id: EntityId) -> Result<(), FabulaError> {
        let node = self
            .nodes
            .shift_remove(&id)
            .ok_or(FabulaError::EntityNotFound(id))?;

        for point_id in &node.points {
            if let Some(point) = self.points.get_mut(point_id) {
                point.node = EntityId::NONE;
            }
        }
        debug!(node:% = id, detached = node.points.len(); "Removed character node");
        Ok(())
    }

    /// Moves a node to `position`, clamped to non-negative coordinates.
    ///
    /// Every association point attached to the node moves by the same
    /// delta, keeping line attachments visually glued to the rectangle.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::EntityNotFound`] for an unknown identifier.
    pub fn set_node_position(
        &mut self,
        id: EntityId,
        position: Point,
    ) -> Result<(), FabulaError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(FabulaError::EntityNotFound(id))?;

        let clamped = position.clamp_non_negative();
        let delta = clamped.sub(node.origin);
        node.origin = clamped;

        for point_id in node.points.clone() {
            if let Some(point) = self.points.get_mut(&point_id) {
                point.position = point.position.add(delta);
            }
        }
        trace!(node:% = id; "Moved character node");
        Ok(())
    }

    /// Overwrites a node's rectangle size.
    ///
    /// Intended for the host to push text-measured sizes after rendering.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::EntityNotFound`] for an unknown identifier.
    pub fn set_node_size(&mut self, id: EntityId, size: Size) -> Result<(), FabulaError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(FabulaError::EntityNotFound(id))?;
        node.size = size;
        Ok(())
    }

    /// Adds an association between two nodes, allocating its two
    /// association points.
    ///
    /// `start_node` and `end_node` may be [`EntityId::NONE`] to create a
    /// dangling end. Returns the identifiers of the new start and end
    /// points.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::DuplicateEntity`] if an association with
    /// `id` already exists, or [`FabulaError::EntityNotFound`] if either
    /// node identifier is neither the sentinel nor a known node. Nothing
    /// is allocated or mutated on failure.
    pub fn add_association(
        &mut self,
        alloc: &mut IdAllocator,
        id: EntityId,
        start_node: EntityId,
        end_node: EntityId,
        label: impl Into<String>,
    ) -> Result<(EntityId, EntityId), FabulaError> {
        if self.associations.contains_key(&id) {
            return Err(FabulaError::DuplicateEntity(id));
        }
        for node_id in [start_node, end_node] {
            if node_id.is_some() && !self.nodes.contains_key(&node_id) {
                return Err(FabulaError::EntityNotFound(node_id));
            }
        }

        let start_point = alloc.allocate();
        let end_point = alloc.allocate();

        self.associations.insert(
            id,
            Association {
                id,
                label: label.into(),
                start_point,
                end_point,
                label_position: Point::default(),
            },
        );
        self.points.insert(
            start_point,
            AssociationPoint {
                id: start_point,
                association: id,
                node: start_node,
                opposite: end_point,
                position: Point::default(),
                is_end: false,
            },
        );
        self.points.insert(
            end_point,
            AssociationPoint {
                id: end_point,
                association: id,
                node: end_node,
                opposite: start_point,
                position: Point::default(),
                is_end: true,
            },
        );

        if let Some(node) = self.nodes.get_mut(&start_node) {
            node.points.insert(start_point);
        }
        if let Some(node) = self.nodes.get_mut(&end_node) {
            node.points.insert(end_point);
        }

        debug!(association:% = id, start:% = start_node, end:% = end_node; "Added association");
        Ok((start_point, end_point))
    }

    /// Removes an association, deleting both its points and releasing
    /// their identifiers along with the association's own identifier.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::EntityNotFound`] for an unknown identifier,
    /// or [`FabulaError::InvalidIdentifier`] if any of the identifiers are
    /// not live in `alloc`. Nothing is mutated on failure.
    pub fn remove_association(
        &mut self,
        alloc: &mut IdAllocator,
        id: EntityId,
    ) -> Result<(), FabulaError> {
        let assoc = self
            .associations
            .get(&id)
            .ok_or(FabulaError::EntityNotFound(id))?;
        let start_point = assoc.start_point;
        let end_point = assoc.end_point;

        // Verify the releases cannot fail before touching any state.
        for released in [start_point, end_point, id] {
            if !alloc.is_live(released) {
                return Err(IdentityError::InvalidIdentifier(released).into());
            }
        }

        for point_id in [start_point, end_point] {
            if let Some(point) = self.points.shift_remove(&point_id) {
                if let Some(node) = self.nodes.get_mut(&point.node) {
                    node.points.shift_remove(&point_id);
                }
                alloc.release(point_id)?;
            }
        }
        self.associations.shift_remove(&id);
        alloc.release(id)?;

        debug!(association:% = id; "Removed association");
        Ok(())
    }

    /// Sets an association point's position without changing its
    /// attachment.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::EntityNotFound`] for an unknown identifier.
    pub fn set_endpoint_position(
        &mut self,
        id: EntityId,
        position: Point,
    ) -> Result<(), FabulaError> {
        let point = self
            .points
            .get_mut(&id)
            .ok_or(FabulaError::EntityNotFound(id))?;
        point.position = position;
        Ok(())
    }

    /// Attaches an association point to a node, detaching it from any
    /// prior node first.
    ///
    /// Attaching to the node currently holding the opposite point is a
    /// silent no-op: a relationship may not loop back onto a single
    /// character through reattachment.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::EntityNotFound`] if either identifier is
    /// unknown.
    pub fn attach_endpoint(
        &mut self,
        endpoint: EntityId,
        node_id: EntityId,
    ) -> Result<(), FabulaError> {
        let point = self
            .points
            .get(&endpoint)
            .ok_or(FabulaError::EntityNotFound(endpoint))?;
        if !self.nodes.contains_key(&node_id) {
            return Err(FabulaError::EntityNotFound(node_id));
        }

        let previous = point.node;
        let opposite = point.opposite;
        let opposite_node = self
            .points
            .get(&opposite)
            .map(|point| point.node)
            .unwrap_or(EntityId::NONE);

        if opposite_node == node_id {
            trace!(endpoint:% = endpoint, node:% = node_id; "Rejected self-loop attachment");
            return Ok(());
        }
        if previous == node_id {
            return Ok(());
        }

        if let Some(prior) = self.nodes.get_mut(&previous) {
            prior.points.shift_remove(&endpoint);
        }
        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.points.insert(endpoint);
        }
        if let Some(point) = self.points.get_mut(&endpoint) {
            point.node = node_id;
        }
        debug!(endpoint:% = endpoint, node:% = node_id; "Attached association point");
        Ok(())
    }

    /// Detaches an association point from its node, leaving it dangling
    /// at its current position.
    ///
    /// Detaching an already-dangling point is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::EntityNotFound`] for an unknown identifier.
    pub fn detach_endpoint(&mut self, endpoint: EntityId) -> Result<(), FabulaError> {
        let point = self
            .points
            .get_mut(&endpoint)
            .ok_or(FabulaError::EntityNotFound(endpoint))?;

        let previous = point.node;
        point.node = EntityId::NONE;
        if let Some(node) = self.nodes.get_mut(&previous) {
            node.points.shift_remove(&endpoint);
        }
        Ok(())
    }

    /// Snaps a point to the nearest attachment position on a node's
    /// rectangle boundary.
    ///
    /// Pure with respect to chart state; see [`snap_to_rect_boundary`]
    /// for the snapping policy.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::EntityNotFound`] for an unknown identifier.
    pub fn snap_to_node_edge(
        &self,
        node_id: EntityId,
        point: Point,
    ) -> Result<Point, FabulaError> {
        let node = self.node(node_id)?;
        Ok(snap_to_rect_boundary(
            node.rect(),
            point,
            self.config.snap_band(),
        ))
    }

    /// Sets the position of an association's label text.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::EntityNotFound`] for an unknown identifier.
    pub fn set_label_position(
        &mut self,
        association: EntityId,
        position: Point,
    ) -> Result<(), FabulaError> {
        let assoc = self
            .associations
            .get_mut(&association)
            .ok_or(FabulaError::EntityNotFound(association))?;
        assoc.label_position = position;
        Ok(())
    }

    /// Re-centers an association's label on the midpoint of its line.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::EntityNotFound`] for an unknown identifier.
    pub fn center_label(&mut self, association: EntityId) -> Result<(), FabulaError> {
        let assoc = self
            .associations
            .get(&association)
            .ok_or(FabulaError::EntityNotFound(association))?;

        let start = self.endpoint(assoc.start_point)?.position;
        let end = self.endpoint(assoc.end_point)?.position;
        let midpoint = start.lerp(end, 0.5);

        if let Some(assoc) = self.associations.get_mut(&association) {
            assoc.label_position = midpoint;
        }
        Ok(())
    }

    /// Returns the identifiers of all associations with at least one
    /// point attached to the given node.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::EntityNotFound`] for an unknown identifier.
    pub fn associations_of_node(
        &self,
        node_id: EntityId,
    ) -> Result<Vec<EntityId>, FabulaError> {
        let node = self.node(node_id)?;
        let mut seen = IndexSet::new();
        for point_id in &node.points {
            if let Some(point) = self.points.get(point_id) {
                seen.insert(point.association);
            }
        }
        Ok(seen.into_iter().collect())
    }

    /// Returns the persistable state of a node.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::EntityNotFound`] for an unknown identifier.
    pub fn node_snapshot(&self, id: EntityId) -> Result<NodeSnapshot, FabulaError> {
        let node = self.node(id)?;
        Ok(NodeSnapshot {
            id: node.id,
            name: node.name.clone(),
            origin: node.origin,
            size: node.size,
        })
    }

    /// Returns the persistable state and render geometry of an
    /// association.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::EntityNotFound`] for an unknown identifier.
    pub fn association_snapshot(
        &self,
        id: EntityId,
    ) -> Result<AssociationSnapshot, FabulaError> {
        let assoc = self.association(id)?;
        let start = self.endpoint(assoc.start_point)?;
        let end = self.endpoint(assoc.end_point)?;
        Ok(AssociationSnapshot {
            id: assoc.id,
            start_node: start.node,
            end_node: end.node,
            start: start.position,
            end: end.position,
            label: assoc.label.clone(),
            label_position: assoc.label_position,
        })
    }

    /// Removes all nodes and associations, releasing the association
    /// point identifiers the chart allocated.
    ///
    /// Node and association identifiers belong to the host's record
    /// managers and are left live.
    ///
    /// # Errors
    ///
    /// Returns [`FabulaError::InvalidIdentifier`] if a point identifier is
    /// not live in `alloc`; the chart is cleared regardless.
    pub fn clear(&mut self, alloc: &mut IdAllocator) -> Result<(), FabulaError> {
        let point_ids: Vec<EntityId> = self.points.keys().copied().collect();
        self.nodes.clear();
        self.associations.clear();
        self.points.clear();

        for point_id in point_ids {
            alloc.release(point_id)?;
        }
        debug!("Cleared relationship chart");
        Ok(())
    }
}
