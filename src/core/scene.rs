use crate::core::prelude::*;

use crate::core::node::TransformNode;
use crate::core::NodeId;
use crate::util::collision::Obb;
use crate::util::linalg::GeometryError;
use slotmap::SlotMap;
use std::collections::BTreeSet;
use thiserror::Error;

/// Structural mutations the scene refuses to perform.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("node {0:?} does not exist (already destroyed?)")]
    StaleNode(NodeId),
    #[error("cannot parent {child:?} to {parent:?}: {parent:?} is a descendant of {child:?}")]
    CycleDetected { child: NodeId, parent: NodeId },
    #[error("cannot parent {0:?} to itself")]
    SelfParent(NodeId),
}

/// The transform tree plus the registry of collidable nodes.
///
/// Nodes live in a generational arena, so a [`NodeId`] kept after its node was destroyed is
/// detected rather than aliasing a newer node. Structural removal is deferred: see
/// [`queue_destroy`](SceneGraph::queue_destroy) and [`flush_destroyed`](SceneGraph::flush_destroyed).
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, TransformNode>,
    roots: Vec<NodeId>,
    collidables: Vec<NodeId>,
    pending_destroy: Vec<NodeId>,
    transforms_dirty: bool,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `node`, appending it to `parent`'s children (or to the roots).
    ///
    /// The node's world matrix and geometry are computed immediately against the parent's
    /// current world matrix.
    pub fn add(
        &mut self,
        mut node: TransformNode,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError> {
        let parent_world = match parent {
            Some(parent) => Some(self.node(parent)?.world_matrix()),
            None => None,
        };
        if let Err(e) = node.recalculate_world(parent_world.as_ref()) {
            warn!("created node with degenerate geometry: {e}");
        }
        node.parent = parent;
        node.children.clear();
        let is_collidable = node.is_collidable();
        let id = self.nodes.insert(node);
        match parent {
            Some(parent) => self.nodes[parent].children.push(id),
            None => self.roots.push(id),
        }
        if is_collidable {
            self.collidables.push(id);
        }
        Ok(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Result<&TransformNode, SceneError> {
        self.nodes.get(id).ok_or(SceneError::StaleNode(id))
    }
    /// Mutable access to a node's local state. Marks the scene's transforms as dirty until the
    /// next [`recalculate_all`](SceneGraph::recalculate_all).
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut TransformNode, SceneError> {
        let node = self.nodes.get_mut(id).ok_or(SceneError::StaleNode(id))?;
        self.transforms_dirty = true;
        Ok(node)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }
    pub fn collidables(&self) -> &[NodeId] {
        &self.collidables
    }
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, SceneError> {
        Ok(self.node(id)?.parent())
    }
    pub fn children(&self, id: NodeId) -> Result<&[NodeId], SceneError> {
        Ok(self.node(id)?.children())
    }
    /// Every node in tree order: each root, then its subtree depth-first, children in insertion
    /// order.
    pub fn iter_tree(&self) -> Vec<NodeId> {
        let mut rv = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            self.collect_subtree(*root, &mut rv);
        }
        rv
    }
    fn collect_subtree(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        if let Some(node) = self.nodes.get(id) {
            for child in &node.children {
                self.collect_subtree(*child, out);
            }
        }
    }

    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.nodes.get(id).and_then(TransformNode::parent);
        while let Some(next) = current {
            if next == ancestor {
                return true;
            }
            current = self.nodes.get(next).and_then(TransformNode::parent);
        }
        false
    }

    /// Moves `child` (and its subtree) under `new_parent`, or makes it a root.
    pub fn set_parent(
        &mut self,
        child: NodeId,
        new_parent: Option<NodeId>,
    ) -> Result<(), SceneError> {
        let old_parent = self.node(child)?.parent();
        if let Some(parent) = new_parent {
            self.node(parent)?;
            if parent == child {
                return Err(SceneError::SelfParent(child));
            }
            if self.is_ancestor(child, parent) {
                return Err(SceneError::CycleDetected { child, parent });
            }
        }
        if old_parent == new_parent {
            return Ok(());
        }
        self.detach(child);
        self.nodes[child].parent = new_parent;
        match new_parent {
            Some(parent) => self.nodes[parent].children.push(child),
            None => self.roots.push(child),
        }
        self.transforms_dirty = true;
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        match self.nodes.get(id).and_then(TransformNode::parent) {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(parent) {
                    parent.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
    }

    /// Stops `id` from ever being tested against `other`. One direction only.
    ///
    /// # Panics
    /// If `id` is not collidable.
    pub fn exclude(&mut self, id: NodeId, other: NodeId) -> Result<(), SceneError> {
        self.node(other)?;
        self.nodes
            .get_mut(id)
            .ok_or(SceneError::StaleNode(id))?
            .collider_mut()
            .exclude(other);
        Ok(())
    }
    /// [`exclude`](SceneGraph::exclude) in both directions.
    pub fn exclude_pair(&mut self, a: NodeId, b: NodeId) -> Result<(), SceneError> {
        self.exclude(a, b)?;
        self.exclude(b, a)
    }
    pub fn is_excluded(&self, id: NodeId, other: NodeId) -> bool {
        self.nodes
            .get(id)
            .and_then(TransformNode::try_collider)
            .is_some_and(|c| c.excludes(other))
    }

    /// Schedules `id` and its whole subtree for removal at the next
    /// [`flush_destroyed`](SceneGraph::flush_destroyed).
    pub fn queue_destroy(&mut self, id: NodeId) {
        if !self.pending_destroy.contains(&id) {
            self.pending_destroy.push(id);
        }
    }
    pub fn is_pending_destroy(&self, id: NodeId) -> bool {
        self.pending_destroy.contains(&id)
    }

    /// Removes every node queued for destruction, with its subtree. Removed nodes are detached
    /// from their parent, dropped from the collidable registry, and purged from every remaining
    /// exclusion set. Returns the removed ids in removal order.
    pub fn flush_destroyed(&mut self) -> Vec<NodeId> {
        let mut removed = Vec::new();
        for id in std::mem::take(&mut self.pending_destroy) {
            if !self.nodes.contains_key(id) {
                continue;
            }
            self.detach(id);
            let mut subtree = Vec::new();
            self.collect_subtree(id, &mut subtree);
            for id in subtree {
                if self.nodes.remove(id).is_some() {
                    removed.push(id);
                }
            }
        }
        if removed.is_empty() {
            return removed;
        }

        let removed_set: BTreeSet<NodeId> = removed.iter().copied().collect();
        self.collidables.retain(|id| !removed_set.contains(id));
        self.roots.retain(|id| !removed_set.contains(id));
        for id in &self.collidables {
            let collider = self.nodes[*id].collider_mut();
            for gone in &removed_set {
                collider.forget(*gone);
            }
        }
        info!("destroyed {} node(s)", removed.len());
        removed
    }

    pub fn is_dirty(&self) -> bool {
        self.transforms_dirty
    }

    /// Recomputes every world matrix top-down from the roots, rederiving collision geometry on
    /// the way. Returns the nodes whose geometry came out degenerate this pass.
    pub fn recalculate_all(&mut self) -> Vec<(NodeId, GeometryError)> {
        let mut degenerate = Vec::new();
        for i in 0..self.roots.len() {
            let root = self.roots[i];
            self.recalculate(root, None, &mut degenerate);
        }
        self.transforms_dirty = false;
        degenerate
    }

    fn recalculate(
        &mut self,
        id: NodeId,
        parent_world: Option<Mat3x3>,
        degenerate: &mut Vec<(NodeId, GeometryError)>,
    ) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if let Err(e) = node.recalculate_world(parent_world.as_ref()) {
            degenerate.push((id, e));
        }
        let world = node.world_matrix();
        for i in 0..self.nodes[id].children.len() {
            let child = self.nodes[id].children[i];
            self.recalculate(child, Some(world), degenerate);
        }
    }

    /// The collision box of `id` as of the last transform pass.
    ///
    /// # Panics
    /// If `id` is stale or not collidable, or if local state changed since the last
    /// [`recalculate_all`](SceneGraph::recalculate_all).
    pub fn geometry(&self, id: NodeId) -> Result<&Obb, GeometryError> {
        check_false!(self.transforms_dirty);
        self.nodes
            .get(id)
            .unwrap_or_else(|| panic!("geometry of stale node {id:?}"))
            .collider()
            .geometry()
    }
    pub fn vertices(&self, id: NodeId) -> Result<[Vec2; 4], GeometryError> {
        let obb = self.geometry(id)?;
        Ok([obb.vertex(0), obb.vertex(1), obb.vertex(2), obb.vertex(3)])
    }
    pub fn encompassing_radius(&self, id: NodeId) -> Result<f32, GeometryError> {
        Ok(self.geometry(id)?.radius())
    }

    pub(crate) fn set_made_contact(&mut self, id: NodeId, made_contact: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.collider_mut().set_made_contact(made_contact);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn square(x: f32, y: f32) -> TransformNode {
        TransformNode::new()
            .with_sprite_size(Vec2::splat(40.0))
            .with_centred_origin()
            .with_position(Vec2 { x, y })
            .collidable()
    }

    #[test]
    fn identity_child_inherits_parent_world() {
        let mut scene = SceneGraph::new();
        let parent = scene
            .add(
                TransformNode::new()
                    .with_position(Vec2 { x: 3.0, y: 4.0 })
                    .with_rotation(0.7)
                    .with_scale(Vec2 { x: 2.0, y: 3.0 }),
                None,
            )
            .unwrap();
        let child = scene.add(TransformNode::new(), Some(parent)).unwrap();
        scene.recalculate_all();
        let parent_world = scene.node(parent).unwrap().world_matrix();
        assert!(scene
            .node(child)
            .unwrap()
            .world_matrix()
            .almost_eq(parent_world));
    }

    #[test]
    fn child_world_composes_local_then_parent() {
        let mut scene = SceneGraph::new();
        let parent = scene
            .add(
                TransformNode::new()
                    .with_position(Vec2 { x: 100.0, y: 0.0 })
                    .with_rotation(FRAC_PI_2),
                None,
            )
            .unwrap();
        let child = scene
            .add(
                TransformNode::new().with_position(Vec2 { x: 0.0, y: 10.0 }),
                Some(parent),
            )
            .unwrap();
        scene.recalculate_all();
        let child = scene.node(child).unwrap();
        assert_eq!(child.world_position(), Vec2 { x: 110.0, y: 0.0 });
        assert!((child.world_rotation() - FRAC_PI_2).abs() < EPSILON);
    }

    #[test]
    fn recalculate_is_idempotent() {
        let mut scene = SceneGraph::new();
        let root = scene.add(TransformNode::new().with_rotation(0.3), None).unwrap();
        let a = scene.add(square(10.0, 5.0).with_rotation(1.1), Some(root)).unwrap();
        scene.recalculate_all();
        let world = scene.node(a).unwrap().world_matrix();
        let vertices = scene.vertices(a).unwrap();
        scene.recalculate_all();
        assert_eq!(scene.node(a).unwrap().world_matrix(), world);
        assert_eq!(scene.vertices(a).unwrap(), vertices);
    }

    #[test]
    fn radius_grows_with_local_scale() {
        let mut scene = SceneGraph::new();
        let a = scene.add(square(0.0, 0.0), None).unwrap();
        scene.recalculate_all();
        let before = scene.encompassing_radius(a).unwrap();
        scene.node_mut(a).unwrap().set_scale(Vec2::splat(1.5));
        scene.recalculate_all();
        assert!(scene.encompassing_radius(a).unwrap() > before);
    }

    #[test]
    fn child_radius_ignores_parent_scale() {
        let mut scene = SceneGraph::new();
        let parent = scene
            .add(TransformNode::new().with_scale(Vec2::splat(4.0)), None)
            .unwrap();
        let child = scene.add(square(0.0, 0.0), Some(parent)).unwrap();
        let orphan = scene.add(square(0.0, 0.0), None).unwrap();
        scene.recalculate_all();
        assert!(
            (scene.encompassing_radius(child).unwrap()
                - scene.encompassing_radius(orphan).unwrap())
            .abs()
                < EPSILON
        );
    }

    #[test]
    fn set_parent_rejects_cycles() {
        let mut scene = SceneGraph::new();
        let a = scene.add(TransformNode::new(), None).unwrap();
        let b = scene.add(TransformNode::new(), Some(a)).unwrap();
        let c = scene.add(TransformNode::new(), Some(b)).unwrap();
        assert_eq!(
            scene.set_parent(a, Some(c)),
            Err(SceneError::CycleDetected {
                child: a,
                parent: c
            })
        );
        assert_eq!(scene.set_parent(b, Some(b)), Err(SceneError::SelfParent(b)));
        assert_eq!(scene.parent(a).unwrap(), None);

        scene.set_parent(c, None).unwrap();
        assert_eq!(scene.roots(), &[a, c]);
        assert!(scene.children(b).unwrap().is_empty());
        scene.set_parent(a, Some(c)).unwrap();
        assert_eq!(scene.roots(), &[c]);
        assert_eq!(scene.iter_tree(), vec![c, a, b]);
    }

    #[test]
    fn destroy_is_deferred_and_removes_subtree() {
        let mut scene = SceneGraph::new();
        let root = scene.add(TransformNode::new(), None).unwrap();
        let body = scene.add(square(0.0, 0.0), Some(root)).unwrap();
        let barrel = scene.add(square(0.0, 0.0), Some(body)).unwrap();
        let other = scene.add(square(5.0, 0.0), Some(root)).unwrap();
        scene.exclude_pair(body, other).unwrap();
        scene.exclude(other, barrel).unwrap();

        scene.queue_destroy(body);
        assert!(scene.contains(body));
        assert_eq!(scene.collidables().len(), 3);

        let removed = scene.flush_destroyed();
        assert_eq!(removed, vec![body, barrel]);
        assert!(!scene.contains(body));
        assert!(!scene.contains(barrel));
        assert_eq!(scene.children(root).unwrap(), &[other]);
        assert_eq!(scene.collidables(), &[other]);
        assert!(scene.node(other).unwrap().collider().excluded().is_empty());
        assert_eq!(scene.node(body).err(), Some(SceneError::StaleNode(body)));
        assert!(scene.flush_destroyed().is_empty());
    }

    #[test]
    fn exclusion_is_one_directional() {
        let mut scene = SceneGraph::new();
        let a = scene.add(square(0.0, 0.0), None).unwrap();
        let b = scene.add(square(0.0, 0.0), None).unwrap();
        scene.exclude(a, b).unwrap();
        assert!(scene.is_excluded(a, b));
        assert!(!scene.is_excluded(b, a));
    }

    #[test]
    fn degenerate_geometry_is_reported() {
        let mut scene = SceneGraph::new();
        let a = scene.add(square(0.0, 0.0), None).unwrap();
        scene.node_mut(a).unwrap().set_scale(Vec2 { x: 1.0, y: 0.0 });
        let degenerate = scene.recalculate_all();
        assert_eq!(degenerate, vec![(a, GeometryError::ZeroLengthVector)]);
        assert!(scene.geometry(a).is_err());
    }

    #[test]
    #[should_panic(expected = "check failed")]
    fn geometry_while_dirty_panics() {
        let mut scene = SceneGraph::new();
        let a = scene.add(square(0.0, 0.0), None).unwrap();
        scene.node_mut(a).unwrap().translate(Vec2::one());
        let _ = scene.geometry(a);
    }

    #[test]
    #[should_panic(expected = "node has no collider")]
    fn geometry_of_plain_node_panics() {
        let mut scene = SceneGraph::new();
        let a = scene.add(TransformNode::new(), None).unwrap();
        scene.recalculate_all();
        let _ = scene.geometry(a);
    }
}
