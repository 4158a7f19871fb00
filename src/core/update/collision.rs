use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Formatter};

use crate::core::prelude::*;
use crate::util::{
    collision::{resolve_contact, Contact, ContactSide, Polygonal},
    UnorderedPair,
};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CollisionResponse {
    Continue,
    Done,
}

/// A confirmed intersection between two collidable nodes, with its estimated contact.
///
/// `contact` was resolved with `a` as the first box and `b` as the second. `a` always found the
/// pair through its own candidates; `b` did too unless it excludes `a`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollisionPair {
    pub a: NodeId,
    pub b: NodeId,
    pub contact: Contact,
    /// Whether `b` is told about the collision as well.
    pub mutual: bool,
}

impl CollisionPair {
    pub fn ids(&self) -> UnorderedPair<NodeId> {
        UnorderedPair::new(self.a, self.b)
    }

    /// The nodes that found this collision themselves.
    pub fn participants(&self) -> impl Iterator<Item = NodeId> {
        [self.a, self.b].into_iter().take(if self.mutual { 2 } else { 1 })
    }

    /// The collision as seen by `a`, then (if mutual) as seen by `b`.
    pub(crate) fn notifications(&self) -> impl Iterator<Item = (NodeId, Collision)> {
        [
            (
                self.a,
                Collision {
                    other: self.b,
                    contact: self.contact,
                    side: ContactSide::First,
                },
            ),
            (
                self.b,
                Collision {
                    other: self.a,
                    contact: self.contact,
                    side: ContactSide::Second,
                },
            ),
        ]
        .into_iter()
        .take(if self.mutual { 2 } else { 1 })
    }
}

/// What a behaviour is told about one of its collisions.
#[derive(Copy, Clone, PartialEq)]
pub struct Collision {
    pub other: NodeId,
    pub contact: Contact,
    /// Which side of `contact` the receiving node is.
    pub side: ContactSide,
}

impl Collision {
    /// Translation moving the receiver fully out of `other`.
    pub fn mtv(&self) -> Vec2 {
        self.contact.separation_for(self.side)
    }
    /// Unit normal of the contacted edge, pointing away from `other`.
    pub fn normal(&self) -> Vec2 {
        let normal = self.contact.normal();
        if self.side == self.contact.point_owner() {
            normal
        } else {
            -normal
        }
    }
    pub fn reflect(&self, velocity: Vec2) -> Vec2 {
        self.contact.reflect(velocity)
    }
}

impl Debug for Collision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:?} at {}, mtv={})",
            self.other,
            self.contact.point,
            self.mtv()
        )
    }
}

/// Broad phase, narrow phase and contact resolution over a [`SceneGraph`].
///
/// Nothing is cached across frames: candidates are rebuilt from the scene on every query. Within
/// one call to [`detect`](CollisionHandler::detect), each unordered pair is tested by SAT at most
/// once.
#[derive(Default)]
pub struct CollisionHandler {
    sat_results: BTreeMap<UnorderedPair<NodeId>, bool>,
    last_contacts: Vec<Contact>,
}

impl CollisionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Other collidable nodes whose encompassing circles overlap that of `id`, skipping the
    /// partners `id` excludes and any node without valid geometry this frame.
    ///
    /// # Panics
    /// If `id` is not collidable, or the scene has un-propagated transform mutations.
    pub fn find_candidates(&self, scene: &SceneGraph, id: NodeId) -> Vec<NodeId> {
        let Ok(this) = scene.geometry(id) else {
            return Vec::new();
        };
        let collider = scene
            .node(id)
            .unwrap_or_else(|e| panic!("find_candidates(): {e}"))
            .collider();
        scene
            .collidables()
            .iter()
            .copied()
            .filter(|other| *other != id && !collider.excludes(*other))
            .filter(|other| {
                scene
                    .geometry(*other)
                    .is_ok_and(|other| this.circles_overlap(other))
            })
            .collect()
    }

    /// Exact OBB/OBB test. Boxes that only touch do not intersect; degenerate boxes intersect
    /// nothing.
    pub fn intersects(scene: &SceneGraph, a: NodeId, b: NodeId) -> bool {
        match (scene.geometry(a), scene.geometry(b)) {
            (Ok(a), Ok(b)) => a.intersects(b),
            _ => false,
        }
    }

    pub fn resolve(scene: &SceneGraph, a: NodeId, b: NodeId) -> Option<Contact> {
        let (Ok(a), Ok(b)) = (scene.geometry(a), scene.geometry(b)) else {
            return None;
        };
        resolve_contact(a, b)
    }

    fn intersects_cached(&mut self, scene: &SceneGraph, a: NodeId, b: NodeId) -> bool {
        *self
            .sat_results
            .entry(UnorderedPair::new(a, b))
            .or_insert_with(|| Self::intersects(scene, a, b))
    }

    /// Runs the broad and narrow phases for every collidable node, in registry order, and
    /// resolves a contact for every confirmed pair. Refreshes each node's `made_contact` flag.
    ///
    /// A pair is reported once, ordered as first found: `a` is the node whose candidate list
    /// produced it. A node that excludes its partner is neither notified nor flagged.
    pub fn detect(&mut self, scene: &mut SceneGraph) -> Vec<CollisionPair> {
        self.sat_results.clear();
        self.last_contacts.clear();

        let mut seen = BTreeSet::new();
        let mut rv = Vec::new();
        for id in scene.collidables().to_vec() {
            if let Err(e) = scene.geometry(id) {
                crate::warn_every_seconds!(1, "skipping collisions for {id:?}: {e}");
                continue;
            }
            for other in self.find_candidates(scene, id) {
                let ids = UnorderedPair::new(id, other);
                if seen.contains(&ids) || !self.intersects_cached(scene, id, other) {
                    continue;
                }
                seen.insert(ids);
                match Self::resolve(scene, id, other) {
                    Some(contact) => {
                        let mutual = scene
                            .node(other)
                            .is_ok_and(|node| !node.collider().excludes(id));
                        self.last_contacts.push(contact);
                        rv.push(CollisionPair {
                            a: id,
                            b: other,
                            contact,
                            mutual,
                        });
                    }
                    None => warn!("{id:?} intersects {other:?} but no contact edge resolved"),
                }
            }
        }

        let touched = rv
            .iter()
            .flat_map(CollisionPair::participants)
            .collect::<BTreeSet<_>>();
        for id in scene.collidables().to_vec() {
            scene.set_made_contact(id, touched.contains(&id));
        }
        rv
    }

    /// Contacts resolved by the last [`detect`](CollisionHandler::detect), for debug drawing.
    pub fn last_contacts(&self) -> &[Contact] {
        &self.last_contacts
    }
}
