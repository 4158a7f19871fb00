use crate::core::prelude::*;

use crate::core::NodeId;
use crate::resource::Texture;
use crate::util::collision::Obb;
use crate::util::linalg::{normalize_angle, GeometryError};
use std::collections::BTreeSet;

/// Collision state carried by collidable nodes.
#[derive(Clone, Debug)]
pub struct Collider {
    excluded: BTreeSet<NodeId>,
    geometry: Result<Obb, GeometryError>,
    made_contact: bool,
}

impl Collider {
    fn new() -> Self {
        Self {
            excluded: BTreeSet::new(),
            geometry: Err(GeometryError::ZeroLengthVector),
            made_contact: false,
        }
    }

    /// The box derived by the last transform pass, or why it could not be derived.
    pub fn geometry(&self) -> Result<&Obb, GeometryError> {
        self.geometry.as_ref().map_err(|e| *e)
    }
    pub fn excluded(&self) -> &BTreeSet<NodeId> {
        &self.excluded
    }
    pub fn excludes(&self, other: NodeId) -> bool {
        self.excluded.contains(&other)
    }
    pub fn made_contact(&self) -> bool {
        self.made_contact
    }
    pub fn collision_box_colour(&self) -> Colour {
        if self.made_contact {
            Colour::red()
        } else {
            Colour::green()
        }
    }

    pub(crate) fn exclude(&mut self, other: NodeId) {
        self.excluded.insert(other);
    }
    pub(crate) fn forget(&mut self, other: NodeId) -> bool {
        self.excluded.remove(&other)
    }
    pub(crate) fn set_made_contact(&mut self, made_contact: bool) {
        self.made_contact = made_contact;
    }
}

/// A node in the transform tree.
///
/// Scale, rotation and position are authoritative; the local matrix is rebuilt from them on
/// every change as `scale * rotation * translation`. The world matrix and collision geometry are
/// derived state, refreshed by [`SceneGraph::recalculate_all`](crate::core::scene::SceneGraph).
#[derive(Clone, Debug)]
pub struct TransformNode {
    scale: Vec2,
    rotation: f32,
    position: Vec2,
    local: Mat3x3,
    world: Mat3x3,

    origin: Vec2,
    sprite_size: Vec2,
    texture: Option<Texture>,
    tint: Colour,

    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    collider: Option<Collider>,
}

impl Default for TransformNode {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformNode {
    pub fn new() -> Self {
        Self {
            scale: Vec2::one(),
            rotation: 0.0,
            position: Vec2::zero(),
            local: Mat3x3::one(),
            world: Mat3x3::one(),
            origin: Vec2::zero(),
            sprite_size: Vec2::zero(),
            texture: None,
            tint: Colour::white(),
            parent: None,
            children: Vec::new(),
            collider: None,
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.set_position(position);
        self
    }
    #[must_use]
    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.set_rotation(radians);
        self
    }
    #[must_use]
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.set_scale(scale);
        self
    }
    /// Sets the pivot in unscaled sprite pixels, measured from the top-left corner.
    #[must_use]
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }
    /// Places the pivot at the centre of the sprite.
    #[must_use]
    pub fn with_centred_origin(mut self) -> Self {
        self.origin = self.sprite_size / 2.0;
        self
    }
    /// Uses `texture` for drawing, and its extent as the sprite size.
    #[must_use]
    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self.sprite_size = texture.extent();
        self
    }
    #[must_use]
    pub fn with_sprite_size(mut self, sprite_size: Vec2) -> Self {
        self.sprite_size = sprite_size;
        self
    }
    #[must_use]
    pub fn with_tint(mut self, tint: Colour) -> Self {
        self.tint = tint;
        self
    }
    #[must_use]
    pub fn collidable(mut self) -> Self {
        self.collider = Some(Collider::new());
        self
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }
    /// Local rotation in radians, in (-π, π].
    pub fn rotation(&self) -> f32 {
        self.rotation
    }
    pub fn scale(&self) -> Vec2 {
        self.scale
    }
    pub fn origin(&self) -> Vec2 {
        self.origin
    }
    /// The pivot in scaled pixels, as a renderer needs it.
    pub fn scaled_origin(&self) -> Vec2 {
        self.origin.component_wise(self.scale)
    }
    pub fn sprite_size(&self) -> Vec2 {
        self.sprite_size
    }
    pub fn texture(&self) -> Option<Texture> {
        self.texture
    }
    pub fn tint(&self) -> Colour {
        self.tint
    }
    pub fn local_matrix(&self) -> Mat3x3 {
        self.local
    }
    pub fn world_matrix(&self) -> Mat3x3 {
        self.world
    }
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_collidable(&self) -> bool {
        self.collider.is_some()
    }
    pub fn try_collider(&self) -> Option<&Collider> {
        self.collider.as_ref()
    }
    /// # Panics
    /// If the node was not built with [`collidable`](TransformNode::collidable).
    pub fn collider(&self) -> &Collider {
        self.collider
            .as_ref()
            .unwrap_or_else(|| panic!("node has no collider"))
    }
    pub(crate) fn collider_mut(&mut self) -> &mut Collider {
        self.collider
            .as_mut()
            .unwrap_or_else(|| panic!("node has no collider"))
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.recompute_local();
    }
    pub fn translate(&mut self, delta: Vec2) {
        self.set_position(self.position + delta);
    }
    /// Moves along the node's own rotated axes: `(0, 1)` is "forwards".
    pub fn relative_translate(&mut self, delta: Vec2) {
        self.translate(delta.rotated(self.rotation));
    }
    pub fn set_rotation(&mut self, radians: f32) {
        self.rotation = normalize_angle(radians);
        self.recompute_local();
    }
    pub fn rotate_by(&mut self, radians: f32) {
        self.set_rotation(self.rotation + radians);
    }
    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
        self.recompute_local();
    }
    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }
    pub fn set_tint(&mut self, tint: Colour) {
        self.tint = tint;
    }

    pub fn world_position(&self) -> Vec2 {
        self.world.translation_part()
    }
    pub fn world_rotation(&self) -> f32 {
        self.world.world_rotation()
    }
    /// Brings a world-space point into this node's local frame.
    pub fn world_to_local(&self, point: Vec2) -> Result<Vec2, GeometryError> {
        Ok(point * self.world.inverse()?)
    }

    fn recompute_local(&mut self) {
        self.local = Mat3x3::scale_vec2(self.scale)
            * Mat3x3::rotation(self.rotation)
            * Mat3x3::translation_vec2(self.position);
    }

    /// Composes the world matrix from the parent's and, if collidable, rederives the box.
    pub(crate) fn recalculate_world(
        &mut self,
        parent_world: Option<&Mat3x3>,
    ) -> Result<(), GeometryError> {
        self.world = match parent_world {
            None => self.local,
            Some(parent_world) => self.local * *parent_world,
        };
        let (world, sprite_size, origin, scale) =
            (self.world, self.sprite_size, self.origin, self.scale);
        if let Some(collider) = self.collider.as_mut() {
            collider.geometry = Obb::from_world(&world, sprite_size, origin, scale);
            collider.geometry.map(|_| ())
        } else if world.is_finite() {
            Ok(())
        } else {
            Err(GeometryError::SingularMatrix { det: world.det() })
        }
    }
}
