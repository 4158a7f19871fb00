pub mod collision;

use std::collections::{BTreeMap, BTreeSet};

use collision::{Collision, CollisionHandler, CollisionPair, CollisionResponse};
use crate::{
    core::{
        audio::AudioSink,
        input::InputHandler,
        prelude::*,
        render::RenderBackend,
        scene::{SceneError, SceneGraph},
    },
    util::linalg::GeometryError,
};

/// Behaviour attached to a scene node.
///
/// `on_update` runs once per frame before transforms are propagated, so it may freely mutate
/// local state. `on_collision` runs after detection, once per confirmed collision involving this
/// node, until it returns [`CollisionResponse::Done`]. Any position corrections it makes take
/// effect at the next propagation pass.
pub trait SceneObject: Sized {
    fn on_update(&mut self, delta: f32, ctx: &mut UpdateContext<'_, Self>);

    /// `other` is the behaviour of the other node, if it has one.
    fn on_collision(
        &mut self,
        _ctx: &mut UpdateContext<'_, Self>,
        _collision: &Collision,
        _other: Option<&Self>,
    ) -> CollisionResponse {
        CollisionResponse::Continue
    }
}

/// What happened during one call to [`UpdateHandler::update`].
#[derive(Clone, Debug, Default)]
pub struct FrameReport {
    /// The timestep actually simulated, after clamping.
    pub delta: f32,
    pub collisions: Vec<CollisionPair>,
    pub destroyed: Vec<NodeId>,
    /// Nodes whose geometry could not be derived this frame, and so took no part in collision.
    pub degenerate: Vec<(NodeId, GeometryError)>,
}

/// Owns the scene and the behaviours attached to its nodes, and runs the per-frame pipeline:
/// behaviour updates, transform propagation, collision detection, collision response, then
/// deferred structural changes.
pub struct UpdateHandler<B: SceneObject> {
    scene: SceneGraph,
    objects: BTreeMap<NodeId, B>,
    collision_handler: CollisionHandler,
    config: ArenaConfig,
    frame: u64,
}

impl<B: SceneObject> UpdateHandler<B> {
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            scene: SceneGraph::new(),
            objects: BTreeMap::new(),
            collision_handler: CollisionHandler::new(),
            config,
            frame: 0,
        }
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }
    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Adds a node with no behaviour.
    pub fn add_node(
        &mut self,
        node: TransformNode,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError> {
        self.scene.add(node, parent)
    }
    /// Adds a node and attaches `object` to it.
    pub fn add_object(
        &mut self,
        node: TransformNode,
        parent: Option<NodeId>,
        object: B,
    ) -> Result<NodeId, SceneError> {
        let id = self.scene.add(node, parent)?;
        self.objects.insert(id, object);
        Ok(id)
    }

    pub fn object(&self, id: NodeId) -> Option<&B> {
        self.objects.get(&id)
    }
    pub fn object_mut(&mut self, id: NodeId) -> Option<&mut B> {
        self.objects.get_mut(&id)
    }
    pub fn objects(&self) -> impl Iterator<Item = (NodeId, &B)> {
        self.objects.iter().map(|(id, obj)| (*id, obj))
    }

    /// Advances the simulation by `delta` seconds, clamped to [`MAX_TIMESTEP_S`].
    pub fn update(
        &mut self,
        delta: f32,
        input: &InputHandler,
        audio: &mut dyn AudioSink,
    ) -> FrameReport {
        let delta = if delta.is_finite() {
            delta.clamp(0., MAX_TIMESTEP_S)
        } else {
            warn!("non-finite timestep: {delta}");
            0.
        };
        if delta == MAX_TIMESTEP_S {
            crate::warn_every_seconds!(5, "frame {}: timestep clamped", self.frame);
        }
        let mut pending_add = Vec::new();

        self.call_on_update(delta, input, audio, &mut pending_add);

        let degenerate = self.scene.recalculate_all();
        for (id, e) in &degenerate {
            crate::warn_every_seconds!(1, "{id:?}: degenerate geometry, skipping physics: {e}");
        }

        let collisions = self.collision_handler.detect(&mut self.scene);
        self.handle_collisions(&collisions, input, audio, &mut pending_add);

        let destroyed = self.scene.flush_destroyed();
        for id in &destroyed {
            self.objects.remove(id);
        }
        for (id, object) in pending_add {
            if self.scene.contains(id) {
                self.objects.insert(id, object);
            }
        }

        self.frame += 1;
        crate::info_every_seconds!(
            5,
            "frame {}: {} nodes, {} collisions",
            self.frame,
            self.scene.len(),
            collisions.len()
        );
        FrameReport {
            delta,
            collisions,
            destroyed,
            degenerate,
        }
    }

    fn call_on_update(
        &mut self,
        delta: f32,
        input: &InputHandler,
        audio: &mut dyn AudioSink,
        pending_add: &mut Vec<(NodeId, B)>,
    ) {
        for id in self.objects.keys().copied().collect_vec() {
            let Some(mut this) = self.objects.remove(&id) else {
                continue;
            };
            let mut ctx = UpdateContext {
                this: id,
                scene: &mut self.scene,
                input,
                audio: &mut *audio,
                config: &self.config,
                pending_add: &mut *pending_add,
            };
            this.on_update(delta, &mut ctx);
            self.objects.insert(id, this);
        }
    }

    fn handle_collisions(
        &mut self,
        collisions: &[CollisionPair],
        input: &InputHandler,
        audio: &mut dyn AudioSink,
        pending_add: &mut Vec<(NodeId, B)>,
    ) {
        let mut done_with_collisions = BTreeSet::new();
        for (this_id, collision) in collisions.iter().flat_map(CollisionPair::notifications) {
            if done_with_collisions.contains(&this_id) {
                continue;
            }
            let Some(mut this) = self.objects.remove(&this_id) else {
                continue;
            };
            let other = self.objects.get(&collision.other);
            let mut ctx = UpdateContext {
                this: this_id,
                scene: &mut self.scene,
                input,
                audio: &mut *audio,
                config: &self.config,
                pending_add: &mut *pending_add,
            };
            match this.on_collision(&mut ctx, &collision, other) {
                CollisionResponse::Continue => {}
                CollisionResponse::Done => {
                    done_with_collisions.insert(this_id);
                }
            }
            self.objects.insert(this_id, this);
        }
    }

    /// Draws every textured node in tree order. With `debug`, also draws each collision box in
    /// its collision-box colour, its encompassing circle, and the contact edges found this frame.
    pub fn render(&self, renderer: &mut dyn RenderBackend, debug: bool) {
        for id in self.scene.iter_tree() {
            let Ok(node) = self.scene.node(id) else {
                continue;
            };
            if let Some(texture) = node.texture() {
                renderer.draw_sprite(
                    texture,
                    &node.world_matrix(),
                    node.sprite_size().component_wise(node.scale()),
                    node.scaled_origin(),
                    node.tint(),
                );
            }
            if !debug {
                continue;
            }
            if let Some(collider) = node.try_collider() {
                if let Ok(obb) = collider.geometry() {
                    renderer.draw_obb(obb, collider.collision_box_colour());
                    renderer.draw_circle(obb.centre(), obb.radius(), Colour::blue());
                }
            }
        }
        if debug {
            for contact in self.collision_handler.last_contacts() {
                renderer.draw_line(contact.edge.0, contact.edge.1, Colour::yellow());
            }
        }
    }
}

/// Everything a behaviour may touch while it runs.
///
/// Nodes added through the context exist in the scene immediately; their behaviours join the
/// update loop from the next frame. Destruction is always deferred to the end of the frame.
pub struct UpdateContext<'a, B> {
    this: NodeId,
    scene: &'a mut SceneGraph,
    input: &'a InputHandler,
    audio: &'a mut dyn AudioSink,
    config: &'a ArenaConfig,
    pending_add: &'a mut Vec<(NodeId, B)>,
}

impl<'a, B> UpdateContext<'a, B> {
    pub fn this_id(&self) -> NodeId {
        self.this
    }
    pub fn this(&self) -> Result<&TransformNode, SceneError> {
        self.scene.node(self.this)
    }
    pub fn this_mut(&mut self) -> Result<&mut TransformNode, SceneError> {
        self.scene.node_mut(self.this)
    }

    pub fn scene(&self) -> &SceneGraph {
        &*self.scene
    }
    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut *self.scene
    }
    pub fn input(&self) -> &InputHandler {
        self.input
    }
    pub fn audio(&mut self) -> &mut dyn AudioSink {
        &mut *self.audio
    }
    pub fn config(&self) -> &ArenaConfig {
        self.config
    }

    pub fn add(
        &mut self,
        node: TransformNode,
        parent: Option<NodeId>,
        object: B,
    ) -> Result<NodeId, SceneError> {
        let id = self.scene.add(node, parent)?;
        self.pending_add.push((id, object));
        Ok(id)
    }
    pub fn destroy(&mut self, id: NodeId) {
        self.scene.queue_destroy(id);
    }
    pub fn destroy_this(&mut self) {
        self.scene.queue_destroy(self.this);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audio::RecordingAudio;
    use crate::core::render::RecordingRenderer;
    use crate::resource::ResourceHandler;

    #[derive(Debug)]
    enum TestObject {
        Mover { velocity: Vec2, hits: usize },
        Wall,
        Spawner { spawned: bool },
        Counter { updates: usize },
    }

    impl SceneObject for TestObject {
        fn on_update(&mut self, delta: f32, ctx: &mut UpdateContext<'_, Self>) {
            match self {
                TestObject::Mover { velocity, .. } => {
                    let velocity = *velocity;
                    ctx.this_mut().unwrap().translate(velocity * delta);
                }
                TestObject::Spawner { spawned } if !*spawned => {
                    *spawned = true;
                    ctx.add(
                        TransformNode::new(),
                        None,
                        TestObject::Counter { updates: 0 },
                    )
                    .unwrap();
                }
                TestObject::Counter { updates } => *updates += 1,
                _ => {}
            }
        }

        fn on_collision(
            &mut self,
            ctx: &mut UpdateContext<'_, Self>,
            collision: &Collision,
            other: Option<&Self>,
        ) -> CollisionResponse {
            if let TestObject::Mover { velocity, hits } = self {
                if matches!(other, Some(TestObject::Wall)) {
                    *hits += 1;
                    *velocity = collision.reflect(*velocity);
                    let mtv = collision.mtv();
                    ctx.this_mut().unwrap().translate(mtv);
                    if *hits >= 2 {
                        ctx.destroy_this();
                    }
                    return CollisionResponse::Done;
                }
            }
            CollisionResponse::Continue
        }
    }

    fn square(x: f32) -> TransformNode {
        TransformNode::new()
            .with_sprite_size(Vec2::splat(40.0))
            .with_centred_origin()
            .with_position(Vec2 { x, y: 0.0 })
            .collidable()
    }

    #[test]
    fn timestep_is_clamped() {
        let mut handler = UpdateHandler::<TestObject>::new(ArenaConfig::default());
        let input = InputHandler::new();
        let mut audio = RecordingAudio::new();
        assert_eq!(handler.update(1.0, &input, &mut audio).delta, MAX_TIMESTEP_S);
        assert_eq!(handler.update(-1.0, &input, &mut audio).delta, 0.0);
        assert_eq!(
            handler
                .update(DEFAULT_TIMESTEP_S, &input, &mut audio)
                .delta,
            DEFAULT_TIMESTEP_S
        );
        assert_eq!(handler.update(f32::NAN, &input, &mut audio).delta, 0.0);
        assert_eq!(handler.frame(), 4);
    }

    #[test]
    fn mover_bounces_off_wall_then_is_destroyed() {
        let mut handler = UpdateHandler::new(ArenaConfig::default());
        let input = InputHandler::new();
        let mut audio = RecordingAudio::new();
        let wall = handler.add_object(square(0.0), None, TestObject::Wall).unwrap();
        let mover = handler
            .add_object(
                square(45.0),
                None,
                TestObject::Mover {
                    velocity: Vec2 { x: -60.0, y: 0.0 },
                    hits: 0,
                },
            )
            .unwrap();

        // 45 - 60 * 0.1 = 39: overlapping the wall's right edge by 1.
        let report = handler.update(0.1, &input, &mut audio);
        assert_eq!(report.collisions.len(), 1);
        assert!(report.collisions[0].ids().contains(wall));
        let Some(TestObject::Mover { velocity, hits }) = handler.object(mover) else {
            panic!("mover missing");
        };
        assert_eq!(*hits, 1);
        assert_eq!(*velocity, Vec2 { x: 60.0, y: 0.0 });
        assert_eq!(
            handler.scene().node(mover).unwrap().position(),
            Vec2 { x: 40.0, y: 0.0 }
        );
        assert!(handler.scene().node(wall).unwrap().collider().made_contact());

        // Moving away: no collision, flag clears.
        let report = handler.update(0.1, &input, &mut audio);
        assert!(report.collisions.is_empty());
        assert!(!handler.scene().node(wall).unwrap().collider().made_contact());

        // Turn it round so it hits again; the second hit destroys it at the end of the frame.
        if let Some(TestObject::Mover { velocity, .. }) = handler.object_mut(mover) {
            *velocity = Vec2 { x: -100.0, y: 0.0 };
        }
        let report = handler.update(0.1, &input, &mut audio);
        assert_eq!(report.collisions.len(), 1);
        assert_eq!(report.destroyed, vec![mover]);
        assert!(handler.object(mover).is_none());
        assert!(!handler.scene().contains(mover));
        assert_eq!(handler.scene().collidables(), &[wall]);
    }

    #[test]
    fn mover_passes_through_wall_it_excludes() {
        let mut handler = UpdateHandler::new(ArenaConfig::default());
        let input = InputHandler::new();
        let mut audio = RecordingAudio::new();
        let wall = handler.add_object(square(0.0), None, TestObject::Wall).unwrap();
        let mover = handler
            .add_object(
                square(45.0),
                None,
                TestObject::Mover {
                    velocity: Vec2 { x: -60.0, y: 0.0 },
                    hits: 0,
                },
            )
            .unwrap();
        handler.scene_mut().exclude(mover, wall).unwrap();

        // The wall still sees the overlap; the mover is not told about it.
        let report = handler.update(0.1, &input, &mut audio);
        assert_eq!(report.collisions.len(), 1);
        assert_eq!((report.collisions[0].a, report.collisions[0].b), (wall, mover));
        let Some(TestObject::Mover { velocity, hits }) = handler.object(mover) else {
            panic!("mover missing");
        };
        assert_eq!(*hits, 0);
        assert_eq!(*velocity, Vec2 { x: -60.0, y: 0.0 });
        assert_eq!(
            handler.scene().node(mover).unwrap().position(),
            Vec2 { x: 39.0, y: 0.0 }
        );
        assert!(!handler.scene().node(mover).unwrap().collider().made_contact());
        assert!(handler.scene().node(wall).unwrap().collider().made_contact());
    }

    #[test]
    fn spawned_objects_join_next_frame() {
        let mut handler = UpdateHandler::new(ArenaConfig::default());
        let input = InputHandler::new();
        let mut audio = RecordingAudio::new();
        handler
            .add_object(
                TransformNode::new(),
                None,
                TestObject::Spawner { spawned: false },
            )
            .unwrap();
        handler.update(0.01, &input, &mut audio);
        assert_eq!(handler.scene().len(), 2);
        let (counter, _) = handler
            .objects()
            .find(|(_, obj)| matches!(obj, TestObject::Counter { .. }))
            .unwrap();
        assert!(matches!(
            handler.object(counter),
            Some(TestObject::Counter { updates: 0 })
        ));
        handler.update(0.01, &input, &mut audio);
        assert!(matches!(
            handler.object(counter),
            Some(TestObject::Counter { updates: 1 })
        ));
    }

    #[test]
    fn render_draws_sprites_and_debug_geometry() {
        let mut resources = ResourceHandler::new();
        let texture = resources
            .register_texture("crateWood.png", Vec2::splat(40.0))
            .unwrap();
        let mut handler = UpdateHandler::new(ArenaConfig::default());
        let input = InputHandler::new();
        let mut audio = RecordingAudio::new();
        handler
            .add_object(square(0.0).with_texture(texture), None, TestObject::Wall)
            .unwrap();
        handler
            .add_object(square(30.0), None, TestObject::Wall)
            .unwrap();
        handler.add_node(square(500.0), None).unwrap();
        handler.update(0.01, &input, &mut audio);

        let mut renderer = RecordingRenderer::new();
        handler.render(&mut renderer, false);
        assert_eq!(renderer.sprite_count(), 1);
        assert_eq!(renderer.commands().len(), 1);

        let mut renderer = RecordingRenderer::new();
        handler.render(&mut renderer, true);
        assert_eq!(renderer.sprite_count(), 1);
        assert_eq!(renderer.lines_with(Colour::red()), 8);
        assert_eq!(renderer.lines_with(Colour::green()), 4);
        assert_eq!(renderer.lines_with(Colour::yellow()), 1);
    }
}
