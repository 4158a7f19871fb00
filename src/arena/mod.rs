pub mod barrel;
pub mod projectile;
pub mod vehicle;

use crate::core::{
    audio::AudioSink,
    input::InputHandler,
    prelude::*,
    render::RenderBackend,
    update::{FrameReport, UpdateHandler},
};
use crate::util::gg_err;
use barrel::Barrel;
use projectile::Projectile;
use vehicle::Vehicle;

const TANK_BODY_TEXTURE: &str = "tankBlue_outline.png";
const TANK_BODY_EXTENT: Vec2 = Vec2 { x: 83., y: 78. };
const BARREL_TEXTURE: &str = "barrelBlue.png";
const BARREL_EXTENT: Vec2 = Vec2 { x: 16., y: 50. };
const PROJECTILE_TEXTURE: &str = "bulletBlue.png";
const PROJECTILE_EXTENT: Vec2 = Vec2 { x: 12., y: 26. };
const OBSTACLE_TEXTURE: &str = "crateWood.png";
const OBSTACLE_EXTENT: Vec2 = Vec2 { x: 28., y: 28. };
const FIRE_SOUND: &str = "tankFiring.wav";

/// Handles for every asset the arena draws or plays.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ArenaAssets {
    pub tank_body: Texture,
    pub barrel: Texture,
    pub projectile: Texture,
    pub obstacle: Texture,
    pub fire: SoundId,
}

impl ArenaAssets {
    pub fn register(resources: &mut ResourceHandler) -> Result<Self> {
        Ok(Self {
            tank_body: resources.register_texture(TANK_BODY_TEXTURE, TANK_BODY_EXTENT)?,
            barrel: resources.register_texture(BARREL_TEXTURE, BARREL_EXTENT)?,
            projectile: resources.register_texture(PROJECTILE_TEXTURE, PROJECTILE_EXTENT)?,
            obstacle: resources.register_texture(OBSTACLE_TEXTURE, OBSTACLE_EXTENT)?,
            fire: resources.register_sound(FIRE_SOUND)?,
        })
    }
}

/// Every behaviour in the arena.
#[derive(Clone, Debug, PartialEq)]
pub enum ArenaObject {
    Vehicle(Vehicle),
    Barrel(Barrel),
    Projectile(Projectile),
    Obstacle,
}

impl SceneObject for ArenaObject {
    fn on_update(&mut self, delta: f32, ctx: &mut UpdateContext<'_, Self>) {
        let result = match self {
            ArenaObject::Vehicle(vehicle) => vehicle.on_update(delta, ctx),
            ArenaObject::Barrel(barrel) => barrel.on_update(delta, ctx),
            ArenaObject::Projectile(projectile) => projectile.on_update(delta, ctx),
            ArenaObject::Obstacle => Ok(()),
        };
        gg_err::log_err_and_ignore(result);
    }

    fn on_collision(
        &mut self,
        ctx: &mut UpdateContext<'_, Self>,
        collision: &Collision,
        other: Option<&Self>,
    ) -> CollisionResponse {
        let result = match self {
            ArenaObject::Vehicle(vehicle) => vehicle.on_collision(ctx, collision, other),
            ArenaObject::Projectile(projectile) => projectile.on_collision(ctx, collision, other),
            ArenaObject::Barrel(_) | ArenaObject::Obstacle => Ok(CollisionResponse::Continue),
        };
        gg_err::log_and_ok(result).unwrap_or(CollisionResponse::Continue)
    }
}

/// The tank arena: a world root holding one tank (body plus barrel), obstacles, and whatever
/// projectiles are in flight.
pub struct Arena {
    handler: UpdateHandler<ArenaObject>,
    assets: ArenaAssets,
    world: NodeId,
    body: NodeId,
    barrel: NodeId,
}

impl Arena {
    pub fn new(config: ArenaConfig, resources: &mut ResourceHandler) -> Result<Self> {
        let assets = ArenaAssets::register(resources).context("registering arena assets")?;
        let mut handler = UpdateHandler::new(config);
        let world = handler.add_node(TransformNode::new(), None)?;
        let body = handler.add_object(
            TransformNode::new()
                .with_texture(assets.tank_body)
                .with_centred_origin()
                .with_scale(Vec2::splat(3.))
                .collidable(),
            Some(world),
            ArenaObject::Vehicle(Vehicle::new()),
        )?;
        let barrel = handler.add_object(
            TransformNode::new()
                .with_texture(assets.barrel)
                .with_origin(Vec2 { x: 8., y: 40. })
                .with_rotation(2.)
                .with_scale(Vec2 { x: 3., y: 5. })
                .with_tint(Colour::from_bytes(200, 200, 200, 255))
                .collidable(),
            Some(body),
            ArenaObject::Barrel(Barrel::new(assets.fire, assets.projectile, world)),
        )?;
        handler.scene_mut().exclude_pair(body, barrel)?;
        info!("arena ready: body {body:?}, barrel {barrel:?}");
        Ok(Self {
            handler,
            assets,
            world,
            body,
            barrel,
        })
    }

    /// Places a crate at `position`, scaled by `scale`.
    pub fn add_obstacle(&mut self, position: Vec2, scale: Vec2) -> Result<NodeId> {
        let id = self.handler.add_object(
            TransformNode::new()
                .with_texture(self.assets.obstacle)
                .with_centred_origin()
                .with_position(position)
                .with_scale(scale)
                .collidable(),
            Some(self.world),
            ArenaObject::Obstacle,
        )?;
        Ok(id)
    }

    pub fn update(
        &mut self,
        delta: f32,
        input: &InputHandler,
        audio: &mut dyn AudioSink,
    ) -> FrameReport {
        self.handler.update(delta, input, audio)
    }
    pub fn render(&self, renderer: &mut dyn RenderBackend, debug: bool) {
        self.handler.render(renderer, debug);
    }

    pub fn handler(&self) -> &UpdateHandler<ArenaObject> {
        &self.handler
    }
    pub fn handler_mut(&mut self) -> &mut UpdateHandler<ArenaObject> {
        &mut self.handler
    }
    pub fn scene(&self) -> &SceneGraph {
        self.handler.scene()
    }
    pub fn assets(&self) -> &ArenaAssets {
        &self.assets
    }

    pub fn world(&self) -> NodeId {
        self.world
    }
    pub fn body(&self) -> NodeId {
        self.body
    }
    pub fn barrel(&self) -> NodeId {
        self.barrel
    }

    pub fn vehicle(&self) -> Option<&Vehicle> {
        match self.handler.object(self.body) {
            Some(ArenaObject::Vehicle(vehicle)) => Some(vehicle),
            _ => None,
        }
    }
    pub fn barrel_state(&self) -> Option<&Barrel> {
        match self.handler.object(self.barrel) {
            Some(ArenaObject::Barrel(barrel)) => Some(barrel),
            _ => None,
        }
    }
    pub fn projectiles(&self) -> Vec<(NodeId, &Projectile)> {
        self.handler
            .objects()
            .filter_map(|(id, obj)| match obj {
                ArenaObject::Projectile(projectile) => Some((id, projectile)),
                _ => None,
            })
            .collect()
    }
}
