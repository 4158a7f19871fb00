use crate::arena::{projectile::Projectile, ArenaObject};
use crate::core::prelude::*;
use crate::util::gg_float;

/// The turret: swings towards the mouse while the right button is held, fires on left click.
///
/// Firing kicks the pivot back along the barrel, which then creeps back to rest.
#[derive(Clone, Debug, PartialEq)]
pub struct Barrel {
    angular_velocity: f32,
    fire_timer: f32,
    fire_sound: SoundId,
    projectile_texture: Texture,
    /// Parent for spawned projectiles, so they move in world space rather than with the tank.
    projectile_parent: NodeId,
}

impl Barrel {
    pub fn new(fire_sound: SoundId, projectile_texture: Texture, projectile_parent: NodeId) -> Self {
        Self {
            angular_velocity: 0.,
            fire_timer: 0.,
            fire_sound,
            projectile_texture,
            projectile_parent,
        }
    }

    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }
    pub fn fire_timer(&self) -> f32 {
        self.fire_timer
    }

    pub(crate) fn on_update(
        &mut self,
        delta: f32,
        ctx: &mut UpdateContext<'_, ArenaObject>,
    ) -> Result<()> {
        let config = ctx.config().clone();
        let aiming = ctx.input().down(KeyCode::MouseRight);
        let firing = ctx.input().pressed(KeyCode::MouseLeft);
        let mouse = ctx.input().screen_mouse_pos();

        if aiming {
            let target = Vec2 {
                x: mouse.x,
                y: config.screen_height - mouse.y,
            };
            match ctx.this()?.world_to_local(target) {
                Ok(local) => {
                    let relative_angle = local.x.atan2(local.y);
                    self.angular_velocity += relative_angle * delta * config.aim_gain;
                }
                Err(e) => crate::warn_every_seconds!(1, "cannot aim barrel: {e}"),
            }
        }
        self.angular_velocity *= config.aim_damping_base.powf(delta);

        let node = ctx.this_mut()?;
        node.rotate_by(self.angular_velocity * delta);

        if self.fire_timer > config.fire_ready_threshold {
            self.fire_timer -= delta;
        }
        let mut origin = node.origin();
        if origin.y < config.rest_origin {
            // Recovery speed is in scaled pixels; the origin is not.
            let step = config.recoil_recovery * delta / node.scale().y;
            origin.y = gg_float::approach(origin.y, config.rest_origin, step);
            node.set_origin(origin);
        }

        if firing && self.fire_timer < config.fire_ready_threshold {
            self.fire(ctx, &config)?;
        }
        Ok(())
    }

    fn fire(
        &mut self,
        ctx: &mut UpdateContext<'_, ArenaObject>,
        config: &ArenaConfig,
    ) -> Result<()> {
        let this = ctx.this()?;
        let body = this.parent();
        // Placement uses the last propagated world matrix; this frame's rotation lands next
        // frame, as for every other node.
        let world = this.world_matrix();
        let direction = world
            .basis()
            .1
            .try_normed()
            .context("cannot fire: degenerate barrel transform")?;
        let tip = world.translation_part() + direction * this.origin().y * this.scale().y;

        ctx.audio().play(self.fire_sound);
        let node = ctx.this_mut()?;
        node.set_origin(Vec2 {
            x: node.origin().x,
            y: config.recoil_origin,
        });
        self.fire_timer = config.fire_cooldown;

        let projectile = ctx.add(
            TransformNode::new()
                .with_texture(self.projectile_texture)
                .with_centred_origin()
                .with_position(tip)
                .with_rotation(world.world_rotation())
                .collidable(),
            Some(self.projectile_parent),
            ArenaObject::Projectile(Projectile::new(direction * config.projectile_speed)),
        )?;
        let this_id = ctx.this_id();
        let scene = ctx.scene_mut();
        scene.exclude_pair(projectile, this_id)?;
        if let Some(body) = body {
            scene.exclude_pair(projectile, body)?;
        }
        info!("fired {projectile:?} from {tip}");
        Ok(())
    }
}
