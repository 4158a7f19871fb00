use crate::arena::ArenaObject;
use crate::core::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    velocity: Vec2,
    bounces: u32,
    age: f32,
}

impl Projectile {
    pub fn new(velocity: Vec2) -> Self {
        Self {
            velocity,
            bounces: 0,
            age: 0.,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }
    pub fn bounces(&self) -> u32 {
        self.bounces
    }

    pub(crate) fn on_update(
        &mut self,
        delta: f32,
        ctx: &mut UpdateContext<'_, ArenaObject>,
    ) -> Result<()> {
        self.age += delta;
        if self.age >= ctx.config().projectile_lifetime {
            ctx.destroy_this();
            return Ok(());
        }
        let velocity = self.velocity;
        ctx.this_mut()?.translate(velocity * delta);
        Ok(())
    }

    pub(crate) fn on_collision(
        &mut self,
        ctx: &mut UpdateContext<'_, ArenaObject>,
        collision: &Collision,
        other: Option<&ArenaObject>,
    ) -> Result<CollisionResponse> {
        if !matches!(other, Some(ArenaObject::Obstacle)) {
            return Ok(CollisionResponse::Continue);
        }
        // Already leaving: correct position only, or it would bounce back into the obstacle.
        if self.velocity.dot(collision.normal()) < 0. {
            self.velocity = collision.reflect(self.velocity);
        }
        let node = ctx.this_mut()?;
        node.translate(collision.mtv());
        node.set_rotation(self.velocity.x.atan2(self.velocity.y));
        self.bounces += 1;
        if self.bounces >= ctx.config().projectile_max_bounces {
            ctx.destroy_this();
        }
        Ok(CollisionResponse::Done)
    }
}
