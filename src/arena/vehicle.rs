use crate::arena::ArenaObject;
use crate::core::prelude::*;
use crate::util::gg_float;

/// The tank body: turns on A/D, drives on W/S with momentum, coasts to a stop otherwise.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vehicle {
    /// Longitudinal velocity in [-1, 1]; positive is forwards.
    velocity: f32,
}

impl Vehicle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub(crate) fn on_update(
        &mut self,
        delta: f32,
        ctx: &mut UpdateContext<'_, ArenaObject>,
    ) -> Result<()> {
        let input = ctx.input();
        let (left, right) = (input.down(KeyCode::KeyA), input.down(KeyCode::KeyD));
        let (forward, reverse) = (input.down(KeyCode::KeyW), input.down(KeyCode::KeyS));
        let config = ctx.config().clone();
        let node = ctx.this_mut()?;

        if left {
            node.rotate_by(-config.turn_rate * delta);
        }
        if right {
            node.rotate_by(config.turn_rate * delta);
        }

        // Movement uses the velocity from before this frame's change.
        if forward {
            node.relative_translate(Vec2 {
                x: 0.,
                y: config.forward_thrust * self.velocity * delta,
            });
            if self.velocity < 1. {
                self.velocity += config.momentum_accel * delta;
            }
        }
        if reverse {
            node.relative_translate(Vec2 {
                x: 0.,
                y: config.reverse_thrust * self.velocity * delta,
            });
            if self.velocity > -1. {
                self.velocity -= config.momentum_accel * delta;
            }
        }
        if !forward && !reverse && self.velocity != 0. {
            self.velocity = gg_float::approach(self.velocity, 0., config.momentum_decay * delta);
            let thrust =
                config.coast_thrust_bias * gg_float::sign_zero(self.velocity) + config.coast_thrust;
            node.relative_translate(Vec2 {
                x: 0.,
                y: thrust * self.velocity * delta,
            });
        }
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
        ctx.this_mut()?.translate(collision.mtv());
        self.velocity = 0.;
        Ok(CollisionResponse::Done)
    }
}
