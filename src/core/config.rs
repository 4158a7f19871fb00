use serde::{Deserialize, Serialize};

pub const EPSILON: f32 = 1e-5;
/// Upper bound on a single frame's timestep, in seconds.
pub const MAX_TIMESTEP_S: f32 = 1. / 6.;
/// Timestep used for the very first frame, before any wall-clock delta exists.
pub const DEFAULT_TIMESTEP_S: f32 = 0.005;
pub const PROJECTILE_MAX_BOUNCES: u32 = 3;

/// Tuning for the arena's behaviours. Every field has a default, so a config file only needs
/// to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub screen_width: f32,
    /// Used to flip screen-space mouse coordinates (y down) into the world (y up).
    pub screen_height: f32,

    /// Radians per second.
    pub turn_rate: f32,
    pub forward_thrust: f32,
    pub reverse_thrust: f32,
    /// Change in longitudinal velocity per second while W or S is held.
    pub momentum_accel: f32,
    /// Change in longitudinal velocity per second while coasting.
    pub momentum_decay: f32,
    pub coast_thrust: f32,
    /// Added to `coast_thrust` when coasting forwards, subtracted when coasting backwards.
    pub coast_thrust_bias: f32,

    pub aim_gain: f32,
    /// Barrel angular velocity is multiplied by `aim_damping_base.powf(delta)` each frame.
    pub aim_damping_base: f32,
    /// Seconds between shots.
    pub fire_cooldown: f32,
    /// The barrel may fire once the cooldown timer drops below this.
    pub fire_ready_threshold: f32,
    /// Barrel pivot (unscaled sprite pixels) immediately after firing.
    pub recoil_origin: f32,
    /// Barrel pivot (unscaled sprite pixels) at rest.
    pub rest_origin: f32,
    /// Scaled pixels per second.
    pub recoil_recovery: f32,

    pub projectile_speed: f32,
    pub projectile_lifetime: f32,
    pub projectile_max_bounces: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            screen_width: 2500.,
            screen_height: 1500.,
            turn_rate: 2.,
            forward_thrust: 200.,
            reverse_thrust: 100.,
            momentum_accel: 0.5,
            momentum_decay: 1.,
            coast_thrust: 150.,
            coast_thrust_bias: 50.,
            aim_gain: 3.,
            aim_damping_base: 0.02,
            fire_cooldown: 3.,
            fire_ready_threshold: 0.1,
            recoil_origin: 30.,
            rest_origin: 40.,
            recoil_recovery: 100.,
            projectile_speed: 600.,
            projectile_lifetime: 4.,
            projectile_max_bounces: PROJECTILE_MAX_BOUNCES,
        }
    }
}
