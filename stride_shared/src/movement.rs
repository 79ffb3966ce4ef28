//! Movement integration.
//!
//! One call per frame turns the held movement keys into velocity, a turn
//! about the up axis, and a translation along the character's facing.
//! Velocity lives here; position and rotation live on the borrowed
//! [`Transform`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    input::MoveKeys,
    math::{is_valid_dt, Quat, Vec3, UP},
    transform::Transform,
};

/// Movement tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementParams {
    /// Per-axis acceleration. `z` drives forward speed, `y` scales turning.
    #[serde(default = "default_acceleration")]
    pub acceleration: Vec3,
    /// Per-axis damping factor, multiplied by velocity each second.
    #[serde(default = "default_deceleration")]
    pub deceleration: Vec3,
    /// Acceleration multiplier while sprint is held.
    #[serde(default = "default_sprint_multiplier")]
    pub sprint_multiplier: f32,
    /// Radians per second per unit of `acceleration.y`.
    #[serde(default = "default_turn_rate")]
    pub turn_rate: f32,
}

fn default_acceleration() -> Vec3 {
    Vec3::new(1.0, 0.25, 50.0)
}

fn default_deceleration() -> Vec3 {
    Vec3::new(-0.0005, -0.0001, -5.0)
}

fn default_sprint_multiplier() -> f32 {
    2.0
}

fn default_turn_rate() -> f32 {
    4.0 * std::f32::consts::PI
}

impl Default for MovementParams {
    fn default() -> Self {
        Self {
            acceleration: default_acceleration(),
            deceleration: default_deceleration(),
            sprint_multiplier: default_sprint_multiplier(),
            turn_rate: default_turn_rate(),
        }
    }
}

impl MovementParams {
    /// Turn angle for one frame of a held turn key.
    pub fn turn_angle(&self, dt: f32) -> f32 {
        self.turn_rate * dt * self.acceleration.y
    }
}

/// What a [`Movement::step`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Velocity, rotation and position were all updated.
    Integrated,
    /// Velocity was updated; there was no transform to move.
    NoTarget,
    /// `dt` was negative or not finite; nothing changed.
    SkippedFrame,
}

/// Kinematic state of the controlled character.
#[derive(Debug, Clone, Default)]
pub struct Movement {
    pub params: MovementParams,
    velocity: Vec3,
}

impl Movement {
    pub fn new(params: MovementParams) -> Self {
        Self {
            params,
            velocity: Vec3::ZERO,
        }
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Forward/backward speed.
    pub fn speed(&self) -> f32 {
        self.velocity.z.abs()
    }

    /// Stops the character.
    pub fn reset(&mut self) {
        self.velocity = Vec3::ZERO;
    }

    /// Advances one frame.
    pub fn step(&mut self, keys: MoveKeys, target: Option<&mut Transform>, dt: f32) -> StepOutcome {
        if !is_valid_dt(dt) {
            debug!(dt, "Ignoring frame with invalid delta");
            return StepOutcome::SkippedFrame;
        }

        self.integrate_velocity(keys, dt);

        let Some(target) = target else {
            return StepOutcome::NoTarget;
        };
        self.integrate_rotation(keys, target, dt);
        self.integrate_position(target, dt);
        StepOutcome::Integrated
    }

    fn integrate_velocity(&mut self, keys: MoveKeys, dt: f32) {
        let velocity = &mut self.velocity;

        let mut damping = *velocity * self.params.deceleration * dt;
        // Never let damping carry forward speed past zero.
        damping.z = damping.z.signum() * damping.z.abs().min(velocity.z.abs());
        *velocity += damping;

        let scale = if keys.sprint {
            self.params.sprint_multiplier
        } else {
            1.0
        };
        let acc = self.params.acceleration * scale;
        if keys.forward {
            velocity.z += acc.z * dt;
        }
        if keys.backward {
            velocity.z -= acc.z * dt;
        }
    }

    fn integrate_rotation(&self, keys: MoveKeys, target: &mut Transform, dt: f32) {
        let angle = self.params.turn_angle(dt);
        let mut rotation = target.rotation;
        if keys.left {
            rotation *= Quat::from_axis_angle(UP, angle);
        }
        if keys.right {
            rotation *= Quat::from_axis_angle(UP, -angle);
        }
        target.rotation = rotation.normalize();
    }

    fn integrate_position(&self, target: &mut Transform, dt: f32) {
        let sideways = target.sideways() * (self.velocity.x * dt);
        let forward = target.forward() * (self.velocity.z * dt);
        target.position += forward + sideways;
    }
}
