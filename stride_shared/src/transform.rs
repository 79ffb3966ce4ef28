//! Character transform.
//!
//! The rendering side owns the transform; the controller borrows it mutably
//! for the duration of one update.

use serde::{Deserialize, Serialize};

use crate::math::{Quat, Vec3, FORWARD, SIDEWAYS};

/// Position and orientation of the controlled object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Local +Z in world space.
    pub fn forward(&self) -> Vec3 {
        (self.rotation * FORWARD).normalize_or_zero()
    }

    /// Local +X in world space.
    pub fn sideways(&self) -> Vec3 {
        (self.rotation * SIDEWAYS).normalize_or_zero()
    }
}
