//! Math types.
//!
//! Vector and quaternion types come from `glam`. This module adds the world
//! axes the controller works in and a few angle helpers.

pub use glam::{Mat4, Quat, Vec3};

/// World up axis. Turning happens around it.
pub const UP: Vec3 = Vec3::Y;

/// Local forward axis of a character before rotation.
pub const FORWARD: Vec3 = Vec3::Z;

/// Local sideways axis of a character before rotation.
pub const SIDEWAYS: Vec3 = Vec3::X;

/// Wraps an angle in radians into `(-PI, PI]`.
pub fn wrap_angle(a: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let x = a.rem_euclid(TAU);
    if x > PI {
        x - TAU
    } else {
        x
    }
}

/// Returns the rotation about [`UP`] encoded by `q`, in `(-PI, PI]`.
pub fn yaw_of(q: Quat) -> f32 {
    let fwd = q * FORWARD;
    wrap_angle(fwd.x.atan2(fwd.z))
}

/// A frame delta is usable when it is finite and not negative.
pub fn is_valid_dt(dt: f32) -> bool {
    dt.is_finite() && dt >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn wrap_angle_stays_in_range() {
        assert!((wrap_angle(2.0 * PI + 1.0) - 1.0).abs() < 1e-5);
        assert!((wrap_angle(-PI - 0.5) - (PI - 0.5)).abs() < 1e-5);
        assert!((wrap_angle(-FRAC_PI_2) + FRAC_PI_2).abs() < 1e-6);
        assert!(wrap_angle(2.0 * PI).abs() < 1e-5);
    }

    #[test]
    fn yaw_of_axis_angle() {
        let q = Quat::from_axis_angle(UP, FRAC_PI_2);
        assert!((yaw_of(q) - FRAC_PI_2).abs() < 1e-5);
        assert!(yaw_of(Quat::IDENTITY).abs() < 1e-6);
    }

    #[test]
    fn dt_validation() {
        assert!(is_valid_dt(0.0));
        assert!(is_valid_dt(0.016));
        assert!(!is_valid_dt(-0.001));
        assert!(!is_valid_dt(f32::NAN));
        assert!(!is_valid_dt(f32::INFINITY));
    }
}
