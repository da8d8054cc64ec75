//! World-space pose of an actor.
//!
//! [`ActorTransform`] is the host's transform: the Brain reads it at the start
//! of a tick and writes the resolved pose back through [`ActorTransform::move_to`].
//! Yaw is in degrees around the up (Y) axis, kept in `[0, 360)`.

use bevy_ecs::prelude::Component;
use glam::Vec3;

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct ActorTransform {
    pub position: Vec3,
    pub yaw: f32,
}

impl Default for ActorTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
        }
    }
}

impl ActorTransform {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            yaw: normalize_degrees(yaw),
        }
    }

    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self::new(Vec3::new(x, y, z), 0.0)
    }

    /// Place the actor at `position` facing `yaw` degrees.
    pub fn move_to(&mut self, position: Vec3, yaw: f32) {
        self.position = position;
        self.yaw = normalize_degrees(yaw);
    }

    /// Unit vector the actor faces on the XZ plane.
    pub fn forward(&self) -> Vec3 {
        let radians = self.yaw.to_radians();
        Vec3::new(radians.sin(), 0.0, radians.cos())
    }
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_normalize_degrees() {
        assert!((normalize_degrees(370.0) - 10.0).abs() < EPSILON);
        assert!((normalize_degrees(-90.0) - 270.0).abs() < EPSILON);
        assert!((normalize_degrees(360.0)).abs() < EPSILON);
    }

    #[test]
    fn test_move_to_wraps_yaw() {
        let mut transform = ActorTransform::default();
        transform.move_to(Vec3::new(1.0, 2.0, 3.0), -45.0);
        assert_eq!(transform.position, Vec3::new(1.0, 2.0, 3.0));
        assert!((transform.yaw - 315.0).abs() < EPSILON);
    }

    #[test]
    fn test_forward_at_zero_yaw_is_plus_z() {
        let transform = ActorTransform::default();
        assert!((transform.forward() - Vec3::Z).length() < EPSILON);
    }
}
