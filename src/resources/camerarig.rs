//! Follow-camera resource.
//!
//! The Brain feeds the applied pose of every actor to observers through
//! [`CameraUpdateEvent`](crate::events::brain::CameraUpdateEvent); the camera
//! observer copies the pose of the actor this rig follows into `focus`, and
//! a LateUpdate host system eases `position` toward it.

use bevy_ecs::prelude::*;
use glam::Vec3;

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    /// Actor being followed. `None` leaves the rig where it is.
    pub target: Option<Entity>,
    /// Offset from the focus point, rotated with the target's yaw.
    pub offset: Vec3,
    /// Latest target pose.
    pub focus: Vec3,
    pub focus_yaw: f32,
    /// Current camera position.
    pub position: Vec3,
    /// Catch-up rate per second; 0 disables smoothing (snap).
    pub smoothing: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            target: None,
            offset: Vec3::new(0.0, 2.0, -4.0),
            focus: Vec3::ZERO,
            focus_yaw: 0.0,
            position: Vec3::ZERO,
            smoothing: 8.0,
        }
    }
}

impl CameraRig {
    pub fn following(target: Entity) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    /// Where the camera wants to be for the current focus.
    pub fn desired_position(&self) -> Vec3 {
        let (sin, cos) = self.focus_yaw.to_radians().sin_cos();
        let rotated = Vec3::new(
            self.offset.x * cos + self.offset.z * sin,
            self.offset.y,
            -self.offset.x * sin + self.offset.z * cos,
        );
        self.focus + rotated
    }
}
