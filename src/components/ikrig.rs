//! Inverse-kinematics targets of an actor.
//!
//! Optional: when present, the IK observer refreshes it from every
//! [`IkUpdateEvent`](crate::events::brain::IkUpdateEvent) the Brain emits.

use bevy_ecs::prelude::Component;
use glam::Vec3;

#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct IkRig {
    /// Where the head should look, one unit ahead of the actor.
    pub look_target: Vec3,
    /// Horizontal distance walked since spawn, drives the stride cycle.
    pub stride_distance: f32,
    /// Body lean toward the horizontal motion, in `[-1, 1]` per axis.
    pub lean: Vec3,
    pub updates: u64,
}
