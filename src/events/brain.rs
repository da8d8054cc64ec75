//! Dependent-system hooks emitted by the Brain.
//!
//! Once an actor's transform has been written for the tick, the Brain triggers
//! [`CameraUpdateEvent`] and then [`IkUpdateEvent`]. Both carry the applied
//! pose, so observers never need to query the transform again. Without an
//! observer the trigger is a no-op.

use bevy_ecs::prelude::*;
use glam::Vec3;

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct CameraUpdateEvent {
    pub actor: Entity,
    pub position: Vec3,
    pub yaw: f32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct IkUpdateEvent {
    pub actor: Entity,
    pub position: Vec3,
    pub yaw: f32,
    /// Displacement applied this tick, after axis freeze.
    pub displacement: Vec3,
}
