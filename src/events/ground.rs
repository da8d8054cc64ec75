//! Ground contact notifications.
//!
//! Delivered by the gravity System's post hook over crossbeam channels to the
//! receivers handed out by
//! [`subscribe_ground_events`](crate::systems::gravity::subscribe_ground_events).

use bevy_ecs::entity::Entity;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroundEvent {
    /// The actor touched the ground this tick.
    Landed { actor: Entity, height: f32 },
    /// The actor was grounded last tick and is airborne now.
    LeftGround { actor: Entity },
}

impl GroundEvent {
    pub fn actor(&self) -> Entity {
        match self {
            GroundEvent::Landed { actor, .. } | GroundEvent::LeftGround { actor } => *actor,
        }
    }
}
