//! Marker for entities that hold batch registrations.
//!
//! Registration inserts [`Scheduled`] on the entity. When the marker is
//! removed, including when the entity is despawned, every registration of
//! that entity is dropped, so no System keeps a dead handle in its registry.

use bevy_ecs::prelude::Component;

#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scheduled;
