//! Accumulated passive displacement.
//!
//! Effect Systems (gravity, external forces) run before the Brain and add the
//! displacement they produced this tick. The Brain consumes the total when it
//! composes the net transform delta, leaving the accumulator empty again.

use bevy_ecs::prelude::Component;
use glam::Vec3;

#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct PassiveEffects {
    /// Displacement accumulated since the Brain last ran, in world units.
    pub displacement: Vec3,
}

impl PassiveEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, displacement: Vec3) {
        self.displacement += displacement;
    }

    /// Return the accumulated displacement and reset it.
    pub fn take(&mut self) -> Vec3 {
        std::mem::take(&mut self.displacement)
    }
}
