//! Gravity component.
//!
//! Vertical acceleration against a flat ground plane. The gravity System
//! probes the ground before the native phase, integrates `vertical_velocity`
//! during it, and reports landing/leaving-ground transitions after it.

use bevy_ecs::prelude::Component;

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Gravity {
    /// Vertical acceleration in units/s² (negative pulls down).
    pub acceleration: f32,
    /// Current vertical speed in units/s.
    pub vertical_velocity: f32,
    /// Height of the ground plane under this actor.
    pub ground_height: f32,
    /// Result of the latest ground probe.
    pub grounded: bool,
}

impl Default for Gravity {
    fn default() -> Self {
        Self::new(-9.81, 0.0)
    }
}

impl Gravity {
    pub fn new(acceleration: f32, ground_height: f32) -> Self {
        Self {
            acceleration,
            vertical_velocity: 0.0,
            ground_height,
            grounded: false,
        }
    }

    /// Vertical displacement for this tick starting from height `y`.
    ///
    /// Integrates the velocity and stops it at the ground plane, so the
    /// returned step never takes the actor below `ground_height`.
    pub fn step(&mut self, y: f32, dt: f32) -> f32 {
        if self.grounded && self.vertical_velocity <= 0.0 {
            self.vertical_velocity = 0.0;
            return (self.ground_height - y).max(0.0);
        }
        self.vertical_velocity += self.acceleration * dt;
        let next = y + self.vertical_velocity * dt;
        if next <= self.ground_height {
            self.vertical_velocity = 0.0;
            self.ground_height - y
        } else {
            next - y
        }
    }
}
