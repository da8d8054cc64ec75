//! External forces acting on an actor.
//!
//! The [`ExternalForces`] component stores a velocity plus any number of named
//! acceleration forces (wind, conveyor belts, knockback). Each force can be
//! toggled on its own. The forces System integrates them every tick and
//! writes the resulting displacement into
//! [`PassiveEffects`](super::passiveeffects::PassiveEffects), where the Brain
//! picks it up and adds it to the winning movement request.
//!
//! The `frozen` flag suspends integration entirely, e.g. while an actor is
//! carried by something else.

use bevy_ecs::prelude::Component;
use glam::Vec3;
use rustc_hash::FxHashMap;

/// A named acceleration that can be toggled on/off.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccelerationForce {
    /// Acceleration in world units per second squared.
    pub value: Vec3,
    pub enabled: bool,
}

impl AccelerationForce {
    /// Create an enabled force.
    pub fn new(value: Vec3) -> Self {
        Self {
            value,
            enabled: true,
        }
    }

    pub fn with_enabled(value: Vec3, enabled: bool) -> Self {
        Self { value, enabled }
    }
}

/// Velocity and named accelerations integrated into passive displacement.
///
/// # Example
/// ```ignore
/// let mut forces = ExternalForces::with_physics(2.0, Some(8.0));
/// forces.add_force("wind", Vec3::new(1.5, 0.0, 0.0));
/// forces.add_force_with_state("gust", Vec3::new(0.0, 0.0, 3.0), false);
/// ```
#[derive(Component, Clone, Debug)]
pub struct ExternalForces {
    /// Current velocity in world units per second.
    pub velocity: Vec3,
    pub forces: FxHashMap<String, AccelerationForce>,
    /// Velocity damping. Applied as `velocity *= (1 - friction * dt)`.
    pub friction: f32,
    /// Optional clamp on the velocity magnitude.
    pub max_speed: Option<f32>,
    /// When true the forces System leaves this actor alone.
    pub frozen: bool,
}

impl Default for ExternalForces {
    fn default() -> Self {
        Self::new()
    }
}

impl ExternalForces {
    pub fn new() -> Self {
        Self {
            velocity: Vec3::ZERO,
            forces: FxHashMap::default(),
            friction: 0.0,
            max_speed: None,
            frozen: false,
        }
    }

    /// Create with damping and an optional speed limit.
    pub fn with_physics(friction: f32, max_speed: Option<f32>) -> Self {
        Self {
            friction,
            max_speed,
            ..Self::new()
        }
    }

    /// Add or replace a named force (enabled).
    pub fn add_force(&mut self, name: &str, value: Vec3) {
        self.forces
            .insert(name.to_string(), AccelerationForce::new(value));
    }

    pub fn add_force_with_state(&mut self, name: &str, value: Vec3, enabled: bool) {
        self.forces.insert(
            name.to_string(),
            AccelerationForce::with_enabled(value, enabled),
        );
    }

    pub fn is_force_enabled(&self, name: &str) -> bool {
        self.forces.get(name).map(|f| f.enabled).unwrap_or(false)
    }

    /// Sum of all enabled forces.
    pub fn total_acceleration(&self) -> Vec3 {
        self.forces
            .values()
            .filter(|force| force.enabled)
            .map(|force| force.value)
            .sum()
    }

    /// Advance the velocity by `dt` and return the displacement it produced.
    ///
    /// Order: accelerate, damp, clamp, then displace. Frozen bodies return zero
    /// and keep their velocity.
    pub fn integrate(&mut self, dt: f32) -> Vec3 {
        if self.frozen || dt <= 0.0 {
            return Vec3::ZERO;
        }
        self.velocity += self.total_acceleration() * dt;
        if self.friction > 0.0 {
            let damping = (1.0 - self.friction * dt).max(0.0);
            self.velocity *= damping;
        }
        if let Some(max_speed) = self.max_speed {
            self.velocity = self.velocity.clamp_length_max(max_speed.max(0.0));
        }
        self.velocity * dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
    }

    #[test]
    fn test_new_is_at_rest() {
        let forces = ExternalForces::new();
        assert_eq!(forces.velocity, Vec3::ZERO);
        assert!(forces.forces.is_empty());
        assert!(forces.max_speed.is_none());
        assert!(!forces.frozen);
    }

    #[test]
    fn test_add_force_overwrites() {
        let mut forces = ExternalForces::new();
        forces.add_force("wind", Vec3::X);
        forces.add_force("wind", Vec3::Z);
        assert_eq!(forces.forces.len(), 1);
        assert_eq!(forces.forces["wind"].value, Vec3::Z);
    }

    #[test]
    fn test_unknown_force_is_disabled() {
        let mut forces = ExternalForces::new();
        assert!(!forces.is_force_enabled("nothing"));
    }

    #[test]
    fn test_total_acceleration_skips_disabled() {
        let mut forces = ExternalForces::new();
        forces.add_force("wind", Vec3::new(1.0, 0.0, 0.0));
        forces.add_force("lift", Vec3::new(0.0, 2.0, 0.0));
        forces.add_force_with_state("belt", Vec3::new(0.0, 0.0, 5.0), false);
        assert!(vec_approx_eq(
            forces.total_acceleration(),
            Vec3::new(1.0, 2.0, 0.0)
        ));
        forces.add_force_with_state("lift", Vec3::new(0.0, 2.0, 0.0), false);
        assert!(vec_approx_eq(forces.total_acceleration(), Vec3::X));
    }

    #[test]
    fn test_integrate_accelerates_then_displaces() {
        let mut forces = ExternalForces::new();
        forces.add_force("wind", Vec3::new(2.0, 0.0, 0.0));
        let displacement = forces.integrate(0.5);
        assert!(vec_approx_eq(forces.velocity, Vec3::new(1.0, 0.0, 0.0)));
        assert!(vec_approx_eq(displacement, Vec3::new(0.5, 0.0, 0.0)));
    }

    #[test]
    fn test_integrate_clamps_to_max_speed() {
        let mut forces = ExternalForces::with_physics(0.0, Some(3.0));
        forces.velocity = Vec3::new(10.0, 0.0, 0.0);
        forces.integrate(0.1);
        assert!(approx_eq(forces.velocity.length(), 3.0));
    }

    #[test]
    fn test_integrate_friction_damps() {
        let mut forces = ExternalForces::with_physics(5.0, None);
        forces.velocity = Vec3::new(4.0, 0.0, 0.0);
        forces.integrate(0.1);
        assert!(approx_eq(forces.velocity.x, 2.0));
    }

    #[test]
    fn test_frozen_does_not_move() {
        let mut forces = ExternalForces::new();
        forces.velocity = Vec3::ONE;
        forces.frozen = true;
        assert_eq!(forces.integrate(1.0), Vec3::ZERO);
        assert_eq!(forces.velocity, Vec3::ONE);
    }
}
