//! Priority traits for movement and turn requests.
//!
//! Behaviour components that want to steer an actor implement
//! [`MoveProvider`] or [`TurnProvider`]. Each tick the Brain asks every live
//! candidate for its [`Priority`] and hands control to the single highest one
//! (see [`crate::systems::arbitration`]). A priority of zero or below means
//! "not requesting this tick".
//!
//! [`PriorityLifecycle`] carries the optional transition callbacks. Within one
//! tick a candidate receives at most one of them:
//!
//! - `on_acquire_highest_priority` – it became the winner
//! - `on_update_with_highest_priority` – it was already the winner and still is
//! - `on_lose_highest_priority` – it was the winner and a rival (or nobody) took over

use glam::Vec3;

/// Anything that can take part in arbitration.
pub trait Priority {
    fn priority(&self) -> i32;
}

impl<P: Priority + ?Sized> Priority for Box<P> {
    fn priority(&self) -> i32 {
        (**self).priority()
    }
}

/// Transition callbacks. All default to no-ops.
pub trait PriorityLifecycle {
    fn on_acquire_highest_priority(&mut self) {}

    fn on_lose_highest_priority(&mut self) {}

    fn on_update_with_highest_priority(&mut self, _dt: f32) {}
}

/// A candidate requesting a movement velocity (units per second).
pub trait MoveProvider: Priority + PriorityLifecycle + Send + Sync {
    fn velocity(&self) -> Vec3;

    /// Per-tick housekeeping, run by the control System whether or not the
    /// candidate is winning.
    fn tick(&mut self, _dt: f32) {}

    fn label(&self) -> &str {
        "move"
    }
}

/// A candidate requesting the actor turn toward a yaw (degrees) at a speed
/// (degrees per second).
pub trait TurnProvider: Priority + PriorityLifecycle + Send + Sync {
    fn target_yaw(&self) -> f32;

    fn turn_speed(&self) -> f32;

    fn tick(&mut self, _dt: f32) {}

    fn label(&self) -> &str {
        "turn"
    }
}
