//! Built-in movement and turn candidates.
//!
//! These are the stock [`MoveProvider`]/[`TurnProvider`] implementations the
//! scenario loader knows how to build:
//!
//! - [`ConstantMove`] – fixed velocity at a fixed priority
//! - [`WanderMove`] – random horizontal heading, re-rolled on an interval
//! - [`FaceYaw`] – turn toward a fixed yaw
//!
//! Any of them can be restricted to an [`ActiveWindow`] of simulated time;
//! outside the window the candidate reports priority 0 and so never wins.

use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::components::priority::{MoveProvider, Priority, PriorityLifecycle, TurnProvider};

/// Span of simulated seconds, `[start, end)`, during which a candidate requests control.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveWindow {
    pub start: f32,
    pub end: f32,
}

impl ActiveWindow {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, t: f32) -> bool {
        t >= self.start && t < self.end
    }
}

/// Priority gated by an optional window over the candidate's own clock.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Gate {
    window: Option<ActiveWindow>,
    elapsed: f32,
}

impl Gate {
    fn priority(&self, base: i32) -> i32 {
        match self.window {
            Some(window) if !window.contains(self.elapsed) => 0,
            _ => base,
        }
    }

    fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
    }
}

/// Requests a constant velocity.
#[derive(Clone, Debug)]
pub struct ConstantMove {
    pub label: String,
    pub velocity: Vec3,
    pub priority: i32,
    gate: Gate,
}

impl ConstantMove {
    pub fn new(velocity: Vec3, priority: i32) -> Self {
        Self {
            label: "constant".to_string(),
            velocity,
            priority,
            gate: Gate::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_window(mut self, window: ActiveWindow) -> Self {
        self.gate.window = Some(window);
        self
    }
}

impl Priority for ConstantMove {
    fn priority(&self) -> i32 {
        self.gate.priority(self.priority)
    }
}

impl PriorityLifecycle for ConstantMove {
    fn on_acquire_highest_priority(&mut self) {
        debug!("move candidate '{}' took control", self.label);
    }

    fn on_lose_highest_priority(&mut self) {
        debug!("move candidate '{}' lost control", self.label);
    }
}

impl MoveProvider for ConstantMove {
    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn tick(&mut self, dt: f32) {
        self.gate.advance(dt);
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Wanders on the horizontal plane at `speed`.
///
/// The heading is re-rolled every `interval` seconds while in control, and
/// once more whenever control is (re)acquired.
#[derive(Clone, Debug)]
pub struct WanderMove {
    pub label: String,
    pub speed: f32,
    pub priority: i32,
    pub interval: f32,
    heading: Vec3,
    timer: f32,
    rng: fastrand::Rng,
    gate: Gate,
}

impl WanderMove {
    pub fn new(speed: f32, priority: i32, interval: f32, seed: u64) -> Self {
        let mut wander = Self {
            label: "wander".to_string(),
            speed,
            priority,
            interval: interval.max(f32::EPSILON),
            heading: Vec3::X,
            timer: 0.0,
            rng: fastrand::Rng::with_seed(seed),
            gate: Gate::default(),
        };
        wander.reroll();
        wander
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_window(mut self, window: ActiveWindow) -> Self {
        self.gate.window = Some(window);
        self
    }

    pub fn heading(&self) -> Vec3 {
        self.heading
    }

    fn reroll(&mut self) {
        let angle = self.rng.f32() * std::f32::consts::TAU;
        self.heading = Vec3::new(angle.cos(), 0.0, angle.sin());
        self.timer = 0.0;
    }
}

impl Priority for WanderMove {
    fn priority(&self) -> i32 {
        self.gate.priority(self.priority)
    }
}

impl PriorityLifecycle for WanderMove {
    fn on_acquire_highest_priority(&mut self) {
        self.reroll();
        debug!("move candidate '{}' took control, heading {:?}", self.label, self.heading);
    }

    fn on_update_with_highest_priority(&mut self, dt: f32) {
        self.timer += dt;
        if self.timer >= self.interval {
            self.reroll();
        }
    }
}

impl MoveProvider for WanderMove {
    fn velocity(&self) -> Vec3 {
        self.heading * self.speed
    }

    fn tick(&mut self, dt: f32) {
        self.gate.advance(dt);
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Turns toward a fixed yaw in degrees.
#[derive(Clone, Debug)]
pub struct FaceYaw {
    pub label: String,
    pub yaw: f32,
    /// Degrees per second.
    pub speed: f32,
    pub priority: i32,
    gate: Gate,
}

impl FaceYaw {
    pub fn new(yaw: f32, speed: f32, priority: i32) -> Self {
        Self {
            label: "face".to_string(),
            yaw,
            speed,
            priority,
            gate: Gate::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_window(mut self, window: ActiveWindow) -> Self {
        self.gate.window = Some(window);
        self
    }
}

impl Priority for FaceYaw {
    fn priority(&self) -> i32 {
        self.gate.priority(self.priority)
    }
}

impl PriorityLifecycle for FaceYaw {
    fn on_acquire_highest_priority(&mut self) {
        debug!("turn candidate '{}' took control", self.label);
    }
}

impl TurnProvider for FaceYaw {
    fn target_yaw(&self) -> f32 {
        self.yaw
    }

    fn turn_speed(&self) -> f32 {
        self.speed
    }

    fn tick(&mut self, dt: f32) {
        self.gate.advance(dt);
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_gates_priority() {
        let mut mv = ConstantMove::new(Vec3::X, 4).with_window(ActiveWindow::new(1.0, 2.0));
        assert_eq!(mv.priority(), 0);
        mv.tick(1.0);
        assert_eq!(mv.priority(), 4);
        mv.tick(1.0);
        assert_eq!(mv.priority(), 0);
    }

    #[test]
    fn test_wander_is_deterministic_per_seed() {
        let a = WanderMove::new(2.0, 1, 1.0, 7);
        let b = WanderMove::new(2.0, 1, 1.0, 7);
        assert_eq!(a.heading(), b.heading());
        assert!((a.velocity().length() - 2.0).abs() < 1e-5);
        assert_eq!(a.velocity().y, 0.0);
    }

    #[test]
    fn test_wander_rerolls_after_interval() {
        let mut wander = WanderMove::new(1.0, 1, 0.5, 11);
        let first = wander.heading();
        wander.on_update_with_highest_priority(0.25);
        assert_eq!(wander.heading(), first);
        wander.on_update_with_highest_priority(0.25);
        assert_eq!(wander.timer, 0.0);
    }

    #[test]
    fn test_face_yaw_payload() {
        let face = FaceYaw::new(90.0, 180.0, 3).with_label("look-east");
        assert_eq!(face.target_yaw(), 90.0);
        assert_eq!(face.turn_speed(), 180.0);
        assert_eq!(TurnProvider::label(&face), "look-east");
    }
}
