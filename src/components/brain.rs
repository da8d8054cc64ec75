//! Brain component: per-actor orchestration state.
//!
//! A [`Brain`] marks an actor as driven by the Brain System at its `timing`.
//! It remembers the previous arbitration winners (one tracker per channel),
//! the axis-freeze policy, and the resulting authority state.

use bevy_ecs::prelude::Component;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::resources::timing::Timing;
use crate::systems::arbitration::PriorityTracker;

/// Axes whose position must not change when the Brain moves the actor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenAxes {
    #[serde(default)]
    pub x: bool,
    #[serde(default)]
    pub y: bool,
    #[serde(default)]
    pub z: bool,
}

impl FrozenAxes {
    pub const NONE: FrozenAxes = FrozenAxes {
        x: false,
        y: false,
        z: false,
    };
    pub const Y: FrozenAxes = FrozenAxes {
        x: false,
        y: true,
        z: false,
    };
    pub const XZ: FrozenAxes = FrozenAxes {
        x: true,
        y: false,
        z: true,
    };

    pub fn any(&self) -> bool {
        self.x || self.y || self.z
    }

    /// Keep `previous` on each frozen axis and `next` on the others.
    pub fn apply(&self, previous: Vec3, next: Vec3) -> Vec3 {
        Vec3::new(
            if self.x { previous.x } else { next.x },
            if self.y { previous.y } else { next.y },
            if self.z { previous.z } else { next.z },
        )
    }
}

/// Whether the actor currently has a winning move / turn request.
///
/// Each channel is its own `Idle -> HasAuthority -> Idle` machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BrainAuthority {
    pub has_move: bool,
    pub has_turn: bool,
}

#[derive(Component, Clone, Debug)]
pub struct Brain {
    pub timing: Timing,
    pub frozen: FrozenAxes,
    pub move_tracker: PriorityTracker,
    pub turn_tracker: PriorityTracker,
    pub authority: BrainAuthority,
    /// Velocity applied on the last tick, for observers and debugging.
    pub last_velocity: Vec3,
}

impl Default for Brain {
    fn default() -> Self {
        Self::new(Timing::Update)
    }
}

impl Brain {
    pub fn new(timing: Timing) -> Self {
        Self {
            timing,
            frozen: FrozenAxes::NONE,
            move_tracker: PriorityTracker::new(),
            turn_tracker: PriorityTracker::new(),
            authority: BrainAuthority::default(),
            last_velocity: Vec3::ZERO,
        }
    }

    pub fn with_frozen(mut self, frozen: FrozenAxes) -> Self {
        self.frozen = frozen;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frozen_y_keeps_previous_height() {
        let previous = Vec3::new(1.0, 2.0, 3.0);
        let next = Vec3::new(4.0, 5.0, 6.0);
        let applied = FrozenAxes::Y.apply(previous, next);
        assert_eq!(applied, Vec3::new(4.0, 2.0, 6.0));
    }

    #[test]
    fn test_none_frozen_passes_through() {
        let next = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(FrozenAxes::NONE.apply(Vec3::ZERO, next), next);
        assert!(!FrozenAxes::NONE.any());
        assert!(FrozenAxes::XZ.any());
    }
}
