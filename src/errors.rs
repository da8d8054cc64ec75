//! Error types shared across the scheduler, validation, and scenario loading.
//!
//! Only host-integration failures and I/O surface as `Err`. Recoverable
//! conditions such as a double unregister are absorbed where they happen and
//! at most logged.

use bevy_ecs::entity::Entity;
use thiserror::Error;

use crate::resources::playerloop::PhaseTag;
use crate::resources::timing::Timing;

/// Failures while wiring update channels into the host phase graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("phase {tag:?} not found in the player loop (needed by the {timing:?} channel)")]
    PhaseNotFound { tag: PhaseTag, timing: Timing },

    #[error("scheduler resources are not initialized; call init_scheduler first")]
    NotInitialized,
}

/// Actor setup problems found by [`validate_actors`](crate::systems::validation::validate_actors).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("actor {actor:?} is missing required component {component}")]
    MissingComponent {
        actor: Entity,
        component: &'static str,
    },

    #[error("actor {actor:?} has {component} but no PassiveEffects to write into")]
    UnusedEffect {
        actor: Entity,
        component: &'static str,
    },
}

/// Failures while reading a scenario file.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown timing '{0}' (expected update, fixed_update or late_update)")]
    UnknownTiming(String),
}
