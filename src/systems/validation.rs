//! Startup validation of actor setups.
//!
//! Finds configuration mistakes before the first tick so they can be reported
//! loudly instead of surfacing as an actor that silently never moves. Nothing
//! here mutates the world or aborts; the engine logs what it finds and runs
//! anyway, skipping what cannot work.

use bevy_ecs::prelude::*;
use log::{error, info, warn};

use crate::components::actortransform::ActorTransform;
use crate::components::brain::Brain;
use crate::components::externalforces::ExternalForces;
use crate::components::gravity::Gravity;
use crate::components::passiveeffects::PassiveEffects;
use crate::errors::ConfigError;

fn missing<T: Component, R: Component>(world: &mut World, component: &'static str) -> Vec<ConfigError> {
    world
        .query_filtered::<Entity, (With<T>, Without<R>)>()
        .iter(world)
        .map(|actor| ConfigError::MissingComponent { actor, component })
        .collect()
}

fn unused<T: Component>(world: &mut World, component: &'static str) -> Vec<ConfigError> {
    world
        .query_filtered::<Entity, (With<T>, Without<PassiveEffects>)>()
        .iter(world)
        .map(|actor| ConfigError::UnusedEffect { actor, component })
        .collect()
}

/// Every configuration error in the world, ordered by actor.
pub fn validate_actors(world: &mut World) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    errors.extend(missing::<Brain, ActorTransform>(world, "ActorTransform"));
    errors.extend(missing::<Brain, PassiveEffects>(world, "PassiveEffects"));
    errors.extend(missing::<Gravity, ActorTransform>(world, "ActorTransform"));
    errors.extend(unused::<Gravity>(world, "Gravity"));
    errors.extend(unused::<ExternalForces>(world, "ExternalForces"));
    errors.sort_by_key(|err| match err {
        ConfigError::MissingComponent { actor, .. } | ConfigError::UnusedEffect { actor, .. } => *actor,
    });
    errors.dedup();
    errors
}

/// Run [`validate_actors`] and log the outcome. Returns the error count.
pub fn report_validation(world: &mut World) -> usize {
    let errors = validate_actors(world);
    for err in &errors {
        match err {
            ConfigError::MissingComponent { .. } => error!("config: {}", err),
            ConfigError::UnusedEffect { .. } => warn!("config: {}", err),
        }
    }
    if errors.is_empty() {
        info!("config: all actors valid");
    }
    errors.len()
}
