//! JSON scenario loading.
//!
//! A scenario lists actors with their pose, timing, passive effects and
//! candidates. [`Scenario::spawn`] turns it into Brain-driven actors through
//! [`spawn_actor`](crate::engine::spawn_actor).
//!
//! ```json
//! {
//!   "name": "patrol",
//!   "camera_target": 0,
//!   "actors": [{
//!     "name": "walker",
//!     "position": [0.0, 1.0, 0.0],
//!     "frozen": { "y": false },
//!     "gravity": {},
//!     "moves": [
//!       { "type": "constant", "velocity": [1.0, 0.0, 0.0], "priority": 1 },
//!       { "type": "window", "velocity": [0.0, 0.0, 2.0], "priority": 5, "start": 1.0, "end": 2.0 }
//!     ],
//!     "turns": [{ "type": "face", "yaw": 90.0, "speed": 180.0, "priority": 1 }]
//!   }]
//! }
//! ```

use std::path::Path;

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::info;
use serde::{Deserialize, Serialize};

use crate::components::actortransform::ActorTransform;
use crate::components::brain::FrozenAxes;
use crate::components::candidates::{MoveCandidates, TurnCandidates};
use crate::components::externalforces::ExternalForces;
use crate::components::gravity::Gravity;
use crate::components::providers::{ActiveWindow, ConstantMove, FaceYaw, WanderMove};
use crate::engine::{ActorSpec, spawn_actor};
use crate::errors::ScenarioError;
use crate::resources::camerarig::CameraRig;
use crate::resources::engineconfig::EngineConfig;
use crate::resources::timing::Timing;

const DEFAULT_WANDER_SEED: u64 = 0x5eed;

fn default_interval() -> f32 {
    1.0
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    /// Index into `actors` of the actor the camera follows.
    #[serde(default)]
    pub camera_target: Option<usize>,
    pub actors: Vec<ActorDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub yaw: f32,
    /// `update`, `fixed_update` or `late_update`; the configured brain timing when absent.
    #[serde(default)]
    pub timing: Option<String>,
    #[serde(default)]
    pub frozen: FrozenAxes,
    #[serde(default)]
    pub gravity: Option<GravityDef>,
    #[serde(default)]
    pub forces: Option<ForcesDef>,
    #[serde(default)]
    pub moves: Vec<MoveDef>,
    #[serde(default)]
    pub turns: Vec<TurnDef>,
    #[serde(default)]
    pub ik: bool,
}

/// Gravity overrides; missing values come from [`EngineConfig`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GravityDef {
    #[serde(default)]
    pub acceleration: Option<f32>,
    #[serde(default)]
    pub ground_height: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForcesDef {
    #[serde(default)]
    pub velocity: Vec3,
    #[serde(default)]
    pub friction: f32,
    #[serde(default)]
    pub max_speed: Option<f32>,
    #[serde(default)]
    pub forces: Vec<NamedForce>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedForce {
    pub name: String,
    pub value: Vec3,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoveDef {
    Constant {
        velocity: Vec3,
        priority: i32,
        #[serde(default)]
        label: Option<String>,
    },
    Window {
        velocity: Vec3,
        priority: i32,
        start: f32,
        end: f32,
        #[serde(default)]
        label: Option<String>,
    },
    Wander {
        speed: f32,
        priority: i32,
        #[serde(default = "default_interval")]
        interval: f32,
        #[serde(default)]
        seed: Option<u64>,
        #[serde(default)]
        label: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnDef {
    Face {
        yaw: f32,
        speed: f32,
        priority: i32,
        #[serde(default)]
        label: Option<String>,
    },
    Window {
        yaw: f32,
        speed: f32,
        priority: i32,
        start: f32,
        end: f32,
        #[serde(default)]
        label: Option<String>,
    },
}

impl MoveDef {
    fn build(&self, seed: u64) -> MoveBuilt {
        match self {
            MoveDef::Constant {
                velocity,
                priority,
                label,
            } => {
                let mv = ConstantMove::new(*velocity, *priority);
                MoveBuilt::Constant(match label {
                    Some(label) => mv.with_label(label.clone()),
                    None => mv,
                })
            }
            MoveDef::Window {
                velocity,
                priority,
                start,
                end,
                label,
            } => {
                let mv = ConstantMove::new(*velocity, *priority)
                    .with_window(ActiveWindow::new(*start, *end))
                    .with_label(label.clone().unwrap_or_else(|| "window".to_string()));
                MoveBuilt::Constant(mv)
            }
            MoveDef::Wander {
                speed,
                priority,
                interval,
                seed: own_seed,
                label,
            } => {
                let mv = WanderMove::new(*speed, *priority, *interval, own_seed.unwrap_or(seed));
                MoveBuilt::Wander(match label {
                    Some(label) => mv.with_label(label.clone()),
                    None => mv,
                })
            }
        }
    }
}

enum MoveBuilt {
    Constant(ConstantMove),
    Wander(WanderMove),
}

impl TurnDef {
    fn build(&self) -> FaceYaw {
        match self {
            TurnDef::Face {
                yaw,
                speed,
                priority,
                label,
            } => {
                let turn = FaceYaw::new(*yaw, *speed, *priority);
                match label {
                    Some(label) => turn.with_label(label.clone()),
                    None => turn,
                }
            }
            TurnDef::Window {
                yaw,
                speed,
                priority,
                start,
                end,
                label,
            } => FaceYaw::new(*yaw, *speed, *priority)
                .with_window(ActiveWindow::new(*start, *end))
                .with_label(label.clone().unwrap_or_else(|| "window".to_string())),
        }
    }
}

impl ActorDef {
    fn resolve_timing(&self, fallback: Timing) -> Result<Timing, ScenarioError> {
        match &self.timing {
            None => Ok(fallback),
            Some(name) => Timing::from_name(name).ok_or_else(|| ScenarioError::UnknownTiming(name.clone())),
        }
    }

    fn to_spec(&self, timing: Timing, config: &EngineConfig, seed: u64) -> ActorSpec {
        let mut moves = MoveCandidates::new();
        for (offset, def) in self.moves.iter().enumerate() {
            match def.build(seed + offset as u64) {
                MoveBuilt::Constant(mv) => moves.push(Box::new(mv)),
                MoveBuilt::Wander(mv) => moves.push(Box::new(mv)),
            };
        }
        let mut turns = TurnCandidates::new();
        for def in &self.turns {
            turns.push(Box::new(def.build()));
        }

        let gravity = self.gravity.as_ref().map(|def| {
            Gravity::new(
                def.acceleration.unwrap_or(config.gravity),
                def.ground_height.unwrap_or(config.ground_height),
            )
        });
        let forces = self.forces.as_ref().map(|def| {
            let mut forces = ExternalForces::with_physics(def.friction, def.max_speed);
            forces.velocity = def.velocity;
            for force in &def.forces {
                forces.add_force_with_state(&force.name, force.value, force.enabled);
            }
            forces
        });

        ActorSpec {
            transform: ActorTransform::new(self.position, self.yaw),
            timing,
            frozen: self.frozen,
            moves,
            turns,
            gravity,
            forces,
            ik: self.ik,
        }
    }
}

impl Scenario {
    /// Spawn every actor. Timings are checked up front, so an invalid
    /// scenario spawns nothing.
    pub fn spawn(&self, world: &mut World) -> Result<Vec<Entity>, ScenarioError> {
        let config = world
            .get_resource::<EngineConfig>()
            .cloned()
            .unwrap_or_default();
        let timings = self
            .actors
            .iter()
            .map(|actor| actor.resolve_timing(config.brain_timing))
            .collect::<Result<Vec<_>, _>>()?;

        let mut spawned = Vec::with_capacity(self.actors.len());
        for (index, (def, timing)) in self.actors.iter().zip(timings).enumerate() {
            let seed = DEFAULT_WANDER_SEED + (index as u64) * 100;
            let actor = spawn_actor(world, def.to_spec(timing, &config, seed));
            spawned.push(actor);
        }

        if let Some(target) = self.camera_target.and_then(|index| spawned.get(index)) {
            world.insert_resource(CameraRig::following(*target));
        }
        info!(
            "scenario '{}': spawned {} actors",
            self.name,
            spawned.len()
        );
        Ok(spawned)
    }
}

pub fn parse_scenario(text: &str) -> Result<Scenario, ScenarioError> {
    Ok(serde_json::from_str(text)?)
}

pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario, ScenarioError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let scenario = parse_scenario(&text)?;
    info!("loaded scenario '{}' from {:?}", scenario.name, path.as_ref());
    Ok(scenario)
}
