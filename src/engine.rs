//! Host driver.
//!
//! [`Engine`] owns the bevy [`World`] and plays the part of the host engine:
//! it keeps the clock, walks the [`PlayerLoop`] once per frame, and runs the
//! FixedUpdate node once per consumed fixed step.
//!
//! # Frame
//!
//! 1. advance [`WorldTime`] by the frame delta and take the owed fixed steps
//! 2. for every node of the player loop, in order, run a snapshot of its steps
//!    (the FixedUpdate node `fixed_steps` times with `fixed_delta`, the others
//!    once with the frame delta)
//!
//! Splicing that happens during a frame is picked up by the next snapshot.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::IntoScheduleConfigs;
use bevy_ecs::system::ScheduleSystem;
use log::info;
use smallvec::SmallVec;

use crate::components::actortransform::ActorTransform;
use crate::components::brain::{Brain, FrozenAxes};
use crate::components::candidates::{MoveCandidates, TurnCandidates};
use crate::components::externalforces::ExternalForces;
use crate::components::gravity::Gravity;
use crate::components::ikrig::IkRig;
use crate::components::passiveeffects::PassiveEffects;
use crate::errors::ConfigError;
use crate::resources::engineconfig::EngineConfig;
use crate::resources::playerloop::{NativeSchedule, PhaseTag, PlayerLoop};
use crate::resources::timing::Timing;
use crate::resources::worldtime::WorldTime;
use crate::systems::brain::BrainSystem;
use crate::systems::camera::{add_brain_observers, smooth_camera_rig};
use crate::systems::channel::run_phase;
use crate::systems::control::ControlSystem;
use crate::systems::forces::ExternalForcesSystem;
use crate::systems::gravity::GravitySystem;
use crate::systems::registration::{
    init_scheduler, register_component, shutdown_scheduler, unregister_everywhere,
};
use crate::systems::time::update_world_time;
use crate::systems::validation::{report_validation, validate_actors};

/// Everything needed to spawn one Brain-driven actor.
pub struct ActorSpec {
    pub transform: ActorTransform,
    pub timing: Timing,
    pub frozen: FrozenAxes,
    pub moves: MoveCandidates,
    pub turns: TurnCandidates,
    pub gravity: Option<Gravity>,
    pub forces: Option<ExternalForces>,
    pub ik: bool,
}

impl ActorSpec {
    pub fn new(timing: Timing) -> Self {
        Self {
            transform: ActorTransform::default(),
            timing,
            frozen: FrozenAxes::NONE,
            moves: MoveCandidates::new(),
            turns: TurnCandidates::new(),
            gravity: None,
            forces: None,
            ik: false,
        }
    }
}

impl Default for ActorSpec {
    fn default() -> Self {
        Self::new(Timing::Update)
    }
}

/// Spawn an actor and register it with the Systems its components need.
pub fn spawn_actor(world: &mut World, spec: ActorSpec) -> Entity {
    let ActorSpec {
        transform,
        timing,
        frozen,
        moves,
        turns,
        gravity,
        forces,
        ik,
    } = spec;

    let mut entity = world.spawn((
        transform,
        Brain::new(timing).with_frozen(frozen),
        moves,
        turns,
        PassiveEffects::new(),
    ));
    if let Some(gravity) = gravity {
        entity.insert(gravity);
    }
    if let Some(forces) = forces {
        entity.insert(forces);
    }
    if ik {
        entity.insert(IkRig::default());
    }
    let actor = entity.id();

    register_component::<ControlSystem>(world, actor, timing);
    register_component::<BrainSystem>(world, actor, timing);
    if gravity.is_some() {
        register_component::<GravitySystem>(world, actor, timing);
    }
    if world.get::<ExternalForces>(actor).is_some() {
        register_component::<ExternalForcesSystem>(world, actor, timing);
    }
    info!("spawned actor {:?} at {}", actor, timing);
    actor
}

/// Unregister `actor` everywhere and despawn it. Returns whether it existed.
pub fn despawn_actor(world: &mut World, actor: Entity) -> bool {
    unregister_everywhere(world, actor);
    world.despawn(actor)
}

pub struct Engine {
    world: World,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(
            WorldTime::default()
                .with_time_scale(config.time_scale)
                .with_fixed_hz(config.fixed_hz)
                .with_max_fixed_steps(config.max_fixed_steps),
        );
        world.insert_resource(config);
        init_scheduler(&mut world);

        for timing in Timing::ALL {
            world.add_schedule(Schedule::new(NativeSchedule(timing)));
        }
        world
            .resource_mut::<Schedules>()
            .add_systems(NativeSchedule(Timing::LateUpdate), smooth_camera_rig);
        add_brain_observers(&mut world);

        Self { world }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Add host-side bevy systems that run after the batch Systems of `timing`.
    pub fn add_systems<M>(
        &mut self,
        timing: Timing,
        systems: impl IntoScheduleConfigs<ScheduleSystem, M>,
    ) -> &mut Self {
        self.world
            .resource_mut::<Schedules>()
            .add_systems(NativeSchedule(timing), systems);
        self
    }

    pub fn spawn_actor(&mut self, spec: ActorSpec) -> Entity {
        spawn_actor(&mut self.world, spec)
    }

    pub fn despawn_actor(&mut self, actor: Entity) -> bool {
        despawn_actor(&mut self.world, actor)
    }

    pub fn validate(&mut self) -> Vec<ConfigError> {
        validate_actors(&mut self.world)
    }

    /// Validate and log; returns the number of problems found.
    pub fn report_validation(&mut self) -> usize {
        report_validation(&mut self.world)
    }

    /// Run one frame of `dt` unscaled seconds.
    pub fn tick(&mut self, dt: f32) {
        let fixed_steps = update_world_time(&mut self.world, dt);
        let (frame_dt, fixed_dt) = {
            let time = self.world.resource::<WorldTime>();
            (time.delta, time.fixed_delta)
        };
        let tags: SmallVec<[PhaseTag; 8]> = match self.world.get_resource::<PlayerLoop>() {
            Some(player_loop) => player_loop.phases().iter().map(|node| node.tag).collect(),
            None => return,
        };
        for tag in tags {
            if tag == PhaseTag::FixedUpdate {
                for _ in 0..fixed_steps {
                    run_phase(&mut self.world, tag, fixed_dt);
                }
            } else {
                run_phase(&mut self.world, tag, frame_dt);
            }
        }
    }

    /// Run `frames` frames of `dt` each.
    pub fn run(&mut self, frames: u32, dt: f32) {
        for _ in 0..frames {
            self.tick(dt);
        }
    }

    /// Detach every update channel and drop all Systems.
    pub fn shutdown(&mut self) {
        shutdown_scheduler(&mut self.world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::systemtable::SystemTable;

    #[test]
    fn test_fixed_update_runs_per_fixed_step() {
        let mut config = EngineConfig::new();
        config.fixed_hz = 10.0;
        let mut engine = Engine::new(config);
        let actor = engine.spawn_actor(ActorSpec {
            transform: ActorTransform::from_xyz(0.0, 0.0, 0.0),
            forces: Some({
                let mut forces = ExternalForces::new();
                forces.velocity = glam::Vec3::X;
                forces
            }),
            ..ActorSpec::new(Timing::FixedUpdate)
        });

        engine.tick(0.25);
        // two fixed steps of 0.1 at 1 unit/s
        let x = engine.world().get::<ActorTransform>(actor).unwrap().position.x;
        assert!((x - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_despawn_unregisters() {
        let mut engine = Engine::new(EngineConfig::new());
        let actor = engine.spawn_actor(ActorSpec::default());
        assert!(engine.despawn_actor(actor));
        assert!(!engine.despawn_actor(actor));
        let table = engine.world().resource::<SystemTable>();
        assert!(table.registry::<BrainSystem>(Timing::Update).unwrap().is_empty());
        engine.tick(0.016);
    }

    #[test]
    fn test_shutdown_clears_systems() {
        let mut engine = Engine::new(EngineConfig::new());
        engine.spawn_actor(ActorSpec {
            gravity: Some(Gravity::default()),
            ..ActorSpec::default()
        });
        assert!(!engine.world().resource::<SystemTable>().is_empty());
        engine.shutdown();
        assert!(engine.world().resource::<SystemTable>().is_empty());
        engine.tick(0.016);
    }
}
