//! Brain integration tests: priority selection, lifecycle transitions, axis
//! freeze, passive effect composition and the dependent camera / IK hooks,
//! run through full engine frames.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use bevy_ecs::prelude::*;
use glam::Vec3;

use brainstem::components::actortransform::ActorTransform;
use brainstem::components::brain::{Brain, FrozenAxes};
use brainstem::components::candidates::{CandidateId, MoveCandidates, TurnCandidates};
use brainstem::components::externalforces::ExternalForces;
use brainstem::components::gravity::Gravity;
use brainstem::components::ikrig::IkRig;
use brainstem::components::passiveeffects::PassiveEffects;
use brainstem::components::priority::{MoveProvider, Priority, PriorityLifecycle};
use brainstem::components::providers::{ConstantMove, FaceYaw};
use brainstem::engine::{ActorSpec, Engine};
use brainstem::errors::ConfigError;
use brainstem::events::brain::{CameraUpdateEvent, IkUpdateEvent};
use brainstem::events::priority::{ArbitrationChannel, PriorityChange, PriorityChangeEvent};
use brainstem::resources::camerarig::CameraRig;
use brainstem::resources::engineconfig::EngineConfig;
use brainstem::resources::timing::Timing;
use brainstem::systems::arbitration::select_highest_index;
use brainstem::systems::brain::BrainSystem;
use brainstem::systems::registration::register_component;

const EPSILON: f32 = 1e-5;
/// Exact in binary and below the frame clamp.
const DT: f32 = 0.25;

type Log = Arc<Mutex<Vec<String>>>;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec(a: Vec3, b: Vec3) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

/// Move candidate that records its lifecycle callbacks.
struct Probe {
    name: &'static str,
    priority: Arc<AtomicI32>,
    velocity: Vec3,
    log: Log,
}

impl Probe {
    fn new(name: &'static str, priority: i32, velocity: Vec3, log: &Log) -> Self {
        Self {
            name,
            priority: Arc::new(AtomicI32::new(priority)),
            velocity,
            log: log.clone(),
        }
    }
}

impl Priority for Probe {
    fn priority(&self) -> i32 {
        self.priority.load(Ordering::Relaxed)
    }
}

impl PriorityLifecycle for Probe {
    fn on_acquire_highest_priority(&mut self) {
        self.log.lock().unwrap().push(format!("{}.acquire", self.name));
    }

    fn on_lose_highest_priority(&mut self) {
        self.log.lock().unwrap().push(format!("{}.lose", self.name));
    }

    fn on_update_with_highest_priority(&mut self, _dt: f32) {
        self.log.lock().unwrap().push(format!("{}.update", self.name));
    }
}

impl MoveProvider for Probe {
    fn velocity(&self) -> Vec3 {
        self.velocity
    }
}

fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.lock().unwrap())
}

fn record_priority_events(engine: &mut Engine) -> Arc<Mutex<Vec<PriorityChangeEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let world = engine.world_mut();
    world.add_observer(move |trigger: On<PriorityChangeEvent>| {
        sink.lock().unwrap().push(*trigger.event());
    });
    world.flush();
    events
}

fn transform_of(engine: &Engine, actor: Entity) -> ActorTransform {
    *engine.world().get::<ActorTransform>(actor).unwrap()
}

struct Weight(i32);

impl Priority for Weight {
    fn priority(&self) -> i32 {
        self.0
    }
}

fn weights(priorities: &[i32]) -> Vec<Weight> {
    priorities.iter().map(|p| Weight(*p)).collect()
}

#[test]
fn selection_is_strict_and_first_wins_ties() {
    assert_eq!(select_highest_index(&weights(&[0, 3, 3, 5, -1])), Some(3));
    assert_eq!(select_highest_index(&weights(&[0, 0, 0])), None);
    assert_eq!(select_highest_index(&weights(&[3, 3])), Some(0));
    assert_eq!(select_highest_index(&weights(&[-4, -1])), None);
    assert_eq!(select_highest_index(&weights(&[])), None);
}

#[test]
fn three_candidates_disable_the_winner() {
    let log = Log::default();
    let mut engine = Engine::new(EngineConfig::new());
    let events = record_priority_events(&mut engine);

    let mut moves = MoveCandidates::new();
    moves.push(Box::new(Probe::new("C1", 2, Vec3::X, &log)));
    let c2 = moves.push(Box::new(Probe::new("C2", 5, Vec3::Y, &log)));
    let c3 = moves.push(Box::new(Probe::new("C3", 5, Vec3::Z, &log)));
    let actor = engine.spawn_actor(ActorSpec {
        moves,
        ..ActorSpec::new(Timing::Update)
    });

    engine.tick(DT);
    assert_eq!(engine.world().get::<Brain>(actor).unwrap().last_velocity, Vec3::Y);
    assert!(approx_vec(transform_of(&engine, actor).position, Vec3::new(0.0, DT, 0.0)));
    assert_eq!(take(&log), vec!["C2.acquire"]);

    engine
        .world_mut()
        .get_mut::<MoveCandidates>(actor)
        .unwrap()
        .set_enabled(c2, false);
    engine.tick(DT);
    assert_eq!(engine.world().get::<Brain>(actor).unwrap().last_velocity, Vec3::Z);
    assert!(approx_vec(transform_of(&engine, actor).position, Vec3::new(0.0, DT, DT)));
    // C2 left the set rather than losing to a rival: no lose callback.
    assert_eq!(take(&log), vec!["C3.acquire"]);

    let changes: Vec<(CandidateId, PriorityChange)> = events
        .lock()
        .unwrap()
        .iter()
        .map(|ev| {
            assert_eq!(ev.actor, actor);
            assert_eq!(ev.channel, ArbitrationChannel::Move);
            (ev.candidate, ev.change)
        })
        .collect();
    assert_eq!(
        changes,
        vec![(c2, PriorityChange::Acquired), (c3, PriorityChange::Acquired)]
    );
}

#[test]
fn removed_winner_is_not_queried() {
    let log = Log::default();
    let mut engine = Engine::new(EngineConfig::new());
    let mut moves = MoveCandidates::new();
    moves.push(Box::new(Probe::new("C1", 2, Vec3::X, &log)));
    let c2 = moves.push(Box::new(Probe::new("C2", 5, Vec3::Y, &log)));
    let actor = engine.spawn_actor(ActorSpec {
        moves,
        ..ActorSpec::default()
    });

    engine.tick(DT);
    assert!(engine
        .world_mut()
        .get_mut::<MoveCandidates>(actor)
        .unwrap()
        .remove(c2)
        .is_some());
    engine.tick(DT);
    assert_eq!(take(&log), vec!["C2.acquire", "C1.acquire"]);
    assert_eq!(engine.world().get::<Brain>(actor).unwrap().last_velocity, Vec3::X);
}

#[test]
fn lifecycle_follows_winner_sequence() {
    let log = Log::default();
    let mut engine = Engine::new(EngineConfig::new());
    let a = Probe::new("A", 0, Vec3::X, &log);
    let b = Probe::new("B", 0, Vec3::Z, &log);
    let (pa, pb) = (a.priority.clone(), b.priority.clone());
    let actor = engine.spawn_actor(ActorSpec {
        moves: MoveCandidates::new().with(a).with(b),
        ..ActorSpec::default()
    });

    let tick = |engine: &mut Engine, wa: i32, wb: i32| {
        pa.store(wa, Ordering::Relaxed);
        pb.store(wb, Ordering::Relaxed);
        engine.tick(DT);
    };
    tick(&mut engine, 0, 0); // none
    tick(&mut engine, 3, 1); // A
    tick(&mut engine, 3, 1); // A
    tick(&mut engine, 1, 3); // B
    tick(&mut engine, 0, 0); // none

    assert_eq!(
        take(&log),
        vec!["A.acquire", "A.update", "A.lose", "B.acquire", "B.lose"]
    );
    assert!(!engine.world().get::<Brain>(actor).unwrap().authority.has_move);
}

#[test]
fn frozen_axis_keeps_previous_value() {
    let mut engine = Engine::new(EngineConfig::new());
    let actor = engine.spawn_actor(ActorSpec {
        transform: ActorTransform::from_xyz(0.0, 3.0, 0.0),
        frozen: FrozenAxes::Y,
        moves: MoveCandidates::new().with(ConstantMove::new(Vec3::new(1.0, -8.0, 2.0), 1)),
        gravity: Some(Gravity::new(-10.0, 0.0)),
        ..ActorSpec::default()
    });

    engine.tick(DT);
    let position = transform_of(&engine, actor).position;
    assert_eq!(position.y, 3.0);
    assert!(approx_eq(position.x, 0.25));
    assert!(approx_eq(position.z, 0.5));
}

#[test]
fn passive_effects_compose_with_winner() {
    let mut engine = Engine::new(EngineConfig::new());
    let mut forces = ExternalForces::new();
    forces.velocity = Vec3::new(0.0, 0.0, 2.0);
    let actor = engine.spawn_actor(ActorSpec {
        transform: ActorTransform::from_xyz(0.0, 10.0, 0.0),
        moves: MoveCandidates::new().with(ConstantMove::new(Vec3::X, 1)),
        gravity: Some(Gravity::new(-10.0, 0.0)),
        forces: Some(forces),
        ..ActorSpec::default()
    });

    engine.tick(DT);
    // winner 1*0.25 on x, forces 2*0.25 on z, gravity (-10*0.25)*0.25 on y
    assert!(approx_vec(
        transform_of(&engine, actor).position,
        Vec3::new(0.25, 9.375, 0.5)
    ));
    assert_eq!(
        engine.world().get::<PassiveEffects>(actor).unwrap().displacement,
        Vec3::ZERO
    );
}

#[test]
fn camera_then_ik_after_transform_is_written() {
    let mut engine = Engine::new(EngineConfig::new());
    let order = Log::default();
    let actor = engine.spawn_actor(ActorSpec {
        moves: MoveCandidates::new().with(ConstantMove::new(Vec3::X, 1)),
        turns: TurnCandidates::new().with(FaceYaw::new(90.0, 720.0, 1)),
        ik: true,
        ..ActorSpec::default()
    });
    engine.world_mut().insert_resource(CameraRig::following(actor));

    let world = engine.world_mut();
    let sink = order.clone();
    world.add_observer(move |trigger: On<PriorityChangeEvent>| {
        sink.lock()
            .unwrap()
            .push(format!("priority.{:?}", trigger.event().channel));
    });
    let sink = order.clone();
    world.add_observer(
        move |trigger: On<CameraUpdateEvent>, transforms: Query<&ActorTransform>| {
            let ev = trigger.event();
            assert_eq!(transforms.get(ev.actor).unwrap().position, ev.position);
            sink.lock().unwrap().push("camera".to_string());
        },
    );
    let sink = order.clone();
    world.add_observer(move |_trigger: On<IkUpdateEvent>| {
        sink.lock().unwrap().push("ik".to_string());
    });
    world.flush();

    engine.tick(DT);
    assert_eq!(
        take(&order),
        vec!["priority.Move", "priority.Turn", "camera", "ik"]
    );
    engine.tick(DT);
    assert_eq!(take(&order), vec!["camera", "ik"]);

    let transform = transform_of(&engine, actor);
    assert!(approx_eq(transform.yaw, 90.0));
    let rig = engine.world().resource::<CameraRig>();
    assert_eq!(rig.focus, transform.position);
    assert_eq!(rig.focus_yaw, transform.yaw);
    let ik = engine.world().get::<IkRig>(actor).unwrap();
    assert_eq!(ik.updates, 2);
    assert!(approx_eq(ik.stride_distance, 0.5));
}

#[test]
fn actor_without_transform_is_skipped() {
    let mut engine = Engine::new(EngineConfig::new());
    let healthy = engine.spawn_actor(ActorSpec {
        moves: MoveCandidates::new().with(ConstantMove::new(Vec3::X, 1)),
        ..ActorSpec::default()
    });
    let world = engine.world_mut();
    let broken = world
        .spawn((
            Brain::new(Timing::Update),
            MoveCandidates::new().with(ConstantMove::new(Vec3::X, 1)),
            PassiveEffects::new(),
        ))
        .id();
    register_component::<BrainSystem>(world, broken, Timing::Update);

    assert_eq!(
        engine.validate(),
        vec![ConfigError::MissingComponent {
            actor: broken,
            component: "ActorTransform"
        }]
    );

    engine.run(2, DT);
    assert!(approx_eq(transform_of(&engine, healthy).position.x, 0.5));
    assert!(engine.world().get::<ActorTransform>(broken).is_none());
}

#[test]
fn late_update_brain_sees_update_effects() {
    let mut engine = Engine::new(EngineConfig::new());
    let late = engine.spawn_actor(ActorSpec {
        moves: MoveCandidates::new().with(ConstantMove::new(Vec3::Z, 4)),
        ..ActorSpec::new(Timing::LateUpdate)
    });
    let update = engine.spawn_actor(ActorSpec {
        moves: MoveCandidates::new().with(ConstantMove::new(Vec3::X, 4)),
        ..ActorSpec::new(Timing::Update)
    });

    engine.tick(DT);
    assert!(approx_eq(transform_of(&engine, late).position.z, DT));
    assert!(approx_eq(transform_of(&engine, update).position.x, DT));
}
