//! Brainstem demo driver.
//!
//! Loads `config.ini`, builds an [`Engine`], spawns the actors of a JSON
//! scenario (or a single built-in wanderer), and simulates a fixed number of
//! frames headlessly, logging where every actor ended up.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --scenario assets/scenarios/patrol.json --frames 600
//! RUST_LOG=debug cargo run -- --validate
//! ```

use std::path::PathBuf;

use bevy_ecs::prelude::*;
use clap::Parser;
use glam::Vec3;

use brainstem::components::actortransform::ActorTransform;
use brainstem::components::brain::Brain;
use brainstem::components::candidates::{MoveCandidates, TurnCandidates};
use brainstem::components::gravity::Gravity;
use brainstem::components::providers::{ConstantMove, FaceYaw, WanderMove};
use brainstem::engine::{ActorSpec, Engine};
use brainstem::resources::camerarig::CameraRig;
use brainstem::resources::engineconfig::EngineConfig;
use brainstem::scenario::load_scenario;

/// Brainstem: priority-arbitrated actor scheduling, headless.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// JSON scenario to spawn. A single demo actor is used when omitted.
    #[arg(long, value_name = "PATH")]
    scenario: Option<PathBuf>,

    /// Frames to simulate; overrides `[run] frames`.
    #[arg(long)]
    frames: Option<u32>,

    /// Frame delta in seconds; overrides `[run] frame_dt`.
    #[arg(long)]
    dt: Option<f32>,

    /// Validate the spawned actors and exit.
    #[arg(long)]
    validate: bool,

    /// Write the effective configuration back to the config file and exit.
    #[arg(long)]
    write_config: bool,
}

fn demo_actor(config: &EngineConfig) -> ActorSpec {
    ActorSpec {
        transform: ActorTransform::from_xyz(0.0, 2.0, 0.0),
        moves: MoveCandidates::new()
            .with(ConstantMove::new(Vec3::new(1.0, 0.0, 0.0), 1).with_label("stroll"))
            .with(WanderMove::new(2.0, 2, 1.5, 7)),
        turns: TurnCandidates::new().with(FaceYaw::new(90.0, 120.0, 1)),
        gravity: Some(Gravity::new(config.gravity, config.ground_height)),
        ik: true,
        ..ActorSpec::new(config.brain_timing)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = EngineConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        log::warn!("{}; using defaults", e);
    }
    if let Some(frames) = cli.frames {
        config.frames = frames;
    }
    if let Some(dt) = cli.dt {
        config.frame_dt = dt;
    }

    if cli.write_config {
        if let Err(e) = config.save_to_file() {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        println!("config written to {}", config.config_path.display());
        return;
    }

    let frames = config.frames;
    let frame_dt = config.frame_dt;
    let mut engine = Engine::new(config.clone());

    match &cli.scenario {
        Some(path) => {
            let spawned = load_scenario(path).and_then(|scenario| scenario.spawn(engine.world_mut()));
            if let Err(e) = spawned {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        None => {
            let actor = engine.spawn_actor(demo_actor(&config));
            engine.world_mut().insert_resource(CameraRig::following(actor));
        }
    }

    let problems = engine.report_validation();
    if cli.validate {
        if problems > 0 {
            std::process::exit(1);
        }
        println!("all actors valid");
        return;
    }

    log::info!("simulating {} frames of {:.4}s", frames, frame_dt);
    engine.run(frames, frame_dt);

    let world = engine.world_mut();
    let mut poses = world.query::<(Entity, &ActorTransform, &Brain)>();
    for (actor, transform, brain) in poses.iter(world) {
        log::info!(
            "{:?} [{}] at ({:.3}, {:.3}, {:.3}) yaw {:.1}, velocity {:?}",
            actor,
            brain.timing,
            transform.position.x,
            transform.position.y,
            transform.position.z,
            transform.yaw,
            brain.last_velocity
        );
    }
    if let Some(rig) = world.get_resource::<CameraRig>() {
        log::info!("camera at {:?} looking at {:?}", rig.position, rig.focus);
    }

    engine.shutdown();
}
