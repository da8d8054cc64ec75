//! Engine configuration resource.
//!
//! Settings loaded from an INI file. Defaults are safe to run with, and any
//! key missing from the file keeps its current value.
//!
//! # Configuration File Format
//!
//! ```ini
//! [time]
//! fixed_hz = 50
//! time_scale = 1.0
//! max_fixed_steps = 8
//!
//! [brain]
//! timing = update
//!
//! [gravity]
//! acceleration = -9.81
//! ground_height = 0.0
//!
//! [run]
//! frames = 240
//! frame_dt = 0.016666
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

use crate::resources::timing::Timing;

const DEFAULT_FIXED_HZ: f32 = 50.0;
const DEFAULT_TIME_SCALE: f32 = 1.0;
const DEFAULT_MAX_FIXED_STEPS: u32 = 8;
const DEFAULT_BRAIN_TIMING: Timing = Timing::Update;
const DEFAULT_GRAVITY: f32 = -9.81;
const DEFAULT_GROUND_HEIGHT: f32 = 0.0;
const DEFAULT_FRAMES: u32 = 240;
const DEFAULT_FRAME_DT: f32 = 1.0 / 60.0;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

#[derive(Resource, Debug, Clone)]
pub struct EngineConfig {
    /// FixedUpdate rate in steps per second.
    pub fixed_hz: f32,
    /// Multiplier applied to every frame delta.
    pub time_scale: f32,
    /// Upper bound of FixedUpdate steps per frame.
    pub max_fixed_steps: u32,
    /// Timing used by actors that do not choose one.
    pub brain_timing: Timing,
    /// Vertical acceleration for new gravity components (units/s²).
    pub gravity: f32,
    /// Default ground plane height.
    pub ground_height: f32,
    /// Frames simulated by the demo binary.
    pub frames: u32,
    /// Frame delta used by the demo binary.
    pub frame_dt: f32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            fixed_hz: DEFAULT_FIXED_HZ,
            time_scale: DEFAULT_TIME_SCALE,
            max_fixed_steps: DEFAULT_MAX_FIXED_STEPS,
            brain_timing: DEFAULT_BRAIN_TIMING,
            gravity: DEFAULT_GRAVITY,
            ground_height: DEFAULT_GROUND_HEIGHT,
            frames: DEFAULT_FRAMES,
            frame_dt: DEFAULT_FRAME_DT,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values. Returns an error if the
    /// file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply_ini(&config);

        info!(
            "Loaded config: fixed_hz={}, time_scale={}, brain timing={}, gravity={}, frames={}",
            self.fixed_hz, self.time_scale, self.brain_timing, self.gravity, self.frames
        );
        Ok(())
    }

    /// Parse configuration from INI text. Used by tests and embedded defaults.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply_ini(&config);
        Ok(())
    }

    fn apply_ini(&mut self, config: &Ini) {
        // [time] section
        if let Some(hz) = config.getfloat("time", "fixed_hz").ok().flatten() {
            if hz > 0.0 {
                self.fixed_hz = hz as f32;
            } else {
                warn!("config: ignoring non-positive fixed_hz {}", hz);
            }
        }
        if let Some(scale) = config.getfloat("time", "time_scale").ok().flatten() {
            self.time_scale = scale as f32;
        }
        if let Some(steps) = config.getuint("time", "max_fixed_steps").ok().flatten() {
            self.max_fixed_steps = steps as u32;
        }

        // [brain] section
        if let Some(name) = config.get("brain", "timing") {
            match Timing::from_name(&name) {
                Some(timing) => self.brain_timing = timing,
                None => warn!("config: unknown brain timing '{}', keeping {}", name, self.brain_timing),
            }
        }

        // [gravity] section
        if let Some(g) = config.getfloat("gravity", "acceleration").ok().flatten() {
            self.gravity = g as f32;
        }
        if let Some(h) = config.getfloat("gravity", "ground_height").ok().flatten() {
            self.ground_height = h as f32;
        }

        // [run] section
        if let Some(frames) = config.getuint("run", "frames").ok().flatten() {
            self.frames = frames as u32;
        }
        if let Some(dt) = config.getfloat("run", "frame_dt").ok().flatten() {
            self.frame_dt = dt as f32;
        }
    }

    /// Save configuration to the INI file, creating it if needed.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("time", "fixed_hz", Some(self.fixed_hz.to_string()));
        config.set("time", "time_scale", Some(self.time_scale.to_string()));
        config.set("time", "max_fixed_steps", Some(self.max_fixed_steps.to_string()));
        config.set("brain", "timing", Some(self.brain_timing.name().to_string()));
        config.set("gravity", "acceleration", Some(self.gravity.to_string()));
        config.set("gravity", "ground_height", Some(self.ground_height.to_string()));
        config.set("run", "frames", Some(self.frames.to_string()));
        config.set("run", "frame_dt", Some(self.frame_dt.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}
