//! Resources held by the world.
//!
//! Overview
//! - `camerarig` – follow camera fed by the Brain
//! - `engineconfig` – INI-backed settings
//! - `playerloop` – host phase graph and splicing
//! - `registry` – dense component registry with swap-remove
//! - `systemtable` – batch Systems keyed by type and timing
//! - `timing` – the three update timings
//! - `updatechannel` – per-timing early / post hook lists
//! - `worldtime` – frame and fixed-step clock
pub mod camerarig;
pub mod engineconfig;
pub mod playerloop;
pub mod registry;
pub mod systemtable;
pub mod timing;
pub mod updatechannel;
pub mod worldtime;
