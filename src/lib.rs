//! Brainstem library.
//!
//! A priority-driven batch update scheduler on top of `bevy_ecs`: Systems own
//! dense registries of actors, hook into a host phase graph at one of three
//! timings, and a Brain System arbitrates competing movement and rotation
//! candidates per actor before applying the winning pose.
//!
//! - [`components`] – actor data: transform, brain, candidates, passive effects
//! - [`engine`] – host driver owning the world and walking the player loop
//! - [`errors`] – error types
//! - [`events`] – priority, camera/IK and ground notifications
//! - [`resources`] – registries, system table, update channels, player loop, time
//! - [`scenario`] – JSON scenario loading
//! - [`systems`] – batch Systems, arbitration, registration and phase steps

pub mod components;
pub mod engine;
pub mod errors;
pub mod events;
pub mod resources;
pub mod scenario;
pub mod systems;
