//! Components attached to actors.
//!
//! Submodules overview:
//! - [`actortransform`] – position and yaw, written only by the Brain
//! - [`brain`] – per-actor orchestration state and frozen axes
//! - [`candidates`] – ordered candidate sets with enable flags
//! - [`externalforces`] – named accelerations, friction and speed cap
//! - [`gravity`] – vertical acceleration against a ground plane
//! - [`ikrig`] – pose data refreshed after the Brain applies a transform
//! - [`passiveeffects`] – displacement accumulated by effect Systems
//! - [`priority`] – priority and lifecycle traits for candidates
//! - [`providers`] – stock move and turn candidates
//! - [`scheduled`] – marker that ties registrations to the entity's lifetime

pub mod actortransform;
pub mod brain;
pub mod candidates;
pub mod externalforces;
pub mod gravity;
pub mod ikrig;
pub mod passiveeffects;
pub mod priority;
pub mod providers;
pub mod scheduled;
