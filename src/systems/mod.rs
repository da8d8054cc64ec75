//! Batch Systems and the machinery that drives them.
//!
//! Submodules overview
//! - [`arbitration`] – highest-priority selection and lifecycle transitions
//! - [`brain`] – per-actor arbitration, composition and pose application
//! - [`camera`] – camera / IK observers and camera smoothing
//! - [`channel`] – player-loop step functions
//! - [`control`] – ticks enabled candidates
//! - [`forces`] – integrates external forces into passive displacement
//! - [`gravity`] – ground probing, vertical integration, ground events
//! - [`order`] – execution order constants
//! - [`registration`] – register / unregister, channel wiring, shutdown
//! - [`time`] – clock advance
//! - [`validation`] – required-component checks

pub mod arbitration;
pub mod brain;
pub mod camera;
pub mod channel;
pub mod control;
pub mod forces;
pub mod gravity;
pub mod order;
pub mod registration;
pub mod time;
pub mod validation;
