//! Events triggered by the Brain and the effect Systems.
//!
//! - [`brain`] – camera and IK updates fired after a pose is applied
//! - [`ground`] – landing / leaving notifications delivered over channels
//! - [`priority`] – candidate acquisition and loss
pub mod brain;
pub mod ground;
pub mod priority;
