//! Arbitration transition events.
//!
//! After the lifecycle callbacks of a tick have run, the Brain System triggers
//! a [`PriorityChangeEvent`] for every callback that actually fired on the
//! acquire or lose side. Held winners produce no event.
//!
//! ```ignore
//! world.add_observer(|trigger: On<PriorityChangeEvent>| {
//!     let ev = trigger.event();
//!     log::info!("{:?} {:?} {:?}", ev.actor, ev.channel, ev.change);
//! });
//! ```

use bevy_ecs::prelude::*;

use crate::components::candidates::CandidateId;

/// Which arbitration produced the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArbitrationChannel {
    Move,
    Turn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriorityChange {
    Acquired,
    Lost,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityChangeEvent {
    pub actor: Entity,
    pub channel: ArbitrationChannel,
    pub candidate: CandidateId,
    pub change: PriorityChange,
}
