//! Time update.
//!
//! Advances the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per frame, before the player loop runs.
use bevy_ecs::prelude::*;
use log::warn;

use crate::resources::worldtime::WorldTime;

/// Advance `WorldTime` by the unscaled frame delta `dt` and return the number
/// of FixedUpdate steps owed this frame.
pub fn update_world_time(world: &mut World, dt: f32) -> u32 {
    let Some(mut wt) = world.get_resource_mut::<WorldTime>() else {
        warn!("update_world_time: no WorldTime resource");
        return 0;
    };
    wt.advance(dt);
    wt.take_fixed_steps()
}
