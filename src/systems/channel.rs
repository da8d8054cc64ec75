//! Player-loop step callbacks.
//!
//! These are the functions the [`PlayerLoop`] calls. The early and post steps
//! are spliced in by the update channels; the native and host steps come with
//! [`default_player_loop`].
//!
//! Every step that runs Systems checks the [`SystemTable`] out of the world
//! for the duration of the iteration (`resource_scope`), so a System holds
//! `&mut World` and its own registry at the same time. Registration changes
//! made meanwhile are queued and flushed as soon as the step ends.

use bevy_ecs::prelude::*;
use log::{trace, warn};

use crate::resources::playerloop::{
    NativeSchedule, PhaseNode, PhaseStep, PhaseTag, PlayerLoop, StepOwner,
};
use crate::resources::systemtable::{SystemKey, SystemTable};
use crate::resources::timing::Timing;
use crate::resources::updatechannel::UpdateChannels;
use crate::resources::worldtime::WorldTime;
use crate::systems::registration::flush_registrations;

#[derive(Clone, Copy)]
enum Hook {
    Early,
    Post,
}

/// Early step: every early hook of the owner's channel, in registration order.
pub fn run_early_hooks(world: &mut World, owner: StepOwner, dt: f32) {
    let Some(timing) = owner.timing() else {
        return;
    };
    let hooks = match world.get_resource::<UpdateChannels>() {
        Some(channels) => channels.early_hooks(timing),
        None => return,
    };
    run_hooks(world, &hooks, Hook::Early, dt);
}

/// Post step: every post hook of the owner's channel, in registration order.
pub fn run_post_hooks(world: &mut World, owner: StepOwner, dt: f32) {
    let Some(timing) = owner.timing() else {
        return;
    };
    let hooks = match world.get_resource::<UpdateChannels>() {
        Some(channels) => channels.post_hooks(timing),
        None => return,
    };
    run_hooks(world, &hooks, Hook::Post, dt);
}

fn run_hooks(world: &mut World, keys: &[SystemKey], hook: Hook, dt: f32) {
    if keys.is_empty() {
        return;
    }
    let ran = world.try_resource_scope(|world, mut table: Mut<SystemTable>| {
        for key in keys {
            // A key without a System means it was dropped since the snapshot.
            if let Some(instance) = table.instance_mut(*key) {
                match hook {
                    Hook::Early => instance.run_early_update(world, dt),
                    Hook::Post => instance.run_post_update(world, dt),
                }
            }
        }
    });
    if ran.is_none() {
        warn!("system table unavailable, skipped {} hooks", keys.len());
    }
    flush_registrations(world);
}

/// Native-phase work of the Systems living at `timing`, by `(order, creation)`.
pub fn run_batch_systems(world: &mut World, timing: Timing, dt: f32) {
    let keys = match world.get_resource::<SystemTable>() {
        Some(table) => table.ordered_keys(timing),
        None => return,
    };
    if keys.is_empty() {
        return;
    }
    world.try_resource_scope(|world, mut table: Mut<SystemTable>| {
        for key in &keys {
            if let Some(instance) = table.instance_mut(*key) {
                trace!("{}: {} components", instance.kind.name, instance.registry.len());
                instance.run_update(world, dt);
            }
        }
    });
    flush_registrations(world);
}

/// Native step: batch Systems, then the timing's host schedule if one exists.
pub fn run_native_phase(world: &mut World, owner: StepOwner, dt: f32) {
    let Some(timing) = owner.timing() else {
        return;
    };
    if let Some(mut time) = world.get_resource_mut::<WorldTime>() {
        time.step_delta = dt;
    }
    run_batch_systems(world, timing, dt);
    // Absent schedule: nothing host-side to run at this timing.
    let _ = world.try_run_schedule(NativeSchedule(timing));
}

/// Host step at frame start: apply registrations made between frames.
pub fn begin_frame(world: &mut World, _owner: StepOwner, _dt: f32) {
    flush_registrations(world);
}

/// Host step at frame end.
pub fn end_of_frame(world: &mut World, _owner: StepOwner, _dt: f32) {
    flush_registrations(world);
    world.clear_trackers();
}

/// The stock phase graph:
///
/// ```text
/// Initialization : [begin_frame]
/// FixedUpdate    : [native(fixed)]
/// Update         : [native(update)]
/// PreLateUpdate  : [native(late)]
/// PostLateUpdate : [end_of_frame]
/// ```
pub fn default_player_loop() -> PlayerLoop {
    PlayerLoop::new()
        .with_phase(
            PhaseNode::new(PhaseTag::Initialization)
                .with_step(PhaseStep::new(StepOwner::Host("begin_frame"), begin_frame)),
        )
        .with_phase(PhaseNode::new(PhaseTag::FixedUpdate).with_step(PhaseStep::new(
            StepOwner::Native(Timing::FixedUpdate),
            run_native_phase,
        )))
        .with_phase(PhaseNode::new(PhaseTag::Update).with_step(PhaseStep::new(
            StepOwner::Native(Timing::Update),
            run_native_phase,
        )))
        .with_phase(PhaseNode::new(PhaseTag::PreLateUpdate).with_step(PhaseStep::new(
            StepOwner::Native(Timing::LateUpdate),
            run_native_phase,
        )))
        .with_phase(
            PhaseNode::new(PhaseTag::PostLateUpdate)
                .with_step(PhaseStep::new(StepOwner::Host("end_of_frame"), end_of_frame)),
        )
}

/// Run every step of one phase node once, from a snapshot of its steps.
pub fn run_phase(world: &mut World, tag: PhaseTag, dt: f32) {
    let steps = match world.get_resource::<PlayerLoop>() {
        Some(player_loop) => player_loop.snapshot(tag),
        None => return,
    };
    for step in steps {
        (step.run)(world, step.owner, dt);
    }
}
