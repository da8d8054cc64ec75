//! Public registration entry points.
//!
//! Any component that wants batch processing calls [`register_component`] with
//! the System kind and timing it belongs to, and [`unregister_component`] when
//! it becomes inactive. Both are safe to call at any time:
//!
//! - outside of System execution they apply immediately
//! - while Systems are running (the [`SystemTable`] is checked out of the
//!   world) they are queued and applied right after the current iteration
//!
//! The first registration that creates a System with early or post hooks also
//! wires its timing's [`UpdateChannel`](crate::resources::updatechannel::UpdateChannel)
//! into the [`PlayerLoop`]. If the player loop lacks the node for that timing
//! the channel is marked faulted; other channels keep working.
//!
//! Registered entities carry the [`Scheduled`] marker. Despawning the entity
//! (or removing the marker) unregisters it from every System.

use std::any::TypeId;

use bevy_ecs::lifecycle::Remove;
use bevy_ecs::prelude::*;
use log::{debug, error, info, warn};

use crate::components::scheduled::Scheduled;
use crate::errors::SchedulerError;
use crate::resources::playerloop::PlayerLoop;
use crate::resources::systemtable::{
    BatchSystem, HookCaps, RegistrationCommand, RegistrationQueue, SystemKey, SystemKind,
    SystemTable,
};
use crate::resources::timing::Timing;
use crate::resources::updatechannel::{ChannelState, UpdateChannels};
use crate::systems::channel::{default_player_loop, run_early_hooks, run_post_hooks};

/// Insert the scheduler resources. A player loop already in the world is kept.
pub fn init_scheduler(world: &mut World) {
    world.init_resource::<SystemTable>();
    world.init_resource::<UpdateChannels>();
    world.init_resource::<RegistrationQueue>();
    if !world.contains_resource::<PlayerLoop>() {
        world.insert_resource(default_player_loop());
    }
    world.add_observer(unregister_on_removal);
    world.flush();
    info!("scheduler initialized");
}

/// Observer: the [`Scheduled`] marker left its entity.
fn unregister_on_removal(trigger: On<Remove, Scheduled>, mut commands: Commands) {
    let component = trigger.event().entity;
    commands.queue(move |world: &mut World| unregister_everywhere(world, component));
}

/// Register `component` with the `S` System at `timing`.
pub fn register_component<S: BatchSystem + Default>(world: &mut World, component: Entity, timing: Timing) {
    register_kind(world, SystemKind::of::<S>(), component, timing);
}

/// Unregister `component` from the `S` System at `timing`.
///
/// Not registered, or no such System yet: nothing happens.
pub fn unregister_component<S: BatchSystem>(world: &mut World, component: Entity, timing: Timing) {
    unregister_type(world, TypeId::of::<S>(), component, timing);
}

/// Type-erased form of [`register_component`].
pub fn register_kind(world: &mut World, kind: SystemKind, component: Entity, timing: Timing) {
    match world.get_entity_mut(component) {
        Ok(mut entity) => {
            if !entity.contains::<Scheduled>() {
                entity.insert(Scheduled);
            }
        }
        Err(_) => warn!("registering {:?} which is not alive", component),
    }
    let command = RegistrationCommand::Register {
        kind,
        component,
        timing,
    };
    if world.contains_resource::<SystemTable>() {
        apply_command(world, command);
    } else {
        defer(world, command);
    }
}

/// Type-erased form of [`unregister_component`].
pub fn unregister_type(world: &mut World, type_id: TypeId, component: Entity, timing: Timing) {
    let command = RegistrationCommand::Unregister {
        type_id,
        component,
        timing,
    };
    if world.contains_resource::<SystemTable>() {
        apply_command(world, command);
    } else {
        defer(world, command);
    }
}

/// Remove `component` from every System it is registered with.
pub fn unregister_everywhere(world: &mut World, component: Entity) {
    let command = RegistrationCommand::UnregisterAll { component };
    if world.contains_resource::<SystemTable>() {
        apply_command(world, command);
    } else {
        defer(world, command);
    }
}

fn defer(world: &mut World, command: RegistrationCommand) {
    match world.get_resource_mut::<RegistrationQueue>() {
        Some(mut queue) => {
            debug!("deferred {:?}", command);
            queue.push(command);
        }
        None => warn!("scheduler not initialized, dropping {:?}", command),
    }
}

/// Apply every queued registration change. Does nothing while the table is
/// still checked out. Returns the number of commands applied.
pub fn flush_registrations(world: &mut World) -> usize {
    if !world.contains_resource::<SystemTable>() {
        return 0;
    }
    let mut applied = 0;
    loop {
        let commands = match world.get_resource_mut::<RegistrationQueue>() {
            Some(mut queue) if !queue.is_empty() => queue.drain(),
            _ => break,
        };
        for command in commands {
            apply_command(world, command);
            applied += 1;
        }
    }
    if applied > 0 {
        debug!("applied {} deferred registration changes", applied);
    }
    applied
}

fn apply_command(world: &mut World, command: RegistrationCommand) {
    match command {
        RegistrationCommand::Register {
            kind,
            component,
            timing,
        } => {
            let registration = {
                let Some(mut table) = world.get_resource_mut::<SystemTable>() else {
                    return;
                };
                table.register(kind, component, timing)
            };
            if registration.created && registration.capabilities.any() {
                let key = SystemKey {
                    type_id: kind.type_id,
                    timing,
                };
                wire_hooks(world, key, registration.capabilities);
            }
        }
        RegistrationCommand::Unregister {
            type_id,
            component,
            timing,
        } => {
            if let Some(mut table) = world.get_resource_mut::<SystemTable>() {
                if table.unregister(type_id, component, timing).is_none() {
                    debug!("unregister {:?} at {}: not registered", component, timing);
                }
            }
        }
        RegistrationCommand::UnregisterAll { component } => {
            if let Some(mut table) = world.get_resource_mut::<SystemTable>() {
                let removed = table.unregister_everywhere(component);
                debug!("unregistered {:?} from {} systems", component, removed);
            }
        }
    }
}

/// Add a freshly created System to its timing's channel and attach the
/// channel on first use.
fn wire_hooks(world: &mut World, key: SystemKey, caps: HookCaps) {
    let needs_attach = {
        let Some(mut channels) = world.get_resource_mut::<UpdateChannels>() else {
            error!("no update channels resource; {:?} hooks will never run", key);
            return;
        };
        let (channel, _) = channels.get_or_create(key.timing);
        channel.register(key, caps);
        channel.state == ChannelState::Detached
    };
    if needs_attach {
        // Failure is recorded on the channel and logged.
        let _ = attach_channel(world, key.timing);
    }
}

/// Splice the `timing` channel's early and post steps into the player loop.
///
/// On failure the channel becomes [`ChannelState::Faulted`] for good.
pub fn attach_channel(world: &mut World, timing: Timing) -> Result<(), SchedulerError> {
    let result = match world.get_resource_mut::<PlayerLoop>() {
        Some(mut player_loop) => player_loop.splice(timing, run_early_hooks, run_post_hooks),
        None => Err(SchedulerError::NotInitialized),
    };
    let state = match &result {
        Ok(()) => ChannelState::Attached,
        Err(err) => {
            error!("{} update channel faulted: {}", timing, err);
            ChannelState::Faulted(err.to_string())
        }
    };
    if let Some(mut channels) = world.get_resource_mut::<UpdateChannels>() {
        let (channel, _) = channels.get_or_create(timing);
        channel.state = state;
    }
    result
}

/// Detach every channel from the player loop and drop all Systems, channels,
/// and pending commands.
pub fn shutdown_scheduler(world: &mut World) {
    if let Some(mut player_loop) = world.get_resource_mut::<PlayerLoop>() {
        for timing in Timing::ALL {
            player_loop.detach(timing);
        }
    }
    if let Some(mut channels) = world.get_resource_mut::<UpdateChannels>() {
        channels.clear();
    }
    if let Some(mut queue) = world.get_resource_mut::<RegistrationQueue>() {
        queue.clear();
    }
    if let Some(mut table) = world.get_resource_mut::<SystemTable>() {
        let systems = table.len();
        table.clear();
        info!("scheduler shut down, dropped {} systems", systems);
    }
}
