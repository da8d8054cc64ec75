//! Gravity System.
//!
//! Uses all three hooks of its timing:
//!
//! - early: probe the ground for every actor and queue landing / leaving
//!   transitions against the previous probe
//! - native: integrate vertical velocity into [`PassiveEffects`]
//! - post: deliver the queued [`GroundEvent`]s to subscribers
//!
//! The previous probe result lives in a buffer parallel to the registry,
//! kept aligned through the register/unregister hooks. Subscriptions are
//! explicit crossbeam channels handed out by [`subscribe_ground_events`] and
//! dropped together with the actor's registration.

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender};
use glam::Vec3;
use log::{debug, trace};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::components::actortransform::ActorTransform;
use crate::components::gravity::Gravity;
use crate::components::passiveeffects::PassiveEffects;
use crate::events::ground::GroundEvent;
use crate::resources::systemtable::{BatchSystem, HookCaps, SystemTable};
use crate::resources::timing::Timing;
use crate::systems::order;

/// Heights within this distance of the ground count as grounded.
const GROUND_TOLERANCE: f32 = 1e-4;

type GravityQuery = (
    &'static mut Gravity,
    &'static ActorTransform,
    Option<&'static mut PassiveEffects>,
);

#[derive(Default)]
pub struct GravitySystem {
    /// Last probe per registry slot; `None` until the first probe.
    was_grounded: Vec<Option<bool>>,
    pending: Vec<GroundEvent>,
    subscribers: FxHashMap<Entity, SmallVec<[Sender<GroundEvent>; 1]>>,
    query: Option<QueryState<GravityQuery>>,
}

impl GravitySystem {
    /// Open a ground-event channel for `actor`.
    pub fn subscribe(&mut self, actor: Entity) -> Receiver<GroundEvent> {
        let (sender, receiver) = crossbeam_channel::unbounded();
        self.subscribers.entry(actor).or_default().push(sender);
        receiver
    }
}

impl BatchSystem for GravitySystem {
    fn name(&self) -> &'static str {
        "gravity"
    }

    fn order(&self) -> i32 {
        order::GRAVITY
    }

    fn capabilities(&self) -> HookCaps {
        HookCaps::BOTH
    }

    fn on_register_component(&mut self, _component: Entity, index: usize) {
        debug_assert_eq!(index, self.was_grounded.len());
        self.was_grounded.push(None);
    }

    fn on_unregister_component(&mut self, component: Entity, index: usize) {
        self.was_grounded.swap_remove(index);
        if self.subscribers.remove(&component).is_some() {
            debug!("gravity: closed ground subscriptions of {:?}", component);
        }
    }

    fn early_update(&mut self, world: &mut World, components: &[Entity], _dt: f32) {
        for (slot, &actor) in components.iter().enumerate() {
            let query = self.query.get_or_insert_with(|| world.query::<GravityQuery>());
            let Ok((mut gravity, transform, _)) = query.get_mut(world, actor) else {
                continue;
            };
            let height = transform.position.y;
            let grounded = height <= gravity.ground_height + GROUND_TOLERANCE;
            gravity.grounded = grounded;

            let previous = self.was_grounded[slot].replace(grounded);
            match (previous, grounded) {
                (Some(false), true) => self.pending.push(GroundEvent::Landed { actor, height }),
                (Some(true), false) => self.pending.push(GroundEvent::LeftGround { actor }),
                _ => {}
            }
        }
    }

    fn update(&mut self, world: &mut World, components: &[Entity], dt: f32) {
        for &actor in components {
            let query = self.query.get_or_insert_with(|| world.query::<GravityQuery>());
            let Ok((mut gravity, transform, effects)) = query.get_mut(world, actor) else {
                continue;
            };
            let Some(mut effects) = effects else {
                continue;
            };
            let dy = gravity.step(transform.position.y, dt);
            effects.add(Vec3::new(0.0, dy, 0.0));
        }
    }

    fn post_update(&mut self, _world: &mut World, _components: &[Entity], _dt: f32) {
        for event in self.pending.drain(..) {
            let Some(senders) = self.subscribers.get_mut(&event.actor()) else {
                continue;
            };
            senders.retain(|sender| sender.send(event).is_ok());
            trace!("gravity: delivered {:?}", event);
        }
    }
}

/// Subscribe to ground events of `actor` from the gravity System at `timing`.
///
/// `None` while the System does not exist, is running, or does not have
/// `actor` registered.
pub fn subscribe_ground_events(world: &mut World, actor: Entity, timing: Timing) -> Option<Receiver<GroundEvent>> {
    let mut table = world.get_resource_mut::<SystemTable>()?;
    if !table.registry::<GravitySystem>(timing)?.is_registered(actor) {
        return None;
    }
    let system = table.get_mut::<GravitySystem>(timing)?;
    Some(system.subscribe(actor))
}
