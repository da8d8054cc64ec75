//! Process-wide table of batch Systems.
//!
//! A *System* is one [`BatchSystem`] implementation bound to one [`Timing`],
//! together with the [`Registry`] of components it processes every tick. The
//! [`SystemTable`] resource holds at most one System per `(kind, timing)` pair
//! and creates them lazily on the first registration request.
//!
//! Registration requests that arrive while the table is checked out of the
//! world (i.e. while Systems are running) are parked in the
//! [`RegistrationQueue`] and applied as soon as the iteration finishes; see
//! [`crate::systems::registration`].

use std::any::{Any, TypeId};

use bevy_ecs::prelude::*;
use log::{debug, info};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::resources::registry::{RegisterOutcome, Registry, Removal};
use crate::resources::timing::{Timing, TimingSlots};

/// Which phase-relative hooks a System wants from its update channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HookCaps {
    pub early: bool,
    pub post: bool,
}

impl HookCaps {
    pub const NONE: HookCaps = HookCaps {
        early: false,
        post: false,
    };
    pub const EARLY: HookCaps = HookCaps {
        early: true,
        post: false,
    };
    pub const POST: HookCaps = HookCaps {
        early: false,
        post: true,
    };
    pub const BOTH: HookCaps = HookCaps {
        early: true,
        post: true,
    };

    pub fn any(&self) -> bool {
        self.early || self.post
    }
}

/// Behaviour of a batch System.
///
/// Implementors receive the dense slice of registered component handles on
/// every call; they never own the registry themselves. The register/unregister
/// hooks let an implementation keep parallel buffers indexed by slot: apply
/// `push`/`swap_remove` with the given index and the buffer stays aligned.
pub trait BatchSystem: Any + Send + Sync {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Declared ordering value within the native phase, ascending.
    /// See [`crate::systems::order`].
    fn order(&self) -> i32 {
        0
    }

    fn capabilities(&self) -> HookCaps {
        HookCaps::NONE
    }

    fn on_register_component(&mut self, _component: Entity, _index: usize) {}

    fn on_unregister_component(&mut self, _component: Entity, _index: usize) {}

    /// Native-phase work.
    fn update(&mut self, world: &mut World, components: &[Entity], dt: f32);

    /// Runs before the native phase when [`HookCaps::early`] is set.
    fn early_update(&mut self, _world: &mut World, _components: &[Entity], _dt: f32) {}

    /// Runs after the native phase when [`HookCaps::post`] is set.
    fn post_update(&mut self, _world: &mut World, _components: &[Entity], _dt: f32) {}
}

fn make_system<S: BatchSystem + Default>() -> Box<dyn BatchSystem> {
    Box::new(S::default())
}

/// Type-erased identity and factory of a [`BatchSystem`] implementation.
#[derive(Clone, Copy)]
pub struct SystemKind {
    pub type_id: TypeId,
    pub name: &'static str,
    make: fn() -> Box<dyn BatchSystem>,
}

impl SystemKind {
    pub fn of<S: BatchSystem + Default>() -> Self {
        Self {
            type_id: TypeId::of::<S>(),
            name: std::any::type_name::<S>(),
            make: make_system::<S>,
        }
    }

    pub fn instantiate(&self) -> Box<dyn BatchSystem> {
        (self.make)()
    }
}

impl std::fmt::Debug for SystemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Address of one live System.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemKey {
    pub type_id: TypeId,
    pub timing: Timing,
}

impl SystemKey {
    pub fn of<S: BatchSystem>(timing: Timing) -> Self {
        Self {
            type_id: TypeId::of::<S>(),
            timing,
        }
    }
}

/// A live System: the behaviour plus the registry it exclusively owns.
pub struct SystemInstance {
    pub kind: SystemKind,
    pub timing: Timing,
    pub system: Box<dyn BatchSystem>,
    pub registry: Registry<Entity>,
    sequence: u64,
}

impl SystemInstance {
    fn new(kind: SystemKind, timing: Timing, sequence: u64) -> Self {
        Self {
            kind,
            timing,
            system: kind.instantiate(),
            registry: Registry::new(),
            sequence,
        }
    }

    pub fn key(&self) -> SystemKey {
        SystemKey {
            type_id: self.kind.type_id,
            timing: self.timing,
        }
    }

    /// Creation order across the whole table, used as the ordering tiebreak.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn register(&mut self, component: Entity) -> RegisterOutcome<Entity> {
        let outcome = self.registry.register(component);
        if let RegisterOutcome::Inserted(handle) = outcome {
            self.system.on_register_component(component, handle.slot);
        }
        outcome
    }

    pub fn unregister(&mut self, component: Entity) -> Option<Removal<Entity>> {
        let removal = self.registry.unregister(component)?;
        self.system
            .on_unregister_component(component, removal.removed_index);
        Some(removal)
    }

    pub fn run_update(&mut self, world: &mut World, dt: f32) {
        self.system.update(world, self.registry.as_slice(), dt);
    }

    pub fn run_early_update(&mut self, world: &mut World, dt: f32) {
        self.system.early_update(world, self.registry.as_slice(), dt);
    }

    pub fn run_post_update(&mut self, world: &mut World, dt: f32) {
        self.system.post_update(world, self.registry.as_slice(), dt);
    }

    /// Downcast the behaviour to its concrete type.
    pub fn downcast_ref<S: BatchSystem>(&self) -> Option<&S> {
        let system: &dyn Any = &*self.system;
        system.downcast_ref::<S>()
    }

    pub fn downcast_mut<S: BatchSystem>(&mut self) -> Option<&mut S> {
        let system: &mut dyn Any = &mut *self.system;
        system.downcast_mut::<S>()
    }
}

/// What [`SystemTable::register`] did.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    pub outcome: RegisterOutcome<Entity>,
    /// The System was created by this call.
    pub created: bool,
    /// Hook capabilities of the System, for channel wiring.
    pub capabilities: HookCaps,
}

/// The single table of live Systems, keyed by behaviour type and timing.
#[derive(Resource, Default)]
pub struct SystemTable {
    kinds: FxHashMap<TypeId, TimingSlots<SystemInstance>>,
    next_sequence: u64,
}

impl SystemTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `component` with the `(kind, timing)` System, creating the System if needed.
    pub fn register(&mut self, kind: SystemKind, component: Entity, timing: Timing) -> Registration {
        let sequence = self.next_sequence;
        let slots = self.kinds.entry(kind.type_id).or_default();
        let (instance, created) =
            slots.get_or_insert_with(timing, || SystemInstance::new(kind, timing, sequence));
        if created {
            self.next_sequence += 1;
            info!("created system {} at {}", kind.name, timing);
        }
        let outcome = instance.register(component);
        if outcome.inserted() {
            debug!(
                "{}@{}: registered {:?} at slot {}",
                kind.name,
                timing,
                component,
                outcome.handle().slot
            );
        }
        Registration {
            outcome,
            created,
            capabilities: instance.system.capabilities(),
        }
    }

    /// Unregister `component`. A no-op when the System does not exist or the
    /// component is not registered with it.
    pub fn unregister(&mut self, type_id: TypeId, component: Entity, timing: Timing) -> Option<Removal<Entity>> {
        let instance = self.kinds.get_mut(&type_id)?.get_mut(timing)?;
        instance.unregister(component)
    }

    /// Unregister `component` from every System at every timing. Returns how
    /// many registries it was removed from.
    pub fn unregister_everywhere(&mut self, component: Entity) -> usize {
        let mut removed = 0;
        for slots in self.kinds.values_mut() {
            for timing in Timing::ALL {
                if let Some(instance) = slots.get_mut(timing) {
                    if instance.unregister(component).is_some() {
                        removed += 1;
                    }
                }
            }
        }
        removed
    }

    pub fn instance(&self, key: SystemKey) -> Option<&SystemInstance> {
        self.kinds.get(&key.type_id)?.get(key.timing)
    }

    pub fn instance_mut(&mut self, key: SystemKey) -> Option<&mut SystemInstance> {
        self.kinds.get_mut(&key.type_id)?.get_mut(key.timing)
    }

    pub fn is_created<S: BatchSystem>(&self, timing: Timing) -> bool {
        self.instance(SystemKey::of::<S>(timing)).is_some()
    }

    pub fn get<S: BatchSystem>(&self, timing: Timing) -> Option<&S> {
        self.instance(SystemKey::of::<S>(timing))?.downcast_ref::<S>()
    }

    pub fn get_mut<S: BatchSystem>(&mut self, timing: Timing) -> Option<&mut S> {
        self.instance_mut(SystemKey::of::<S>(timing))?
            .downcast_mut::<S>()
    }

    pub fn registry<S: BatchSystem>(&self, timing: Timing) -> Option<&Registry<Entity>> {
        self.instance(SystemKey::of::<S>(timing))
            .map(|instance| &instance.registry)
    }

    /// Keys of the Systems living at `timing`, sorted by `(order, creation)`.
    pub fn ordered_keys(&self, timing: Timing) -> SmallVec<[SystemKey; 8]> {
        let mut live: SmallVec<[(i32, u64, SystemKey); 8]> = self
            .kinds
            .values()
            .filter_map(|slots| slots.get(timing))
            .map(|instance| (instance.system.order(), instance.sequence, instance.key()))
            .collect();
        live.sort_by_key(|(order, sequence, _)| (*order, *sequence));
        live.into_iter().map(|(_, _, key)| key).collect()
    }

    /// Number of live Systems across all timings.
    pub fn len(&self) -> usize {
        self.kinds.values().map(|slots| slots.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every System.
    pub fn clear(&mut self) {
        self.kinds.clear();
    }
}

/// A registration change waiting for the current iteration to finish.
#[derive(Debug, Clone, Copy)]
pub enum RegistrationCommand {
    Register {
        kind: SystemKind,
        component: Entity,
        timing: Timing,
    },
    Unregister {
        type_id: TypeId,
        component: Entity,
        timing: Timing,
    },
    /// Remove the component from every System, e.g. after a despawn.
    UnregisterAll { component: Entity },
}

/// Deferred register/unregister requests.
#[derive(Resource, Debug, Default)]
pub struct RegistrationQueue {
    pending: Vec<RegistrationCommand>,
}

impl RegistrationQueue {
    pub fn push(&mut self, command: RegistrationCommand) {
        self.pending.push(command);
    }

    pub fn drain(&mut self) -> Vec<RegistrationCommand> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
