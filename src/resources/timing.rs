//! Timing channels and the fixed per-timing slot array.
//!
//! Every batch System and every update channel lives in exactly one of three
//! [`Timing`] phases. [`TimingSlots`] is the "one instance per timing" table:
//! a fixed three-entry array indexed by the timing, filled lazily.

use std::fmt;

use crate::resources::playerloop::PhaseTag;

/// One of the three per-frame phases driven by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Timing {
    Update,
    FixedUpdate,
    LateUpdate,
}

impl Timing {
    /// All timings in the order the host runs them within a frame.
    pub const ALL: [Timing; 3] = [Timing::FixedUpdate, Timing::Update, Timing::LateUpdate];

    /// Slot index used by [`TimingSlots`].
    pub const fn index(self) -> usize {
        match self {
            Timing::Update => 0,
            Timing::FixedUpdate => 1,
            Timing::LateUpdate => 2,
        }
    }

    /// The player-loop node whose sub-steps this timing hooks into.
    pub const fn phase_tag(self) -> PhaseTag {
        match self {
            Timing::Update => PhaseTag::Update,
            Timing::FixedUpdate => PhaseTag::FixedUpdate,
            Timing::LateUpdate => PhaseTag::PreLateUpdate,
        }
    }

    /// Parse a config/scenario name (`update`, `fixed_update`, `late_update`).
    pub fn from_name(name: &str) -> Option<Timing> {
        match name.trim().to_ascii_lowercase().as_str() {
            "update" => Some(Timing::Update),
            "fixed_update" | "fixedupdate" | "fixed" => Some(Timing::FixedUpdate),
            "late_update" | "lateupdate" | "late" => Some(Timing::LateUpdate),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Timing::Update => "update",
            Timing::FixedUpdate => "fixed_update",
            Timing::LateUpdate => "late_update",
        }
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed three-slot table holding at most one `T` per [`Timing`].
///
/// Slots are created on demand with [`get_or_insert_with`](Self::get_or_insert_with);
/// [`is_created`](Self::is_created) only inspects and never instantiates.
#[derive(Debug)]
pub struct TimingSlots<T> {
    slots: [Option<T>; 3],
}

impl<T> Default for TimingSlots<T> {
    fn default() -> Self {
        Self {
            slots: [None, None, None],
        }
    }
}

impl<T> TimingSlots<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_created(&self, timing: Timing) -> bool {
        self.slots[timing.index()].is_some()
    }

    pub fn get(&self, timing: Timing) -> Option<&T> {
        self.slots[timing.index()].as_ref()
    }

    pub fn get_mut(&mut self, timing: Timing) -> Option<&mut T> {
        self.slots[timing.index()].as_mut()
    }

    /// Return the instance for `timing`, creating it with `create` if the slot is empty.
    ///
    /// The boolean is `true` when this call created the instance.
    pub fn get_or_insert_with(&mut self, timing: Timing, create: impl FnOnce() -> T) -> (&mut T, bool) {
        let slot = &mut self.slots[timing.index()];
        let created = slot.is_none();
        (slot.get_or_insert_with(create), created)
    }

    pub fn take(&mut self, timing: Timing) -> Option<T> {
        self.slots[timing.index()].take()
    }

    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
    }

    /// Live instances in host order (FixedUpdate, Update, LateUpdate).
    pub fn iter(&self) -> impl Iterator<Item = (Timing, &T)> {
        Timing::ALL
            .into_iter()
            .filter_map(|timing| self.get(timing).map(|value| (timing, value)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
