//! Dense component registry with O(1) register/unregister.
//!
//! A [`Registry`] keeps its handles packed in a `Vec` so a System can walk them
//! as a contiguous slice every tick. Removal never searches: the sparse slot
//! table answers "where is this handle" and the removed entry is overwritten
//! by the last one (swap-remove).
//!
//! # Invariants
//!
//! - no handle appears twice in the dense array
//! - for every registered handle `k`, `dense[slot_of(k)] == k`
//!
//! Both hold after every public call; [`Registry::check_integrity`] verifies
//! them and is used by the tests.

use std::hash::Hash;

use log::debug;
use rustc_hash::FxHashMap;

/// Slot value reported for a handle that is not registered.
pub const UNREGISTERED_SLOT: isize = -1;

/// A registered handle paired with the slot it occupied when the call returned.
///
/// The slot can change later when another handle is swap-removed; ask the
/// registry with [`Registry::slot_of`] for the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle<K> {
    pub key: K,
    pub slot: usize,
}

/// Result of [`Registry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome<K> {
    /// The handle was appended at the returned slot.
    Inserted(Handle<K>),
    /// The handle was already present; nothing changed.
    AlreadyRegistered(Handle<K>),
}

impl<K: Copy> RegisterOutcome<K> {
    pub fn handle(&self) -> Handle<K> {
        match self {
            RegisterOutcome::Inserted(handle) | RegisterOutcome::AlreadyRegistered(handle) => *handle,
        }
    }

    pub fn inserted(&self) -> bool {
        matches!(self, RegisterOutcome::Inserted(_))
    }
}

/// What a successful [`Registry::unregister`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal<K> {
    /// The handle that left the registry.
    pub key: K,
    /// The slot it occupied.
    pub removed_index: usize,
    /// The former last handle, now moved into `removed_index` (None when the
    /// removed handle was itself last).
    pub moved: Option<K>,
}

/// Dense array of handles plus a sparse handle-to-slot table.
#[derive(Debug, Clone)]
pub struct Registry<K> {
    dense: Vec<K>,
    slots: FxHashMap<K, usize>,
}

impl<K> Default for Registry<K> {
    fn default() -> Self {
        Self {
            dense: Vec::new(),
            slots: FxHashMap::default(),
        }
    }
}

impl<K> Registry<K>
where
    K: Copy + Eq + Hash + std::fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dense: Vec::with_capacity(capacity),
            slots: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Append `key` unless it is already registered.
    pub fn register(&mut self, key: K) -> RegisterOutcome<K> {
        if let Some(&slot) = self.slots.get(&key) {
            return RegisterOutcome::AlreadyRegistered(Handle { key, slot });
        }
        let slot = self.dense.len();
        self.dense.push(key);
        self.slots.insert(key, slot);
        RegisterOutcome::Inserted(Handle { key, slot })
    }

    /// Swap-remove `key`. Returns `None` (and changes nothing) when it is not registered.
    pub fn unregister(&mut self, key: K) -> Option<Removal<K>> {
        let removed_index = self.slots.remove(&key)?;
        let last_index = self.dense.len() - 1;

        // Overwrite the removed entry with the last one. When the removed
        // entry is the last one this is a self-assignment.
        let last = self.dense[last_index];
        self.dense[removed_index] = last;
        self.dense.truncate(last_index);

        let moved = if removed_index != last_index {
            self.slots.insert(last, removed_index);
            Some(last)
        } else {
            None
        };

        debug!(
            "registry: removed {:?} from slot {} (moved {:?})",
            key, removed_index, moved
        );

        Some(Removal {
            key,
            removed_index,
            moved,
        })
    }

    pub fn is_registered(&self, key: K) -> bool {
        self.slots.contains_key(&key)
    }

    /// Current slot of `key`, if registered.
    pub fn slot_of(&self, key: K) -> Option<usize> {
        self.slots.get(&key).copied()
    }

    /// Current slot of `key` as a signed index, [`UNREGISTERED_SLOT`] when absent.
    pub fn slot_index(&self, key: K) -> isize {
        self.slot_of(key)
            .map(|slot| slot as isize)
            .unwrap_or(UNREGISTERED_SLOT)
    }

    pub fn get(&self, index: usize) -> Option<K> {
        self.dense.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn as_slice(&self) -> &[K] {
        &self.dense
    }

    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.dense.iter().copied()
    }

    pub fn clear(&mut self) {
        self.dense.clear();
        self.slots.clear();
    }

    /// Check that every slot entry points at its handle and nothing is duplicated.
    pub fn check_integrity(&self) -> bool {
        self.dense.len() == self.slots.len()
            && self
                .dense
                .iter()
                .enumerate()
                .all(|(index, key)| self.slots.get(key) == Some(&index))
    }
}
