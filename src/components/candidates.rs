//! Per-actor candidate sets.
//!
//! [`MoveCandidates`] and [`TurnCandidates`] hold the behaviours competing to
//! steer an actor, in the order they were added. That order is the tie-break:
//! on equal priority the earlier candidate wins, so the set never reorders
//! entries (removal shifts, it does not swap).
//!
//! Disabling a candidate takes it out of the candidate set entirely: it is not
//! queried, cannot win, and receives no callbacks until enabled again.

use std::ops::{Deref, DerefMut};

use bevy_ecs::prelude::Component;
use smallvec::SmallVec;

use crate::components::priority::{MoveProvider, Priority, TurnProvider};
use crate::systems::arbitration::select_highest_by;

/// Stable identity of a candidate within its set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateId(pub u32);

pub struct CandidateEntry<P: ?Sized> {
    pub id: CandidateId,
    pub enabled: bool,
    pub provider: Box<P>,
}

/// Ordered candidates of one kind for one actor.
pub struct CandidateSet<P: ?Sized> {
    entries: SmallVec<[CandidateEntry<P>; 4]>,
    next_id: u32,
}

impl<P: ?Sized> Default for CandidateSet<P> {
    fn default() -> Self {
        Self {
            entries: SmallVec::new(),
            next_id: 0,
        }
    }
}

impl<P: Priority + ?Sized> CandidateSet<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an enabled candidate and return its id.
    pub fn push(&mut self, provider: Box<P>) -> CandidateId {
        let id = CandidateId(self.next_id);
        self.next_id += 1;
        self.entries.push(CandidateEntry {
            id,
            enabled: true,
            provider,
        });
        id
    }

    /// Remove a candidate, keeping the order of the others.
    pub fn remove(&mut self, id: CandidateId) -> Option<Box<P>> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index).provider)
    }

    /// Enable or disable a candidate. Returns false if the id is unknown.
    pub fn set_enabled(&mut self, id: CandidateId, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn is_enabled(&self, id: CandidateId) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.id == id && entry.enabled)
    }

    pub fn get(&self, id: CandidateId) -> Option<&P> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &*entry.provider)
    }

    pub fn get_mut(&mut self, id: CandidateId) -> Option<&mut P> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .map(|entry| &mut *entry.provider)
    }

    /// The live provider for `id`: present and enabled.
    pub fn active_mut(&mut self, id: CandidateId) -> Option<&mut P> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id && entry.enabled)
            .map(|entry| &mut *entry.provider)
    }

    /// Enabled candidates in insertion order.
    pub fn active(&self) -> impl Iterator<Item = &CandidateEntry<P>> {
        self.entries.iter().filter(|entry| entry.enabled)
    }

    pub fn active_iter_mut(&mut self) -> impl Iterator<Item = &mut CandidateEntry<P>> {
        self.entries.iter_mut().filter(|entry| entry.enabled)
    }

    /// Highest strictly positive priority among enabled candidates; earliest wins ties.
    pub fn winner(&self) -> Option<CandidateId> {
        select_highest_by(
            self.active()
                .map(|entry| (entry.id, entry.provider.priority())),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Movement candidates of an actor.
#[derive(Component, Default)]
pub struct MoveCandidates(pub CandidateSet<dyn MoveProvider>);

impl MoveCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`CandidateSet::push`].
    pub fn with(mut self, provider: impl MoveProvider + 'static) -> Self {
        self.0.push(Box::new(provider));
        self
    }
}

impl Deref for MoveCandidates {
    type Target = CandidateSet<dyn MoveProvider>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveCandidates {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Turn candidates of an actor.
#[derive(Component, Default)]
pub struct TurnCandidates(pub CandidateSet<dyn TurnProvider>);

impl TurnCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl TurnProvider + 'static) -> Self {
        self.0.push(Box::new(provider));
        self
    }
}

impl Deref for TurnCandidates {
    type Target = CandidateSet<dyn TurnProvider>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for TurnCandidates {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
