//! Update channels: per-timing early and post hook lists.
//!
//! Each [`Timing`] has at most one [`UpdateChannel`], created the first time
//! a System with early or post capability appears at that timing. A channel
//! lists the Systems whose early hook runs right before the native phase and
//! those whose post hook runs right after it. Both lists keep registration
//! order; a System may sit in both.

use bevy_ecs::prelude::*;
use log::debug;
use smallvec::SmallVec;

use crate::resources::systemtable::{HookCaps, SystemKey};
use crate::resources::timing::{Timing, TimingSlots};

/// Whether a channel's steps are live in the player loop.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChannelState {
    /// Created but not spliced into the player loop yet.
    #[default]
    Detached,
    /// Early and post steps are in the player loop.
    Attached,
    /// Splicing failed; the channel never runs its hooks.
    Faulted(String),
}

#[derive(Debug, Default)]
pub struct UpdateChannel {
    early: SmallVec<[SystemKey; 4]>,
    post: SmallVec<[SystemKey; 4]>,
    pub state: ChannelState,
}

impl UpdateChannel {
    /// Add `key` to the lists its capabilities ask for. Already listed keys stay put.
    pub fn register(&mut self, key: SystemKey, caps: HookCaps) {
        if caps.early && !self.early.contains(&key) {
            self.early.push(key);
        }
        if caps.post && !self.post.contains(&key) {
            self.post.push(key);
        }
    }

    pub fn early(&self) -> &[SystemKey] {
        &self.early
    }

    pub fn post(&self) -> &[SystemKey] {
        &self.post
    }

    pub fn is_runnable(&self) -> bool {
        self.state == ChannelState::Attached
    }
}

/// The three lazily created channels.
#[derive(Resource, Debug, Default)]
pub struct UpdateChannels {
    channels: TimingSlots<UpdateChannel>,
}

impl UpdateChannels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel for `timing`, created on first use. The flag is `true` on creation.
    pub fn get_or_create(&mut self, timing: Timing) -> (&mut UpdateChannel, bool) {
        let (channel, created) = self.channels.get_or_insert_with(timing, UpdateChannel::default);
        if created {
            debug!("created {} update channel", timing);
        }
        (channel, created)
    }

    pub fn is_created(&self, timing: Timing) -> bool {
        self.channels.is_created(timing)
    }

    pub fn get(&self, timing: Timing) -> Option<&UpdateChannel> {
        self.channels.get(timing)
    }

    pub fn get_mut(&mut self, timing: Timing) -> Option<&mut UpdateChannel> {
        self.channels.get_mut(timing)
    }

    /// Snapshot of the early list, empty unless the channel is attached.
    pub fn early_hooks(&self, timing: Timing) -> SmallVec<[SystemKey; 4]> {
        self.get(timing)
            .filter(|channel| channel.is_runnable())
            .map(|channel| SmallVec::from_slice(channel.early()))
            .unwrap_or_default()
    }

    /// Snapshot of the post list, empty unless the channel is attached.
    pub fn post_hooks(&self, timing: Timing) -> SmallVec<[SystemKey; 4]> {
        self.get(timing)
            .filter(|channel| channel.is_runnable())
            .map(|channel| SmallVec::from_slice(channel.post()))
            .unwrap_or_default()
    }

    /// Live channels in host order.
    pub fn timings(&self) -> Vec<Timing> {
        self.channels.iter().map(|(timing, _)| timing).collect()
    }

    pub fn clear(&mut self) {
        self.channels.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::TypeId;

    fn key<T: 'static>(timing: Timing) -> SystemKey {
        SystemKey {
            type_id: TypeId::of::<T>(),
            timing,
        }
    }

    #[test]
    fn test_register_classifies_by_capability() {
        let mut channel = UpdateChannel::default();
        let a = key::<u8>(Timing::Update);
        let b = key::<u16>(Timing::Update);
        let c = key::<u32>(Timing::Update);
        channel.register(a, HookCaps::EARLY);
        channel.register(b, HookCaps::BOTH);
        channel.register(c, HookCaps::POST);
        channel.register(b, HookCaps::BOTH);

        assert_eq!(channel.early(), &[a, b]);
        assert_eq!(channel.post(), &[b, c]);
    }

    #[test]
    fn test_hooks_hidden_until_attached() {
        let mut channels = UpdateChannels::new();
        assert!(!channels.is_created(Timing::Update));
        let (channel, created) = channels.get_or_create(Timing::Update);
        assert!(created);
        channel.register(key::<u8>(Timing::Update), HookCaps::EARLY);
        assert!(channels.early_hooks(Timing::Update).is_empty());

        channels.get_mut(Timing::Update).unwrap().state = ChannelState::Attached;
        assert_eq!(channels.early_hooks(Timing::Update).len(), 1);

        channels.get_mut(Timing::Update).unwrap().state = ChannelState::Faulted("gone".into());
        assert!(channels.early_hooks(Timing::Update).is_empty());
    }

    #[test]
    fn test_get_or_create_is_lazy_per_timing() {
        let mut channels = UpdateChannels::new();
        channels.get_or_create(Timing::LateUpdate);
        let (_, created) = channels.get_or_create(Timing::LateUpdate);
        assert!(!created);
        assert_eq!(channels.timings(), vec![Timing::LateUpdate]);
    }
}
