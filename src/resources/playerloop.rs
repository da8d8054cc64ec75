//! Host phase graph ("player loop") and hook splicing.
//!
//! The host runs a fixed, linear list of phase nodes every frame. Each node
//! has a [`PhaseTag`] and an ordered list of [`PhaseStep`]s. Update channels
//! attach themselves by splicing an early step at the front of their node and
//! a post step at its back; detaching removes only steps they own.
//!
//! ```text
//! Initialization : [time]
//! FixedUpdate    : [early(fixed)] [native(fixed)] [post(fixed)]
//! Update         : [early(update)] [native(update)] [post(update)]
//! PreLateUpdate  : [early(late)] [native(late)] [post(late)]
//! PostLateUpdate : [end_of_frame]
//! ```

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ScheduleLabel;
use log::{debug, info};
use smallvec::SmallVec;

use crate::errors::SchedulerError;
use crate::resources::timing::Timing;

/// Type tag of a top-level node of the player loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseTag {
    Initialization,
    FixedUpdate,
    Update,
    PreLateUpdate,
    PostLateUpdate,
}

/// Who inserted a step. Detaching a channel only touches its own steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOwner {
    /// Steps the host installs itself (time update, end-of-frame).
    Host(&'static str),
    /// The host's native phase for a timing.
    Native(Timing),
    /// An update channel's early hook step.
    Early(Timing),
    /// An update channel's post hook step.
    Post(Timing),
}

impl StepOwner {
    pub fn timing(&self) -> Option<Timing> {
        match self {
            StepOwner::Host(_) => None,
            StepOwner::Native(timing) | StepOwner::Early(timing) | StepOwner::Post(timing) => {
                Some(*timing)
            }
        }
    }

    fn is_channel_step(&self, timing: Timing) -> bool {
        matches!(self, StepOwner::Early(t) | StepOwner::Post(t) if *t == timing)
    }
}

/// Label of the bevy schedule a native phase runs after its batch Systems.
///
/// Host-owned bevy systems (camera smoothing, debug probes) live there.
#[derive(ScheduleLabel, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeSchedule(pub Timing);

/// Callback run for a step: world, the step's owner, and the step delta in seconds.
pub type StepFn = fn(&mut World, StepOwner, f32);

#[derive(Clone, Copy)]
pub struct PhaseStep {
    pub owner: StepOwner,
    pub run: StepFn,
}

impl PhaseStep {
    pub fn new(owner: StepOwner, run: StepFn) -> Self {
        Self { owner, run }
    }
}

impl std::fmt::Debug for PhaseStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseStep").field("owner", &self.owner).finish()
    }
}

#[derive(Debug, Clone)]
pub struct PhaseNode {
    pub tag: PhaseTag,
    pub steps: Vec<PhaseStep>,
}

impl PhaseNode {
    pub fn new(tag: PhaseTag) -> Self {
        Self {
            tag,
            steps: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: PhaseStep) -> Self {
        self.steps.push(step);
        self
    }
}

/// The host's linear phase graph.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerLoop {
    phases: Vec<PhaseNode>,
}

impl PlayerLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_phase(mut self, node: PhaseNode) -> Self {
        self.phases.push(node);
        self
    }

    pub fn phases(&self) -> &[PhaseNode] {
        &self.phases
    }

    pub fn phase(&self, tag: PhaseTag) -> Option<&PhaseNode> {
        self.phases.iter().find(|node| node.tag == tag)
    }

    fn phase_mut(&mut self, tag: PhaseTag) -> Option<&mut PhaseNode> {
        self.phases.iter_mut().find(|node| node.tag == tag)
    }

    /// Owners of the steps in `tag`, in run order. Empty when the node is missing.
    pub fn step_owners(&self, tag: PhaseTag) -> Vec<StepOwner> {
        self.phase(tag)
            .map(|node| node.steps.iter().map(|step| step.owner).collect())
            .unwrap_or_default()
    }

    /// Copy of the steps of `tag`, so the caller can run them while the loop
    /// itself stays free to be spliced.
    pub fn snapshot(&self, tag: PhaseTag) -> SmallVec<[PhaseStep; 8]> {
        self.phase(tag)
            .map(|node| node.steps.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Remove a whole node. Returns whether it existed.
    pub fn remove_phase(&mut self, tag: PhaseTag) -> bool {
        let before = self.phases.len();
        self.phases.retain(|node| node.tag != tag);
        before != self.phases.len()
    }

    /// Insert `early` at the front and `post` at the back of the node for `timing`.
    ///
    /// Calling it again for an already attached timing changes nothing.
    pub fn splice(&mut self, timing: Timing, early: StepFn, post: StepFn) -> Result<(), SchedulerError> {
        let tag = timing.phase_tag();
        let node = self
            .phase_mut(tag)
            .ok_or(SchedulerError::PhaseNotFound { tag, timing })?;

        let early_owner = StepOwner::Early(timing);
        let post_owner = StepOwner::Post(timing);

        if !node.steps.iter().any(|step| step.owner == early_owner) {
            node.steps.insert(0, PhaseStep::new(early_owner, early));
        }
        if !node.steps.iter().any(|step| step.owner == post_owner) {
            node.steps.push(PhaseStep::new(post_owner, post));
        }

        info!("player loop: attached {} channel to {:?}", timing, tag);
        Ok(())
    }

    /// Remove every step owned by the `timing` channel, wherever it sits.
    pub fn detach(&mut self, timing: Timing) -> usize {
        let mut removed = 0;
        for node in self.phases.iter_mut() {
            let before = node.steps.len();
            node.steps.retain(|step| !step.owner.is_channel_step(timing));
            removed += before - node.steps.len();
        }
        debug!("player loop: detached {} steps of {} channel", removed, timing);
        removed
    }
}
