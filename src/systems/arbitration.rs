//! Priority arbitration.
//!
//! Picks the single highest-priority candidate per actor per tick and turns
//! consecutive picks into lifecycle transitions.
//!
//! # Selection rule
//!
//! Walk the candidates in order, starting from a best priority of `0`, and
//! replace the best only when a candidate is strictly greater. Hence:
//!
//! - priorities `<= 0` never win ("not requesting")
//! - on a tie the first candidate seen keeps the win
//!
//! # Transitions
//!
//! [`PriorityTracker`] remembers last tick's winner. Comparing it to this
//! tick's winner yields one [`Transition`]; [`apply_transition`] turns it into
//! callbacks, always running a lose before the matching acquire.
//!
//! A previous winner that is no longer an enabled member of the set gets no
//! lose callback: it left the set rather than losing to a rival, and it is not
//! reachable anymore.

use log::debug;

use crate::components::candidates::{CandidateId, CandidateSet};
use crate::components::priority::{Priority, PriorityLifecycle};

/// Select the key with the highest strictly positive priority; the first one wins ties.
pub fn select_highest_by<K, I>(candidates: I) -> Option<K>
where
    I: IntoIterator<Item = (K, i32)>,
{
    let mut best = None;
    let mut best_priority = 0;
    for (key, priority) in candidates {
        if priority > best_priority {
            best_priority = priority;
            best = Some(key);
        }
    }
    best
}

/// Select the highest-priority candidate by reference.
pub fn select_highest<'a, T, I>(candidates: I) -> Option<&'a T>
where
    T: Priority + ?Sized + 'a,
    I: IntoIterator<Item = &'a T>,
{
    select_highest_by(
        candidates
            .into_iter()
            .map(|candidate| (candidate, candidate.priority())),
    )
}

/// Position of the highest-priority candidate in a slice.
pub fn select_highest_index<T: Priority>(candidates: &[T]) -> Option<usize> {
    select_highest_by(
        candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| (index, candidate.priority())),
    )
}

/// How this tick's winner relates to last tick's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No winner now, none before.
    Idle,
    /// Same winner as last tick.
    Held(CandidateId),
    /// The winner changed; either side may be nobody.
    Changed {
        lost: Option<CandidateId>,
        acquired: Option<CandidateId>,
    },
}

/// Previous-winner memory for one actor and one arbitration channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PriorityTracker {
    previous: Option<CandidateId>,
}

impl PriorityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last recorded winner.
    pub fn current(&self) -> Option<CandidateId> {
        self.previous
    }

    /// Record `winner` as this tick's result and report the transition.
    pub fn advance(&mut self, winner: Option<CandidateId>) -> Transition {
        let previous = std::mem::replace(&mut self.previous, winner);
        match (previous, winner) {
            (None, None) => Transition::Idle,
            (Some(before), Some(now)) if before == now => Transition::Held(now),
            (lost, acquired) => Transition::Changed { lost, acquired },
        }
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}

/// Callbacks that actually ran for one transition.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AppliedTransition {
    pub acquired: Option<CandidateId>,
    pub lost: Option<CandidateId>,
    pub held: Option<CandidateId>,
}

/// Invoke the lifecycle callbacks for `transition` on the members of `set`.
pub fn apply_transition<P>(set: &mut CandidateSet<P>, transition: Transition, dt: f32) -> AppliedTransition
where
    P: Priority + PriorityLifecycle + ?Sized,
{
    let mut applied = AppliedTransition::default();
    match transition {
        Transition::Idle => {}
        Transition::Held(id) => {
            if let Some(candidate) = set.active_mut(id) {
                candidate.on_update_with_highest_priority(dt);
                applied.held = Some(id);
            }
        }
        Transition::Changed { lost, acquired } => {
            if let Some(id) = lost {
                match set.active_mut(id) {
                    Some(candidate) => {
                        candidate.on_lose_highest_priority();
                        applied.lost = Some(id);
                    }
                    None => debug!("arbitration: previous winner {:?} left the set", id),
                }
            }
            if let Some(id) = acquired {
                if let Some(candidate) = set.active_mut(id) {
                    candidate.on_acquire_highest_priority();
                    applied.acquired = Some(id);
                }
            }
        }
    }
    applied
}

/// Select, track, and apply in one step. Returns this tick's winner.
pub fn arbitrate<P>(
    tracker: &mut PriorityTracker,
    set: &mut CandidateSet<P>,
    dt: f32,
) -> (Option<CandidateId>, AppliedTransition)
where
    P: Priority + PriorityLifecycle + ?Sized,
{
    let winner = set.winner();
    let transition = tracker.advance(winner);
    let applied = apply_transition(set, transition, dt);
    (winner, applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Fixed(i32);

    impl Priority for Fixed {
        fn priority(&self) -> i32 {
            self.0
        }
    }

    struct Recorder {
        name: &'static str,
        priority: i32,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Priority for Recorder {
        fn priority(&self) -> i32 {
            self.priority
        }
    }

    impl PriorityLifecycle for Recorder {
        fn on_acquire_highest_priority(&mut self) {
            self.log.lock().unwrap().push(format!("{}.acquire", self.name));
        }

        fn on_lose_highest_priority(&mut self) {
            self.log.lock().unwrap().push(format!("{}.lose", self.name));
        }

        fn on_update_with_highest_priority(&mut self, _dt: f32) {
            self.log.lock().unwrap().push(format!("{}.update", self.name));
        }
    }

    #[test]
    fn test_strict_ordering_first_of_highest() {
        let candidates = [Fixed(0), Fixed(3), Fixed(3), Fixed(5), Fixed(-1)];
        assert_eq!(select_highest_index(&candidates), Some(3));
    }

    #[test]
    fn test_all_zero_selects_none() {
        let candidates = [Fixed(0), Fixed(0), Fixed(0)];
        assert_eq!(select_highest_index(&candidates), None);
        assert!(select_highest(candidates.iter()).is_none());
    }

    #[test]
    fn test_tie_goes_to_first() {
        let candidates = [Fixed(3), Fixed(3)];
        assert_eq!(select_highest_index(&candidates), Some(0));
        let picked = select_highest(candidates.iter()).unwrap();
        assert!(std::ptr::eq(picked, &candidates[0]));
    }

    #[test]
    fn test_negative_equals_zero() {
        assert_eq!(select_highest_by([(1, -5), (2, 0)]), None::<i32>);
        assert_eq!(select_highest_by([(1, -5), (2, 1)]), Some(2));
    }

    #[test]
    fn test_tracker_transitions() {
        let a = CandidateId(0);
        let b = CandidateId(1);
        let mut tracker = PriorityTracker::new();
        assert_eq!(tracker.advance(None), Transition::Idle);
        assert_eq!(
            tracker.advance(Some(a)),
            Transition::Changed {
                lost: None,
                acquired: Some(a)
            }
        );
        assert_eq!(tracker.advance(Some(a)), Transition::Held(a));
        assert_eq!(
            tracker.advance(Some(b)),
            Transition::Changed {
                lost: Some(a),
                acquired: Some(b)
            }
        );
        assert_eq!(
            tracker.advance(None),
            Transition::Changed {
                lost: Some(b),
                acquired: None
            }
        );
        assert_eq!(tracker.current(), None);
    }

    #[test]
    fn test_lifecycle_sequence_none_a_a_b_none() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut set: CandidateSet<Recorder> = CandidateSet::new();
        let a = set.push(Box::new(Recorder {
            name: "A",
            priority: 0,
            log: log.clone(),
        }));
        let b = set.push(Box::new(Recorder {
            name: "B",
            priority: 0,
            log: log.clone(),
        }));
        let mut tracker = PriorityTracker::new();

        let set_priorities = |set: &mut CandidateSet<Recorder>, pa: i32, pb: i32| {
            set.get_mut(a).unwrap().priority = pa;
            set.get_mut(b).unwrap().priority = pb;
        };

        set_priorities(&mut set, 0, 0);
        arbitrate(&mut tracker, &mut set, 0.1); // none
        set_priorities(&mut set, 2, 1);
        arbitrate(&mut tracker, &mut set, 0.1); // A
        arbitrate(&mut tracker, &mut set, 0.1); // A
        set_priorities(&mut set, 1, 2);
        arbitrate(&mut tracker, &mut set, 0.1); // B
        set_priorities(&mut set, 0, 0);
        arbitrate(&mut tracker, &mut set, 0.1); // none

        assert_eq!(
            *log.lock().unwrap(),
            vec!["A.acquire", "A.update", "A.lose", "B.acquire", "B.lose"]
        );
    }

    #[test]
    fn test_removed_winner_gets_no_lose() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut set: CandidateSet<Recorder> = CandidateSet::new();
        let a = set.push(Box::new(Recorder {
            name: "A",
            priority: 5,
            log: log.clone(),
        }));
        set.push(Box::new(Recorder {
            name: "B",
            priority: 3,
            log: log.clone(),
        }));
        let mut tracker = PriorityTracker::new();
        arbitrate(&mut tracker, &mut set, 0.1);
        set.set_enabled(a, false);
        let (_, applied) = arbitrate(&mut tracker, &mut set, 0.1);
        assert_eq!(applied.lost, None);
        assert_eq!(*log.lock().unwrap(), vec!["A.acquire", "B.acquire"]);
    }
}
