//! Brain System: per-actor orchestration.
//!
//! For every registered actor, once per tick at the Brain's timing:
//!
//! 1. arbitrate the move candidates and the turn candidates independently,
//!    running the lifecycle callbacks of each
//! 2. compose the winning velocity with the passive displacement accumulated
//!    by the effect Systems (which run earlier in the same phase)
//! 3. keep the previous position on frozen axes
//! 4. ease yaw toward the turn winner along the shortest arc
//! 5. write the pose through [`ActorTransform::move_to`]
//! 6. trigger [`PriorityChangeEvent`]s, then [`CameraUpdateEvent`], then
//!    [`IkUpdateEvent`]
//!
//! An actor without its required [`ActorTransform`] is reported once and then
//! skipped. Missing candidates or effects are simply treated as empty.

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::{debug, error};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::components::actortransform::{ActorTransform, normalize_degrees};
use crate::components::brain::{Brain, FrozenAxes};
use crate::components::candidates::{MoveCandidates, TurnCandidates};
use crate::components::passiveeffects::PassiveEffects;
use crate::events::brain::{CameraUpdateEvent, IkUpdateEvent};
use crate::events::priority::{ArbitrationChannel, PriorityChange, PriorityChangeEvent};
use crate::resources::systemtable::BatchSystem;
use crate::systems::arbitration::{AppliedTransition, arbitrate};
use crate::systems::order;
use crate::systems::registration::unregister_everywhere;

type BrainQuery = (
    &'static mut Brain,
    &'static mut ActorTransform,
    Option<&'static mut MoveCandidates>,
    Option<&'static mut TurnCandidates>,
    Option<&'static mut PassiveEffects>,
);

/// Keep `previous` on every frozen axis of the computed `next` position.
pub fn apply_axis_freeze(previous: Vec3, next: Vec3, frozen: FrozenAxes) -> Vec3 {
    frozen.apply(previous, next)
}

/// Rotate `current` toward `target` by at most `max_step` degrees along the
/// shorter arc. Result in `[0, 360)`.
pub fn turn_towards(current: f32, target: f32, max_step: f32) -> f32 {
    let mut delta = normalize_degrees(target - current);
    if delta > 180.0 {
        delta -= 360.0;
    }
    let max_step = max_step.max(0.0);
    if delta.abs() <= max_step {
        normalize_degrees(target)
    } else {
        normalize_degrees(current + delta.signum() * max_step)
    }
}

/// Everything the Brain wants to tell observers about one actor's tick.
struct TickReport {
    changes: SmallVec<[PriorityChangeEvent; 4]>,
    camera: CameraUpdateEvent,
    ik: IkUpdateEvent,
}

fn record_changes(
    changes: &mut SmallVec<[PriorityChangeEvent; 4]>,
    actor: Entity,
    channel: ArbitrationChannel,
    applied: AppliedTransition,
) {
    if let Some(candidate) = applied.lost {
        changes.push(PriorityChangeEvent {
            actor,
            channel,
            candidate,
            change: PriorityChange::Lost,
        });
    }
    if let Some(candidate) = applied.acquired {
        changes.push(PriorityChangeEvent {
            actor,
            channel,
            candidate,
            change: PriorityChange::Acquired,
        });
    }
}

#[derive(Default)]
pub struct BrainSystem {
    query: Option<QueryState<BrainQuery>>,
    reported: FxHashSet<Entity>,
}

impl BrainSystem {
    fn tick_actor(&mut self, world: &mut World, actor: Entity, dt: f32) -> Option<TickReport> {
        let query = self.query.get_or_insert_with(|| world.query::<BrainQuery>());
        let Ok((mut brain, mut transform, moves, turns, effects)) = query.get_mut(world, actor) else {
            return None;
        };
        let brain = &mut *brain;
        let mut changes = SmallVec::new();

        let mut velocity = Vec3::ZERO;
        match moves {
            Some(mut moves) => {
                let (winner, applied) = arbitrate(&mut brain.move_tracker, &mut moves.0, dt);
                brain.authority.has_move = winner.is_some();
                if let Some(provider) = winner.and_then(|id| moves.get(id)) {
                    velocity = provider.velocity();
                }
                record_changes(&mut changes, actor, ArbitrationChannel::Move, applied);
            }
            None => {
                brain.move_tracker.reset();
                brain.authority.has_move = false;
            }
        }

        let mut yaw = transform.yaw;
        match turns {
            Some(mut turns) => {
                let (winner, applied) = arbitrate(&mut brain.turn_tracker, &mut turns.0, dt);
                brain.authority.has_turn = winner.is_some();
                if let Some(provider) = winner.and_then(|id| turns.get(id)) {
                    yaw = turn_towards(
                        transform.yaw,
                        provider.target_yaw(),
                        provider.turn_speed() * dt,
                    );
                }
                record_changes(&mut changes, actor, ArbitrationChannel::Turn, applied);
            }
            None => {
                brain.turn_tracker.reset();
                brain.authority.has_turn = false;
            }
        }

        let passive = effects.map(|mut effects| effects.take()).unwrap_or(Vec3::ZERO);
        let previous = transform.position;
        let next = previous + velocity * dt + passive;
        let applied = apply_axis_freeze(previous, next, brain.frozen);
        transform.move_to(applied, yaw);
        brain.last_velocity = velocity;

        Some(TickReport {
            changes,
            camera: CameraUpdateEvent {
                actor,
                position: transform.position,
                yaw: transform.yaw,
            },
            ik: IkUpdateEvent {
                actor,
                position: transform.position,
                yaw: transform.yaw,
                displacement: applied - previous,
            },
        })
    }

    /// Explain why `actor` could not be ticked, once per actor.
    fn report_unrunnable(&mut self, world: &mut World, actor: Entity) {
        if world.get_entity(actor).is_err() {
            debug!("brain: {:?} was despawned, unregistering", actor);
            self.reported.remove(&actor);
            unregister_everywhere(world, actor);
            return;
        }
        if !self.reported.insert(actor) {
            return;
        }
        let missing = if world.get::<ActorTransform>(actor).is_none() {
            "ActorTransform"
        } else {
            "Brain"
        };
        error!(
            "brain: actor {:?} is missing required component {}; it will not move or turn",
            actor, missing
        );
    }
}

impl BatchSystem for BrainSystem {
    fn name(&self) -> &'static str {
        "brain"
    }

    fn order(&self) -> i32 {
        order::BRAIN
    }

    fn on_unregister_component(&mut self, component: Entity, _index: usize) {
        self.reported.remove(&component);
    }

    fn update(&mut self, world: &mut World, components: &[Entity], dt: f32) {
        for &actor in components {
            match self.tick_actor(world, actor, dt) {
                Some(report) => {
                    for change in report.changes {
                        world.trigger(change);
                    }
                    world.trigger(report.camera);
                    world.trigger(report.ik);
                }
                None => self.report_unrunnable(world, actor),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_axis_freeze_keeps_previous_component() {
        let previous = Vec3::new(0.0, 3.0, 0.0);
        let next = Vec3::new(1.0, -7.0, 2.0);
        let applied = apply_axis_freeze(previous, next, FrozenAxes::Y);
        assert_eq!(applied.y, previous.y);
        assert_eq!(applied.x, next.x);
        assert_eq!(applied.z, next.z);
    }

    #[test]
    fn test_turn_towards_takes_short_arc() {
        assert!(approx_eq(turn_towards(350.0, 10.0, 5.0), 355.0));
        assert!(approx_eq(turn_towards(10.0, 350.0, 5.0), 5.0));
    }

    #[test]
    fn test_turn_towards_snaps_within_step() {
        assert!(approx_eq(turn_towards(80.0, 90.0, 45.0), 90.0));
        assert!(approx_eq(turn_towards(0.0, 360.0, 1.0), 0.0));
    }

    #[test]
    fn test_turn_towards_zero_speed_holds() {
        assert!(approx_eq(turn_towards(30.0, 90.0, 0.0), 30.0));
    }
}
