//! Control System: advances time-driven candidates.
//!
//! Runs in the control slot, right before the Brain, and calls `tick(dt)` on
//! every enabled move and turn candidate whether or not it is currently
//! winning. Candidates use it for their own clocks (active windows, cooldowns),
//! so their priority is current by the time the Brain arbitrates.

use bevy_ecs::prelude::*;

use crate::components::candidates::{MoveCandidates, TurnCandidates};
use crate::resources::systemtable::BatchSystem;
use crate::systems::order;

type ControlQuery = (
    Option<&'static mut MoveCandidates>,
    Option<&'static mut TurnCandidates>,
);

#[derive(Default)]
pub struct ControlSystem {
    query: Option<QueryState<ControlQuery>>,
}

impl BatchSystem for ControlSystem {
    fn name(&self) -> &'static str {
        "control"
    }

    fn order(&self) -> i32 {
        order::CONTROL
    }

    fn update(&mut self, world: &mut World, components: &[Entity], dt: f32) {
        let query = self.query.get_or_insert_with(|| world.query::<ControlQuery>());
        for &actor in components {
            let Ok((moves, turns)) = query.get_mut(world, actor) else {
                continue;
            };
            if let Some(mut moves) = moves {
                for entry in moves.active_iter_mut() {
                    entry.provider.tick(dt);
                }
            }
            if let Some(mut turns) = turns {
                for entry in turns.active_iter_mut() {
                    entry.provider.tick(dt);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::priority::Priority;
    use crate::components::providers::{ActiveWindow, ConstantMove};
    use crate::resources::timing::Timing;
    use crate::systems::channel::run_batch_systems;
    use crate::systems::registration::{init_scheduler, register_component};
    use glam::Vec3;

    #[test]
    fn test_ticks_enabled_candidates_only() {
        let mut world = World::new();
        init_scheduler(&mut world);
        let window = ActiveWindow::new(1.0, 5.0);
        let mut moves = MoveCandidates::new()
            .with(ConstantMove::new(Vec3::X, 3).with_window(window))
            .with(ConstantMove::new(Vec3::Z, 3).with_window(window));
        let frozen_id = moves.active().nth(1).unwrap().id;
        moves.set_enabled(frozen_id, false);
        let actor = world.spawn(moves).id();
        register_component::<ControlSystem>(&mut world, actor, Timing::Update);

        run_batch_systems(&mut world, Timing::Update, 1.5);

        let moves = world.get::<MoveCandidates>(actor).unwrap();
        let ticked: Vec<i32> = moves
            .active()
            .map(|entry| entry.provider.priority())
            .collect();
        assert_eq!(ticked, vec![3]);
        assert_eq!(moves.get(frozen_id).unwrap().priority(), 0);
    }
}
