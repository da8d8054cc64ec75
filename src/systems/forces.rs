//! External forces System.
//!
//! Integrates every registered [`ExternalForces`] and adds the displacement
//! to the actor's [`PassiveEffects`]. Runs in the effects slot, after gravity
//! and before the Brain consumes the total.

use bevy_ecs::prelude::*;

use crate::components::externalforces::ExternalForces;
use crate::components::passiveeffects::PassiveEffects;
use crate::resources::systemtable::BatchSystem;
use crate::systems::order;

type ForcesQuery = (&'static mut ExternalForces, &'static mut PassiveEffects);

#[derive(Default)]
pub struct ExternalForcesSystem {
    query: Option<QueryState<ForcesQuery>>,
}

impl BatchSystem for ExternalForcesSystem {
    fn name(&self) -> &'static str {
        "external_forces"
    }

    fn order(&self) -> i32 {
        order::EFFECTS
    }

    fn update(&mut self, world: &mut World, components: &[Entity], dt: f32) {
        let query = self.query.get_or_insert_with(|| world.query::<ForcesQuery>());
        for &actor in components {
            // Validation reports actors lacking either component.
            if let Ok((mut forces, mut effects)) = query.get_mut(world, actor) {
                let displacement = forces.integrate(dt);
                effects.add(displacement);
            }
        }
    }
}
