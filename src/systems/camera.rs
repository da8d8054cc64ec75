//! Camera and IK collaborators of the Brain.
//!
//! Both are optional: without a [`CameraRig`] resource or an [`IkRig`]
//! component the observers do nothing.

use bevy_ecs::prelude::*;
use glam::Vec3;

use crate::components::ikrig::IkRig;
use crate::events::brain::{CameraUpdateEvent, IkUpdateEvent};
use crate::resources::camerarig::CameraRig;
use crate::resources::worldtime::WorldTime;

/// Lean saturates at this horizontal speed (units per tick).
const FULL_LEAN_STEP: f32 = 0.25;

/// Track the followed actor's pose.
pub fn camera_follow_observer(trigger: On<CameraUpdateEvent>, rig: Option<ResMut<CameraRig>>) {
    let Some(mut rig) = rig else {
        return;
    };
    let event = trigger.event();
    if rig.target != Some(event.actor) {
        return;
    }
    rig.focus = event.position;
    rig.focus_yaw = event.yaw;
}

/// Refresh the actor's IK targets from the applied motion.
pub fn ik_update_observer(trigger: On<IkUpdateEvent>, mut rigs: Query<&mut IkRig>) {
    let event = trigger.event();
    let Ok(mut rig) = rigs.get_mut(event.actor) else {
        return;
    };
    let (sin, cos) = event.yaw.to_radians().sin_cos();
    rig.look_target = event.position + Vec3::new(sin, 0.0, cos);
    let horizontal = Vec3::new(event.displacement.x, 0.0, event.displacement.z);
    rig.stride_distance += horizontal.length();
    rig.lean = (horizontal / FULL_LEAN_STEP).clamp(Vec3::NEG_ONE, Vec3::ONE);
    rig.updates += 1;
}

/// Ease the camera toward its desired position. LateUpdate host system.
pub fn smooth_camera_rig(rig: Option<ResMut<CameraRig>>, time: Res<WorldTime>) {
    let Some(mut rig) = rig else {
        return;
    };
    if rig.target.is_none() {
        return;
    }
    let desired = rig.desired_position();
    if rig.smoothing <= 0.0 {
        rig.position = desired;
        return;
    }
    let t = (rig.smoothing * time.step_delta).clamp(0.0, 1.0);
    rig.position = rig.position.lerp(desired, t);
}

/// Register both observers.
pub fn add_brain_observers(world: &mut World) {
    world.add_observer(camera_follow_observer);
    world.add_observer(ik_update_observer);
    world.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_follows_only_its_target() {
        let mut world = World::new();
        add_brain_observers(&mut world);
        let followed = world.spawn_empty().id();
        let other = world.spawn_empty().id();
        world.insert_resource(CameraRig::following(followed));

        world.trigger(CameraUpdateEvent {
            actor: other,
            position: Vec3::splat(9.0),
            yaw: 0.0,
        });
        assert_eq!(world.resource::<CameraRig>().focus, Vec3::ZERO);

        world.trigger(CameraUpdateEvent {
            actor: followed,
            position: Vec3::new(1.0, 0.0, 2.0),
            yaw: 90.0,
        });
        let rig = world.resource::<CameraRig>();
        assert_eq!(rig.focus, Vec3::new(1.0, 0.0, 2.0));
        assert_eq!(rig.focus_yaw, 90.0);
    }

    #[test]
    fn test_missing_collaborators_are_skipped() {
        let mut world = World::new();
        add_brain_observers(&mut world);
        let actor = world.spawn_empty().id();
        world.trigger(CameraUpdateEvent {
            actor,
            position: Vec3::ONE,
            yaw: 0.0,
        });
        world.trigger(IkUpdateEvent {
            actor,
            position: Vec3::ONE,
            yaw: 0.0,
            displacement: Vec3::X,
        });
        assert!(!world.contains_resource::<CameraRig>());
    }

    #[test]
    fn test_ik_accumulates_stride() {
        let mut world = World::new();
        add_brain_observers(&mut world);
        let actor = world.spawn(IkRig::default()).id();
        for _ in 0..2 {
            world.trigger(IkUpdateEvent {
                actor,
                position: Vec3::ZERO,
                yaw: 0.0,
                displacement: Vec3::new(0.1, 5.0, 0.0),
            });
        }
        let rig = world.get::<IkRig>(actor).unwrap();
        assert_eq!(rig.updates, 2);
        assert!((rig.stride_distance - 0.2).abs() < 1e-5);
        assert!((rig.lean.x - 0.4).abs() < 1e-5);
        assert_eq!(rig.look_target, Vec3::new(0.0, 0.0, 1.0));
    }
}
