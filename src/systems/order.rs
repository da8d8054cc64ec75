//! Execution-order constants for batch Systems.
//!
//! Within one timing's native phase, Systems run by ascending
//! [`BatchSystem::order`](crate::resources::systemtable::BatchSystem::order),
//! then by creation. External Systems should pick values relative to these so
//! they land in the intended slot, e.g. `order::BRAIN + 10` for something that
//! must see the applied transform but run before post-update work.

pub const PRE_UPDATE_CHECK: i32 = -400;
pub const GRAVITY: i32 = -300;
pub const EFFECTS: i32 = -200;
pub const CONTROL: i32 = -100;
pub const BRAIN: i32 = 0;
pub const POST_UPDATE: i32 = 100;
pub const CAMERA: i32 = 200;
pub const IK: i32 = 300;

/// Every named slot, in run order.
pub const ALL: [(&str, i32); 8] = [
    ("pre_update_check", PRE_UPDATE_CHECK),
    ("gravity", GRAVITY),
    ("effects", EFFECTS),
    ("control", CONTROL),
    ("brain", BRAIN),
    ("post_update", POST_UPDATE),
    ("camera", CAMERA),
    ("ik", IK),
];
