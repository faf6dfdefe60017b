//! Adversary AI
//!
//! Per-tick aim/turn/fire decision for the cannon. The decision only sets
//! the cannon's turn speed and fire intent; the ship integrator carries
//! them out later in the same tick.

use serde::{Deserialize, Serialize};

use crate::core::fixed::{angle_difference, ROTATION_STEPS};
use crate::game::collision::segment_at_bearing;
use crate::game::state::World;

/// What the cannon chose to do this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CannonDecision {
    /// Player dead (or cannon dead): no firing, no turning.
    Idle,
    /// On target with a clear shot.
    Fire,
    /// On target but its own shield is in the way.
    Hold,
    /// Player exactly behind; keep turning the way it was going.
    Opposed,
    /// Turning toward the player. Negative is counter-clockwise.
    Turn(i32),
}

/// Decide the cannon's action for this tick.
///
/// Priority: aligned, then opposed, then turn along the short arc. A turn
/// never overshoots: the speed is capped at the remaining difference.
pub fn operate_cannon(world: &mut World) -> CannonDecision {
    if !world.player.alive || !world.cannon.alive {
        world.cannon.intent.firing = false;
        world.cannon.body.rotation_speed = 0;
        return CannonDecision::Idle;
    }

    let rotation = world.cannon.body.rotation;
    let bearing = world
        .table
        .bearing_between(world.cannon.body.position, world.player.body.position);
    let turn_rate = world.cannon.max_turn_rate;

    if bearing == rotation {
        let clear = shot_is_clear(world, rotation);
        let cannon = &mut world.cannon;
        cannon.body.rotation_speed = 0;
        cannon.intent.firing = clear;
        return if clear {
            CannonDecision::Fire
        } else {
            CannonDecision::Hold
        };
    }

    let cannon = &mut world.cannon;
    cannon.intent.firing = false;

    let diff = angle_difference(rotation, bearing);
    if diff == -ROTATION_STEPS / 2 {
        let direction = if cannon.body.rotation_speed < 0 { -1 } else { 1 };
        cannon.body.rotation_speed = direction * turn_rate;
        return CannonDecision::Opposed;
    }

    let speed = diff.signum() * turn_rate.min(diff.abs());
    cannon.body.rotation_speed = speed;
    CannonDecision::Turn(speed)
}

/// Whether a missile fired along `rotation` would get past the cannon's
/// own shield without chipping an intact segment of a damaged ring.
///
/// Below the full-check level only the outermost live ring is considered.
/// From that level on, the first live ring along the line (innermost out)
/// whose aligned segment still stands decides. A ring with no segment shot
/// away always allows the shot so the attrition can start; chipped
/// segments do not count against it.
pub fn shot_is_clear(world: &World, rotation: i32) -> bool {
    let rings = world.active_rings();
    let blocking = if world.params.checks_full_shield() {
        rings
            .iter()
            .filter(|r| r.alive())
            .find(|r| r.segment_energy(segment_at_bearing(rotation, r.body.rotation)) > 0)
    } else {
        rings
            .iter()
            .rev()
            .find(|r| r.alive())
            .filter(|r| r.segment_energy(segment_at_bearing(rotation, r.body.rotation)) > 0)
    };

    blocking.map_or(true, |ring| ring.is_undamaged())
}

// =============================================================================
// TESTS
// =============================================================================
