//! Combat Resolution
//!
//! Applies the consequences of detected contacts: missile launches, missile
//! hits on ships and ring segments, the player bouncing off the shield, and
//! per-tick energy bookkeeping.

use tracing::debug;

use crate::core::fixed::{
    isqrt, BOUNCE_RECOVERY_DEN, BOUNCE_RECOVERY_NUM, DAMAGE_PER_MISSILE,
    DAMAGE_PER_SHIP_BOUNCE_DIVISOR, ENERGY_PER_MISSILE, FIXED_SCALE, MISSILE_RADIUS,
    MISSILE_SPEED, SHIP_RADIUS,
};
use crate::game::collision::{bodies_collide, circles_collide, in_ring_band, segment_index};
use crate::game::events::GameEventData;
use crate::game::state::{Missile, SegmentHit, ShipKind, World};

/// Distance from a ship's centre to a fresh missile, in table units.
const LAUNCH_OFFSET: i32 = (SHIP_RADIUS + MISSILE_RADIUS) / FIXED_SCALE;

/// Order ships are tested against a missile.
const SHIP_CHECK_ORDER: [ShipKind; 2] = [ShipKind::Cannon, ShipKind::Player];

// =============================================================================
// FIRING
// =============================================================================

/// Run a ship's weapon for one tick.
///
/// With the cooldown at zero, a ship that wants to fire and has more energy
/// than a shot costs launches one missile. Otherwise the cooldown ticks down.
/// Returns the pool slot used, if any.
pub fn fire_if_ready(world: &mut World, kind: ShipKind) -> Option<usize> {
    let ship = world.ship_mut(kind);
    if !ship.alive {
        return None;
    }
    if ship.ticks_until_can_fire > 0 {
        ship.ticks_until_can_fire -= 1;
        return None;
    }
    if !ship.intent.firing || ship.energy <= ENERGY_PER_MISSILE {
        return None;
    }

    ship.energy -= ENERGY_PER_MISSILE;
    ship.ticks_until_can_fire += ship.fire_interval;
    Some(launch_missile(world, kind))
}

/// Put a missile in flight from the nose of `kind`. Returns its slot.
pub fn launch_missile(world: &mut World, kind: ShipKind) -> usize {
    let body = world.ship(kind).body;
    let heading = world.table.direction(body.rotation);

    let position = body
        .position
        .add(heading.scale_int(LAUNCH_OFFSET))
        .wrap(world.bounds.width, world.bounds.height);
    let velocity = body.velocity.add(heading.scale_int(MISSILE_SPEED));

    let slot = world
        .missiles
        .claim(Missile::launch(kind, position, velocity, body.rotation));
    world.push_event(GameEventData::MissileFired { owner: kind, slot });
    slot
}

// =============================================================================
// MISSILE CONTACTS
// =============================================================================

/// Test one missile against the live rings (innermost first) and then the
/// living ships. The first contact that lands explodes the missile and ends
/// the checks. Exploded or free slots are skipped.
pub fn check_missile_collisions(world: &mut World, slot: usize) {
    let missile = match world.missiles.get(slot) {
        Some(m) if m.lifetime > 0 && !m.exploded => *m,
        _ => return,
    };
    let pos = missile.body.position;
    let radius = missile.body.radius;

    for ring_index in 0..world.params.ring_count {
        let ring = &world.rings[ring_index];
        if !ring.alive() || !in_ring_band(pos, radius, ring.body.position, ring.body.radius) {
            continue;
        }
        let segment = segment_index(&world.table, ring.body.position, ring.body.rotation, pos);
        if resolve_segment_hit(world, ring_index, segment, slot) {
            return;
        }
    }

    for kind in SHIP_CHECK_ORDER {
        let ship = world.ship(kind);
        if ship.alive && circles_collide(pos, radius, ship.body.position, ship.body.radius) {
            resolve_ship_hit(world, kind, slot);
            return;
        }
    }
}

/// Missile in `slot` strikes ship `kind`.
pub fn resolve_ship_hit(world: &mut World, kind: ShipKind, slot: usize) {
    let Some(missile) = world.missiles.get_mut(slot) else {
        return;
    };
    missile.explode();
    let by = missile.owner;

    let ship = world.ship_mut(kind);
    ship.energy -= DAMAGE_PER_MISSILE;
    ship.was_hit = true;
    let energy_left = ship.energy;

    debug!(?kind, ?by, energy_left, "ship hit");
    world.push_event(GameEventData::ShipHit {
        ship: kind,
        by,
        energy_left,
    });

    if by == ShipKind::Player && kind == ShipKind::Cannon {
        let points = world.config.scoring.per_cannon_hit;
        world.award(points);
    }
}

/// Missile in `slot` reaches `segment` of ring `ring_index`.
///
/// A destroyed segment lets the missile through and returns false. Otherwise
/// the segment loses one point, the missile explodes and this returns true.
pub fn resolve_segment_hit(world: &mut World, ring_index: usize, segment: usize, slot: usize) -> bool {
    let outcome = world.rings[ring_index].hit_segment(segment);
    if outcome == SegmentHit::AlreadyDestroyed {
        return false;
    }

    let Some(missile) = world.missiles.get_mut(slot) else {
        return true;
    };
    missile.explode();
    let by = missile.owner;

    let energy_left = world.rings[ring_index].segment_energy(segment);
    debug!(ring = ring_index, segment, energy_left, ?by, "ring segment hit");
    world.push_event(GameEventData::SegmentHit {
        ring: ring_index,
        segment,
        energy_left,
        by,
    });

    if let SegmentHit::Destroyed { ring_destroyed: true } = outcome {
        debug!(ring = ring_index, "ring destroyed");
        world.push_event(GameEventData::RingDestroyed { ring: ring_index });
    }

    if by == ShipKind::Player {
        let points = world.config.scoring.per_segment_hit;
        world.award(points);
    }
    true
}

// =============================================================================
// SHIELD BOUNCE
// =============================================================================

/// Bounce the player off the innermost live ring if they overlap.
///
/// The ring never moves, so the ship takes the whole push: twice the
/// recovery fraction of the overlap, directly away from the ring centre.
/// Velocity becomes 5/8 of the ring's minus 2/8 of the ship's, and damage is
/// the pre-bounce relative speed over the bounce divisor. Returns the damage.
pub fn bounce_off_shield(world: &mut World) -> Option<i32> {
    if !world.player.alive {
        return None;
    }
    let ring_index = world.active_rings().iter().position(|r| r.alive())?;
    let ring = world.rings[ring_index].body;
    if !bodies_collide(&ring, &world.player.body) {
        return None;
    }

    let bounds = world.bounds;
    let player = &mut world.player;
    let ship = player.body;

    let delta = ring.position.sub(ship.position);
    let distance = isqrt(delta.length_squared());
    // Coincident centres have no separating direction
    if distance > 0 {
        let overlap = i64::from(ring.radius + ship.radius) - distance;
        let push_length = overlap * BOUNCE_RECOVERY_NUM / BOUNCE_RECOVERY_DEN;
        let push = delta.scale_ratio(push_length, distance);
        player.body.position = ship
            .position
            .sub(push.scale_int(2))
            .wrap(bounds.width, bounds.height);
    }

    let relative = ring.velocity.sub(ship.velocity);
    let damage = isqrt(relative.reduced_length_squared()) as i32 / DAMAGE_PER_SHIP_BOUNCE_DIVISOR;

    player.energy -= damage;
    player.was_hit = true;
    player.body.velocity = ring
        .velocity
        .scale_ratio(BOUNCE_RECOVERY_NUM, BOUNCE_RECOVERY_DEN)
        .add(ship.velocity.scale_ratio(-2, BOUNCE_RECOVERY_DEN));

    debug!(ring = ring_index, damage, "player bounced off shield");
    world.push_event(GameEventData::ShipBounced {
        ring: ring_index,
        damage,
    });
    Some(damage)
}

// =============================================================================
// ENERGY
// =============================================================================

/// Regenerate living ships and retire ships whose energy ran out.
///
/// A ship at or below zero is clamped to zero and stops being alive. Dead
/// ships never regenerate; only a reset brings them back.
pub fn update_energy(world: &mut World) {
    for kind in SHIP_CHECK_ORDER {
        let ship = world.ship_mut(kind);
        if ship.energy <= 0 {
            ship.energy = 0;
            if ship.alive {
                ship.alive = false;
                debug!(?kind, "ship destroyed");
                world.push_event(GameEventData::ShipDestroyed { ship: kind });
            }
        } else if ship.alive {
            ship.energy = (ship.energy + ship.energy_regen).min(ship.max_energy);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
