//! Collision Detection
//!
//! Deterministic geometric predicates for ships, missiles and shield rings.
//! Every comparison runs on squared distances in reduced units (components
//! divided by [`FIXED_HALF_SCALE`] before squaring) held in i64.

use crate::core::fixed::{
    normalize_rotation, Fixed, FIXED_HALF_SCALE, RING_INNER_FRACTION_DEN,
    RING_INNER_FRACTION_NUM, ROTATION_STEPS, SEGMENTS_PER_RING,
};
use crate::core::trig::AngleTable;
use crate::core::vec2::FixedVec2;
use crate::game::body::Body;

/// Angle steps covered by one ring segment.
pub const STEPS_PER_SEGMENT: i32 = ROTATION_STEPS / SEGMENTS_PER_RING as i32;

#[inline]
fn reduced_square(length: Fixed) -> i64 {
    let r = i64::from(length / FIXED_HALF_SCALE);
    r * r
}

/// Check if two circles overlap.
///
/// Strict: circles that exactly touch do not collide.
#[inline]
pub fn circles_collide(
    pos_a: FixedVec2,
    radius_a: Fixed,
    pos_b: FixedVec2,
    radius_b: Fixed,
) -> bool {
    pos_a.reduced_distance_squared(pos_b) < reduced_square(radius_a + radius_b)
}

/// Circle test on two bodies.
#[inline]
pub fn bodies_collide(a: &Body, b: &Body) -> bool {
    circles_collide(a.position, a.radius, b.position, b.radius)
}

/// Check if a small circle lies inside a ring's collision band.
///
/// The band is the annulus between `ring_radius * 4/5` and
/// `ring_radius + point_radius`, both bounds exclusive. Inside the inner edge
/// is open space, so a ring behaves like a shell rather than a disc.
pub fn in_ring_band(
    point: FixedVec2,
    point_radius: Fixed,
    ring_center: FixedVec2,
    ring_radius: Fixed,
) -> bool {
    let d2 = point.reduced_distance_squared(ring_center);
    let inner = (i64::from(ring_radius) * RING_INNER_FRACTION_NUM / RING_INNER_FRACTION_DEN) as Fixed;
    d2 < reduced_square(ring_radius + point_radius) && d2 > reduced_square(inner)
}

/// Index of the ring segment under `hit_point`.
///
/// The bearing from the ring centre is shifted into the ring's rotating
/// frame and normalised first, so the result is always below
/// `SEGMENTS_PER_RING`.
#[inline]
pub fn segment_index(
    table: &AngleTable,
    ring_center: FixedVec2,
    ring_rotation: i32,
    hit_point: FixedVec2,
) -> usize {
    segment_at_bearing(table.bearing_between(ring_center, hit_point), ring_rotation)
}

/// Segment of a ring with `ring_rotation` that lies on world `bearing`.
#[inline]
pub fn segment_at_bearing(bearing: i32, ring_rotation: i32) -> usize {
    (normalize_rotation(bearing + ring_rotation) / STEPS_PER_SEGMENT) as usize
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_pixels, MISSILE_RADIUS, SHIELD_INNER_RADIUS};
    use proptest::prelude::*;

    #[test]
    fn test_circles_collide_boundary() {
        // Radii on the reduced grid so the boundary is exact
        let ra = 10 * FIXED_HALF_SCALE;
        let rb = 20 * FIXED_HALF_SCALE;
        let origin = FixedVec2::ZERO;

        let touching = FixedVec2::new(ra + rb, 0);
        assert!(!circles_collide(origin, ra, touching, rb));

        let one_less = FixedVec2::new(ra + rb - 1, 0);
        assert!(circles_collide(origin, ra, one_less, rb));
    }

    #[test]
    fn test_far_circles_miss() {
        let a = FixedVec2::from_pixels(100, 100);
        let b = FixedVec2::from_pixels(300, 100);
        assert!(!circles_collide(a, from_pixels(30), b, from_pixels(30)));
        assert!(circles_collide(a, from_pixels(120), b, from_pixels(90)));
    }

    #[test]
    fn test_ring_band() {
        let center = FixedVec2::from_pixels(400, 300);
        let r = SHIELD_INNER_RADIUS; // 60 px, inner edge 48 px

        let on_ring = center.add(FixedVec2::from_pixels(60, 0));
        assert!(in_ring_band(on_ring, MISSILE_RADIUS, center, r));

        let just_outside = center.add(FixedVec2::from_pixels(0, 63));
        assert!(in_ring_band(just_outside, MISSILE_RADIUS, center, r));

        let beyond = center.add(FixedVec2::from_pixels(0, 64));
        assert!(!in_ring_band(beyond, MISSILE_RADIUS, center, r));

        let inner_edge = center.add(FixedVec2::from_pixels(-48, 0));
        assert!(!in_ring_band(inner_edge, MISSILE_RADIUS, center, r));

        // Hollow middle
        assert!(!in_ring_band(center, MISSILE_RADIUS, center, r));
    }

    #[test]
    fn test_segment_index_unrotated() {
        let table = AngleTable::new();
        let center = FixedVec2::from_pixels(400, 300);

        let north = center.add(FixedVec2::from_pixels(0, -60));
        assert_eq!(segment_index(&table, center, 0, north), 0);

        let east = center.add(FixedVec2::from_pixels(60, 0));
        assert_eq!(segment_index(&table, center, 0, east), 2);

        let south = center.add(FixedVec2::from_pixels(0, 60));
        assert_eq!(segment_index(&table, center, 0, south), 4);

        let west = center.add(FixedVec2::from_pixels(-60, 0));
        assert_eq!(segment_index(&table, center, 0, west), 6);
    }

    #[test]
    fn test_segment_index_follows_ring_rotation() {
        let table = AngleTable::new();
        let center = FixedVec2::from_pixels(400, 300);
        let east = center.add(FixedVec2::from_pixels(60, 0));

        // Bearing 90 shifted by 45 steps lands in segment 3
        assert_eq!(segment_index(&table, center, 45, east), 3);
        // Negative rotation wraps instead of going out of range
        assert_eq!(segment_index(&table, center, -135, east), 7);
    }

    proptest! {
        #[test]
        fn prop_collision_symmetric(
            ax in 0..819_200i32, ay in 0..614_400i32,
            bx in 0..819_200i32, by in 0..614_400i32,
            ra in 0..100_000i32, rb in 0..100_000i32,
        ) {
            let a = FixedVec2::new(ax, ay);
            let b = FixedVec2::new(bx, by);
            prop_assert_eq!(circles_collide(a, ra, b, rb), circles_collide(b, rb, a, ra));
        }

        #[test]
        fn prop_segment_index_in_range(bearing in any::<i32>(), rotation in -100_000..100_000i32) {
            let bearing = normalize_rotation(bearing);
            prop_assert!(segment_at_bearing(bearing, rotation) < SEGMENTS_PER_RING);
        }
    }
}
