//! Angle Table
//!
//! Precomputed fixed-point cosine/sine over a discretised circle.
//!
//! Convention: index 0 points north (straight up), indices increase
//! clockwise, and the y axis grows downward. `cos(i)` is therefore the x
//! component of heading `i` and `sin(i)` the y component, both scaled by
//! [`FIXED_SCALE`].
//!
//! This module is the only place floating point is used. The tables are
//! filled once when the table is built; `bearing` maps an `atan2` result
//! onto the same discretisation.

use std::f64::consts::{PI, TAU};

use super::fixed::{normalize_rotation, Fixed, FIXED_SCALE, ROTATION_STEPS};
use super::vec2::FixedVec2;

const STEPS: usize = ROTATION_STEPS as usize;

/// Fixed-point trig lookup table.
#[derive(Clone)]
pub struct AngleTable {
    cos: [Fixed; STEPS],
    sin: [Fixed; STEPS],
}

impl AngleTable {
    /// Build the table.
    pub fn new() -> Self {
        let mut cos = [0; STEPS];
        let mut sin = [0; STEPS];
        let quarter = ROTATION_STEPS / 4;

        for i in 0..STEPS {
            // Our 0 is north and clockwise; libm's 0 is east and counter-clockwise.
            let radians = f64::from(quarter - i as i32) * TAU / f64::from(ROTATION_STEPS);
            cos[i] = (radians.cos() * f64::from(FIXED_SCALE)) as Fixed;
            // y grows downward on screen
            sin[i] = -((radians.sin() * f64::from(FIXED_SCALE)) as Fixed);
        }

        Self { cos, sin }
    }

    /// X component of heading `rotation`, scaled by 1024.
    #[inline]
    pub fn cos(&self, rotation: i32) -> Fixed {
        self.cos[normalize_rotation(rotation) as usize]
    }

    /// Y component of heading `rotation`, scaled by 1024.
    #[inline]
    pub fn sin(&self, rotation: i32) -> Fixed {
        self.sin[normalize_rotation(rotation) as usize]
    }

    /// Unit heading vector (length ~1024) for `rotation`.
    #[inline]
    pub fn direction(&self, rotation: i32) -> FixedVec2 {
        FixedVec2::new(self.cos(rotation), self.sin(rotation))
    }

    /// Discrete bearing of the vector `(dx, dy)`, in [0, ROTATION_STEPS).
    ///
    /// Rounds to the nearest step. Total: `bearing(0, 0)` is 90 (east),
    /// which is what `atan2(0, 0) = 0` maps to.
    pub fn bearing(&self, dy: Fixed, dx: Fixed) -> i32 {
        let theta = f64::from(dy).atan2(f64::from(dx)); // [-PI, PI]
        let steps = ((theta + PI) * f64::from(ROTATION_STEPS) / TAU).round() as i32;
        // atan2's -PI (west) lands on 0; rotate so north is 0 and clockwise grows.
        normalize_rotation(steps + 3 * ROTATION_STEPS / 4)
    }

    /// Bearing from `from` toward `to`.
    #[inline]
    pub fn bearing_between(&self, from: FixedVec2, to: FixedVec2) -> i32 {
        let delta = to.sub(from);
        self.bearing(delta.y, delta.x)
    }
}

impl Default for AngleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AngleTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AngleTable({} steps)", STEPS)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cardinal_directions() {
        let table = AngleTable::new();

        // North: straight up, y negative
        assert_eq!(table.cos(0), 0);
        assert_eq!(table.sin(0), -FIXED_SCALE);

        // East
        assert_eq!(table.cos(90), FIXED_SCALE);
        assert_eq!(table.sin(90), 0);

        // South
        assert_eq!(table.cos(180), 0);
        assert_eq!(table.sin(180), FIXED_SCALE);

        // West
        assert_eq!(table.cos(270), -FIXED_SCALE);
        assert_eq!(table.sin(270), 0);
    }

    #[test]
    fn test_lookup_normalizes_index() {
        let table = AngleTable::new();
        assert_eq!(table.cos(-90), table.cos(270));
        assert_eq!(table.sin(450), table.sin(90));
    }

    #[test]
    fn test_bearing_cardinals() {
        let table = AngleTable::new();
        assert_eq!(table.bearing(-100, 0), 0);
        assert_eq!(table.bearing(0, 100), 90);
        assert_eq!(table.bearing(100, 0), 180);
        assert_eq!(table.bearing(0, -100), 270);
    }

    #[test]
    fn test_bearing_of_origin_is_defined() {
        let table = AngleTable::new();
        assert_eq!(table.bearing(0, 0), 90);
    }

    #[test]
    fn test_bearing_inverts_table() {
        let table = AngleTable::new();
        for i in 0..ROTATION_STEPS {
            assert_eq!(table.bearing(table.sin(i), table.cos(i)), i, "heading {i}");
        }
    }

    #[test]
    fn test_bearing_between() {
        let table = AngleTable::new();
        let a = FixedVec2::from_pixels(100, 100);
        let b = FixedVec2::from_pixels(100, 50);
        assert_eq!(table.bearing_between(a, b), 0);
        assert_eq!(table.bearing_between(b, a), 180);
    }

    proptest! {
        #[test]
        fn prop_bearing_in_range(dy in any::<i32>(), dx in any::<i32>()) {
            let table = AngleTable::new();
            let b = table.bearing(dy, dx);
            prop_assert!((0..ROTATION_STEPS).contains(&b));
        }
    }
}
