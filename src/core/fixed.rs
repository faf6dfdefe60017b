//! Scaled-Integer Arithmetic
//!
//! Positions, velocities and radii are integers scaled by 1024.
//! All gameplay arithmetic is integer-only; the one place floating point is
//! allowed is the angle table build in [`super::trig`].
//!
//! ## Format
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Fixed = i32, value = raw / 1024                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  1 pixel        = 1024                                      │
//! │  800 px world   = 819_200   (fits i32 with lots of room)    │
//! │  squared values are always computed in i64                  │
//! │  collision maths divides by 32 before squaring              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

/// Scaled integer. 1024 raw units per pixel.
pub type Fixed = i32;

/// Fixed-point scale factor (1.0 = 1024).
pub const FIXED_SCALE: Fixed = 1024;

/// Reduced scale used by collision maths to keep squared distances small.
pub const FIXED_HALF_SCALE: Fixed = 32;

// =============================================================================
// ANGLES
// =============================================================================

/// Discretisation of one full turn. 0 = north, increasing clockwise.
pub const ROTATION_STEPS: i32 = 360;

// =============================================================================
// SHIPS
// =============================================================================

/// Ship size fudge, as a ratio (4/5).
const SHIP_SCALE_NUM: i32 = 4;
const SHIP_SCALE_DEN: i32 = 5;

/// Player ship collision radius: 38 px * 0.8.
pub const SHIP_RADIUS: Fixed = 38 * FIXED_SCALE * SHIP_SCALE_NUM / SHIP_SCALE_DEN;

/// Cannon collision radius: 40 px * 0.8.
pub const CANNON_RADIUS: Fixed = 40 * FIXED_SCALE * SHIP_SCALE_NUM / SHIP_SCALE_DEN;

/// Thrust multiplier applied to the angle table entry.
pub const SHIP_ACCELERATION_FACTOR: Fixed = 1;

/// Ship speed cap: 10 px per tick.
pub const SHIP_MAX_VELOCITY: Fixed = 10 * FIXED_SCALE;

/// Player max turn rate in angle steps per tick.
pub const PLAYER_MAX_TURN_RATE: i32 = 4;

/// Rotation-acceleration impulse applied per tick while a turn key is held.
pub const TURN_IMPULSE: i32 = 2;

/// Player energy cap.
pub const SHIP_MAX_ENERGY: i32 = 1000;

/// Cannon energy cap.
pub const CANNON_MAX_ENERGY: i32 = 2000;

/// Player energy regenerated per tick.
pub const SHIP_ENERGY_REGEN: i32 = 1;

/// Cannon energy regenerated per tick.
pub const CANNON_ENERGY_REGEN: i32 = 3;

/// Energy removed from a ship by one missile.
pub const DAMAGE_PER_MISSILE: i32 = 100;

/// Energy a ship spends to fire one missile.
pub const ENERGY_PER_MISSILE: i32 = 10;

/// Bounce damage = relative speed / this.
pub const DAMAGE_PER_SHIP_BOUNCE_DIVISOR: i32 = 3;

/// Ticks between shots (a shot every 8/25 s).
pub const TICKS_BETWEEN_FIRE: u32 = 8;

// =============================================================================
// MISSILES
// =============================================================================

/// Missile pool capacity.
pub const MAX_MISSILES: usize = 60;

/// Missile collision radius: 4 px.
pub const MISSILE_RADIUS: Fixed = 4 * FIXED_SCALE;

/// Missile launch speed multiplier on the angle table entry (8 px per tick).
pub const MISSILE_SPEED: Fixed = 8;

/// Ticks a live missile flies.
pub const MISSILE_TICKS_TO_LIVE: i32 = 60;

/// Ticks an exploded missile lingers.
pub const MISSILE_EXPLOSION_TICKS_TO_LIVE: i32 = 6;

// =============================================================================
// RINGS
// =============================================================================

/// Segments per shield ring.
pub const SEGMENTS_PER_RING: usize = 8;

/// Ring capacity.
pub const MAX_RINGS: usize = 6;

/// Rings at level 0.
pub const BASE_RING_COUNT: usize = 3;

/// Radius of the innermost ring: 60 px.
pub const SHIELD_INNER_RADIUS: Fixed = 60 * FIXED_SCALE;

/// Radial spacing between rings: 10 px.
pub const SHIELD_RING_SPACING: Fixed = 10 * FIXED_SCALE;

/// Inner edge of the collision band as a fraction of the ring radius (4/5).
pub const RING_INNER_FRACTION_NUM: i64 = 4;
/// Denominator of [`RING_INNER_FRACTION_NUM`].
pub const RING_INNER_FRACTION_DEN: i64 = 5;

/// Ship/ring bounce: push recovery fraction (5/8 of the overlap).
pub const BOUNCE_RECOVERY_NUM: i64 = 5;
/// Denominator of [`BOUNCE_RECOVERY_NUM`].
pub const BOUNCE_RECOVERY_DEN: i64 = 8;

/// Gravity pull divisor applied to the angle table entry.
pub const GRAVITY_DIVISOR: i32 = 16;

/// Number of background stars.
pub const NUMBER_OF_STARS: usize = 30;

// =============================================================================
// CORE OPERATIONS
// =============================================================================

/// Convert whole pixels to fixed-point.
#[inline]
pub const fn from_pixels(px: i32) -> Fixed {
    px * FIXED_SCALE
}

/// Convert fixed-point to whole pixels (truncating toward zero).
#[inline]
pub const fn to_pixels(f: Fixed) -> i32 {
    f / FIXED_SCALE
}

/// Integer square root, floor(sqrt(x)). Returns 0 for non-positive input.
///
/// Newton iteration on i64; terminates as soon as the estimate stops
/// decreasing, so the result is exact for every input.
pub fn isqrt(x: i64) -> i64 {
    if x <= 0 {
        return 0;
    }
    if x < 4 {
        return 1;
    }

    let mut guess = x / 2;
    loop {
        let next = (guess + x / guess) / 2;
        if next >= guess {
            break;
        }
        guess = next;
    }

    // Newton from above lands on floor(sqrt(x)); correct any off-by-one.
    while guess * guess > x {
        guess -= 1;
    }
    while (guess + 1) * (guess + 1) <= x {
        guess += 1;
    }
    guess
}

/// Normalise an angle index into [0, ROTATION_STEPS).
#[inline]
pub fn normalize_rotation(rotation: i32) -> i32 {
    rotation.rem_euclid(ROTATION_STEPS)
}

/// Signed shortest angular difference `to - from`, in [-N/2, N/2).
#[inline]
pub fn angle_difference(from: i32, to: i32) -> i32 {
    let half = ROTATION_STEPS / 2;
    (to - from + half).rem_euclid(ROTATION_STEPS) - half
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_constants() {
        assert_eq!(FIXED_SCALE, 1024);
        assert_eq!(FIXED_HALF_SCALE, 32);
        assert_eq!(SHIP_RADIUS, 31129);
        assert_eq!(CANNON_RADIUS, 32768);
        assert_eq!(ROTATION_STEPS as usize % SEGMENTS_PER_RING, 0);
    }

    #[test]
    fn test_pixel_conversion() {
        assert_eq!(from_pixels(800), 819_200);
        assert_eq!(to_pixels(from_pixels(37)), 37);
        assert_eq!(to_pixels(1023), 0);
    }

    #[test]
    fn test_isqrt() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(-5), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(3), 1);
        assert_eq!(isqrt(4), 2);
        assert_eq!(isqrt(8), 2);
        assert_eq!(isqrt(9), 3);
        assert_eq!(isqrt(20), 4);
        assert_eq!(isqrt(1_000_000), 1000);
        assert_eq!(isqrt(999_999), 999);

        for x in 0..5000i64 {
            let r = isqrt(x);
            assert!(r * r <= x && (r + 1) * (r + 1) > x, "isqrt({x}) = {r}");
        }
    }

    #[test]
    fn test_normalize_rotation() {
        assert_eq!(normalize_rotation(0), 0);
        assert_eq!(normalize_rotation(360), 0);
        assert_eq!(normalize_rotation(-1), 359);
        assert_eq!(normalize_rotation(-721), 359);
        assert_eq!(normalize_rotation(725), 5);
    }

    #[test]
    fn test_angle_difference() {
        assert_eq!(angle_difference(0, 10), 10);
        assert_eq!(angle_difference(10, 0), -10);
        assert_eq!(angle_difference(350, 10), 20);
        assert_eq!(angle_difference(10, 350), -20);
        // Exactly opposite maps to the negative end of the range
        assert_eq!(angle_difference(0, 180), -180);
        assert_eq!(angle_difference(90, 270), -180);
    }
}
