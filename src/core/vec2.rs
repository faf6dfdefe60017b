//! Fixed-Point 2D Vector
//!
//! Positions and velocities in scaled-integer units.
//! Squared magnitudes widen to i64 so nothing overflows at world scale.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::fixed::{Fixed, FIXED_HALF_SCALE, FIXED_SCALE};

/// 2D vector with fixed-point components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedVec2 {
    /// X component (x1024)
    pub x: Fixed,
    /// Y component (x1024, grows downward)
    pub y: Fixed,
}

impl FixedVec2 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new vector from fixed-point components.
    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from whole pixels.
    #[inline]
    pub const fn from_pixels(x: i32, y: i32) -> Self {
        Self {
            x: x * FIXED_SCALE,
            y: y * FIXED_SCALE,
        }
    }

    /// Add another vector.
    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_add(other.x),
            y: self.y.wrapping_add(other.y),
        }
    }

    /// Subtract another vector.
    #[inline]
    pub fn sub(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_sub(other.x),
            y: self.y.wrapping_sub(other.y),
        }
    }

    /// Scale by an integer.
    #[inline]
    pub fn scale_int(self, scalar: i32) -> Self {
        Self {
            x: self.x.wrapping_mul(scalar),
            y: self.y.wrapping_mul(scalar),
        }
    }

    /// Scale by the ratio `num / den`, computed in i64.
    /// Returns ZERO if `den` is zero.
    #[inline]
    pub fn scale_ratio(self, num: i64, den: i64) -> Self {
        if den == 0 {
            return Self::ZERO;
        }
        Self {
            x: (i64::from(self.x) * num / den) as Fixed,
            y: (i64::from(self.y) * num / den) as Fixed,
        }
    }

    /// Squared length in raw units (i64, no reduction).
    #[inline]
    pub fn length_squared(self) -> i64 {
        let x = i64::from(self.x);
        let y = i64::from(self.y);
        x * x + y * y
    }

    /// Squared length after dividing each component by [`FIXED_HALF_SCALE`].
    ///
    /// This is the unit all collision comparisons use.
    #[inline]
    pub fn reduced_length_squared(self) -> i64 {
        let x = i64::from(self.x / FIXED_HALF_SCALE);
        let y = i64::from(self.y / FIXED_HALF_SCALE);
        x * x + y * y
    }

    /// Reduced squared distance to another point.
    #[inline]
    pub fn reduced_distance_squared(self, other: Self) -> i64 {
        self.sub(other).reduced_length_squared()
    }

    /// Wrap into [0, width) x [0, height) (toroidal world).
    #[inline]
    pub fn wrap(self, width: Fixed, height: Fixed) -> Self {
        Self {
            x: self.x.rem_euclid(width),
            y: self.y.rem_euclid(height),
        }
    }

    /// Negate both components.
    #[inline]
    pub fn negate(self) -> Self {
        Self {
            x: self.x.wrapping_neg(),
            y: self.y.wrapping_neg(),
        }
    }

    /// Convert to float pixels for rendering.
    #[inline]
    pub fn to_floats(self) -> (f32, f32) {
        (
            self.x as f32 / FIXED_SCALE as f32,
            self.y as f32 / FIXED_SCALE as f32,
        )
    }
}

impl Add for FixedVec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        FixedVec2::add(self, rhs)
    }
}

impl Sub for FixedVec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        FixedVec2::sub(self, rhs)
    }
}

impl Neg for FixedVec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        self.negate()
    }
}

impl fmt::Debug for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy) = self.to_floats();
        write!(f, "Vec2({:.3}, {:.3})", fx, fy)
    }
}

impl fmt::Display for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy) = self.to_floats();
        write!(f, "({:.1}, {:.1})", fx, fy)
    }
}

// =============================================================================
// TESTS
// =============================================================================
