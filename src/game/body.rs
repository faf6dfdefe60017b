//! Physics Body
//!
//! Kinematic state shared by ships, missiles and rings, plus the per-tick
//! Euler integration and toroidal wrap rules.

use serde::{Deserialize, Serialize};

use crate::core::fixed::{normalize_rotation, Fixed, SHIP_ACCELERATION_FACTOR};
use crate::core::trig::AngleTable;
use crate::core::vec2::FixedVec2;

/// World extent in fixed-point units. Positions live in [0, width) x [0, height).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Width (x1024)
    pub width: Fixed,
    /// Height (x1024)
    pub height: Fixed,
}

impl WorldBounds {
    /// Centre of the world.
    #[inline]
    pub fn center(&self) -> FixedVec2 {
        FixedVec2::new(self.width / 2, self.height / 2)
    }

    /// Whether `pos` is inside the half-open world rectangle.
    #[inline]
    pub fn contains(&self, pos: FixedVec2) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }
}

/// 2D kinematic state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    /// Position, always wrapped into the world.
    pub position: FixedVec2,
    /// Velocity per tick.
    pub velocity: FixedVec2,
    /// Heading index in [0, ROTATION_STEPS).
    pub rotation: i32,
    /// Angle steps added to `rotation` each tick.
    pub rotation_speed: i32,
    /// Decaying impulse blended into `rotation_speed`.
    pub rotation_accel: i32,
    /// Collision radius.
    pub radius: Fixed,
}

impl Body {
    /// Body at rest.
    pub fn new(position: FixedVec2, rotation: i32, radius: Fixed) -> Self {
        Self {
            position,
            velocity: FixedVec2::ZERO,
            rotation: normalize_rotation(rotation),
            rotation_speed: 0,
            rotation_accel: 0,
            radius,
        }
    }

    /// Blend the pending impulse into the turn speed, then turn.
    ///
    /// The impulse is quartered every tick, which gives the spring-like
    /// response to turn input. Speed is capped at `max_turn_rate` only while
    /// an impulse is being blended in.
    pub fn integrate_rotation(&mut self, max_turn_rate: i32) {
        if self.rotation_accel != 0 {
            self.rotation_speed = (self.rotation_speed + self.rotation_accel)
                .clamp(-max_turn_rate, max_turn_rate);
            self.rotation_accel /= 4;
        }
        self.rotation = normalize_rotation(self.rotation + self.rotation_speed);
    }

    /// Add (`direction = 1`) or subtract (`-1`) one thrust step along the heading.
    #[inline]
    pub fn apply_thrust(&mut self, table: &AngleTable, direction: i32) {
        let push = table
            .direction(self.rotation)
            .scale_int(SHIP_ACCELERATION_FACTOR * direction);
        self.velocity = self.velocity.add(push);
    }

    /// Cap speed at `max_velocity`.
    ///
    /// When over the cap both components are scaled by max² / |v|², with
    /// the products taken in i64.
    pub fn clamp_velocity(&mut self, max_velocity: Fixed) {
        let v2 = self.velocity.length_squared();
        let m2 = i64::from(max_velocity) * i64::from(max_velocity);
        if v2 > m2 {
            self.velocity = self.velocity.scale_ratio(m2, v2);
        }
    }

    /// Move by one tick of velocity and wrap into the world.
    #[inline]
    pub fn integrate_position(&mut self, bounds: &WorldBounds) {
        self.position = self
            .position
            .add(self.velocity)
            .wrap(bounds.width, bounds.height);
    }

    /// Full passive step: turn, then move.
    #[inline]
    pub fn step(&mut self, bounds: &WorldBounds, max_turn_rate: i32) {
        self.integrate_rotation(max_turn_rate);
        self.integrate_position(bounds);
    }
}

// =============================================================================
// TESTS
// =============================================================================
