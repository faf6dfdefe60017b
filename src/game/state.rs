//! Game State Definitions
//!
//! All entity types and the [`World`] that owns them. Entities are allocated
//! once when the world is built and reset in place on level changes and
//! lost lives.

use serde::{Deserialize, Serialize};

use crate::core::fixed::{
    isqrt, to_pixels, Fixed, BASE_RING_COUNT, CANNON_ENERGY_REGEN, CANNON_MAX_ENERGY,
    CANNON_RADIUS, FIXED_SCALE, MAX_MISSILES, MAX_RINGS, MISSILE_EXPLOSION_TICKS_TO_LIVE,
    MISSILE_RADIUS, MISSILE_TICKS_TO_LIVE, NUMBER_OF_STARS, PLAYER_MAX_TURN_RATE,
    SEGMENTS_PER_RING, SHIELD_INNER_RADIUS, SHIELD_RING_SPACING, SHIP_ENERGY_REGEN,
    SHIP_MAX_ENERGY, SHIP_RADIUS, TICKS_BETWEEN_FIRE,
};
use crate::core::hash::{compute_state_hash, StateHash, StateHasher};
use crate::core::rng::DeterministicRng;
use crate::core::trig::AngleTable;
use crate::core::vec2::FixedVec2;
use crate::game::body::{Body, WorldBounds};
use crate::game::config::{ConfigError, WorldConfig};
use crate::game::events::{GameEvent, GameEventData, EVENT_BUFFER_CAPACITY};
use crate::game::input::{InputEvent, InputFrame};
use crate::game::pool::{PoolSlot, SlotPool};

// =============================================================================
// LEVEL PARAMETERS
// =============================================================================

/// Difficulty knobs derived from the level number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelParams {
    /// Level these were computed for (0-based).
    pub level: u32,
    /// Rings guarding the cannon.
    pub ring_count: usize,
    /// Hits each ring segment absorbs.
    pub segment_energy: u32,
    /// Cannon turn rate in angle steps per tick.
    pub cannon_turn_rate: i32,
    /// Ring rotation speed magnitude.
    pub ring_spin: i32,
    /// Ticks between cannon shots.
    pub cannon_fire_interval: u32,
    /// Pull of the cannon on the player, in sixteenths of a table unit.
    pub gravity: i32,
}

impl LevelParams {
    /// Level from which the cannon checks every ring along its line of fire.
    pub const FULL_SHIELD_CHECK_LEVEL: u32 = 4;

    /// Compute the parameters for `level`, never exceeding `max_rings` rings.
    pub fn for_level(level: u32, max_rings: usize) -> Self {
        let max_rings = max_rings.clamp(1, MAX_RINGS);
        Self {
            level,
            ring_count: (BASE_RING_COUNT + level as usize / 4).min(max_rings),
            segment_energy: 1 + isqrt(i64::from(level)) as u32,
            cannon_turn_rate: 1 + (level % 4) as i32,
            ring_spin: 1 + (level % 3) as i32,
            cannon_fire_interval: TICKS_BETWEEN_FIRE - level % 5,
            gravity: (level % 3) as i32,
        }
    }

    /// Whether the cannon looks past the outermost ring before firing.
    #[inline]
    pub fn checks_full_shield(&self) -> bool {
        self.level >= Self::FULL_SHIELD_CHECK_LEVEL
    }
}

// =============================================================================
// SHIPS
// =============================================================================

/// Which of the two ships.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ShipKind {
    /// Human-controlled ship
    #[default]
    Player = 0,
    /// Adversary at the centre of the rings
    Cannon = 1,
}

/// Control intent held by a ship for the current tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipIntent {
    /// Accelerate forward
    pub thrusting: bool,
    /// Accelerate backward
    pub reversing: bool,
    /// Fire when the cooldown allows
    pub firing: bool,
}

/// A ship: the player or the cannon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    /// Identity, also used as missile colour by renderers
    pub kind: ShipKind,
    /// Kinematic state
    pub body: Body,
    /// Current energy, 0..=max_energy
    pub energy: i32,
    /// Energy cap
    pub max_energy: i32,
    /// Energy regained per tick while alive
    pub energy_regen: i32,
    /// False once energy reaches zero, until the next reset
    pub alive: bool,
    /// Ticks until the next shot is allowed
    pub ticks_until_can_fire: u32,
    /// Cooldown added after each shot
    pub fire_interval: u32,
    /// Turn speed cap
    pub max_turn_rate: i32,
    /// Control intent
    pub intent: ShipIntent,
    /// Hit this tick (cleared at the start of every tick)
    pub was_hit: bool,
}

impl Ship {
    /// Fresh player ship.
    pub fn player(position: FixedVec2, rotation: i32) -> Self {
        Self {
            kind: ShipKind::Player,
            body: Body::new(position, rotation, SHIP_RADIUS),
            energy: SHIP_MAX_ENERGY,
            max_energy: SHIP_MAX_ENERGY,
            energy_regen: SHIP_ENERGY_REGEN,
            alive: true,
            ticks_until_can_fire: 0,
            fire_interval: TICKS_BETWEEN_FIRE,
            max_turn_rate: PLAYER_MAX_TURN_RATE,
            intent: ShipIntent::default(),
            was_hit: false,
        }
    }

    /// Fresh cannon tuned for `params`.
    pub fn cannon(position: FixedVec2, rotation: i32, params: &LevelParams) -> Self {
        Self {
            kind: ShipKind::Cannon,
            body: Body::new(position, rotation, CANNON_RADIUS),
            energy: CANNON_MAX_ENERGY,
            max_energy: CANNON_MAX_ENERGY,
            energy_regen: CANNON_ENERGY_REGEN,
            alive: true,
            ticks_until_can_fire: 0,
            fire_interval: params.cannon_fire_interval,
            max_turn_rate: params.cannon_turn_rate,
            intent: ShipIntent::default(),
            was_hit: false,
        }
    }

    /// Hash ship state.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u8(self.kind as u8);
        hash_body(hasher, &self.body);
        hasher.update_i32(self.energy);
        hasher.update_bool(self.alive);
        hasher.update_u32(self.ticks_until_can_fire);
        hasher.update_bool(self.intent.thrusting);
        hasher.update_bool(self.intent.reversing);
        hasher.update_bool(self.intent.firing);
    }
}

// =============================================================================
// MISSILES
// =============================================================================

/// A missile slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Missile {
    /// Kinematic state
    pub body: Body,
    /// Ticks left; the slot is free at zero or below
    pub lifetime: i32,
    /// Hit something and is fading out
    pub exploded: bool,
    /// Ship that fired it
    pub owner: ShipKind,
}

impl Missile {
    /// Missile in flight.
    pub fn launch(owner: ShipKind, position: FixedVec2, velocity: FixedVec2, rotation: i32) -> Self {
        let mut body = Body::new(position, rotation, MISSILE_RADIUS);
        body.velocity = velocity;
        Self {
            body,
            lifetime: MISSILE_TICKS_TO_LIVE,
            exploded: false,
            owner,
        }
    }

    /// Switch to the explosion fade-out.
    pub fn explode(&mut self) {
        self.exploded = true;
        self.lifetime = MISSILE_EXPLOSION_TICKS_TO_LIVE;
        self.body.velocity = FixedVec2::ZERO;
    }
}

impl PoolSlot for Missile {
    #[inline]
    fn is_active(&self) -> bool {
        self.lifetime > 0
    }
}

/// The missile arena.
pub type MissilePool = SlotPool<Missile, MAX_MISSILES>;

// =============================================================================
// RINGS
// =============================================================================

/// Outcome of a missile striking a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentHit {
    /// Segment already gone; nothing happened.
    AlreadyDestroyed,
    /// Segment lost a point and still stands.
    Damaged {
        /// Energy left in the segment.
        energy_left: u32,
    },
    /// Segment lost its last point. `ring_destroyed` is set when it was the
    /// ring's last live segment.
    Destroyed {
        /// The whole ring is down.
        ring_destroyed: bool,
    },
}

/// A rotating shield ring around the cannon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ring {
    /// Centre, outer radius, rotation and spin
    pub body: Body,
    segments: [u32; SEGMENTS_PER_RING],
    live_segments: u8,
    full_energy: u32,
    /// Hit this tick (cleared at the start of every tick)
    pub was_hit: bool,
}

impl Ring {
    /// Outer radius of ring `index`, innermost first.
    #[inline]
    pub const fn radius_for(index: usize) -> Fixed {
        SHIELD_INNER_RADIUS + index as Fixed * SHIELD_RING_SPACING
    }

    /// Spin direction of ring `index`: the innermost turns counter-clockwise
    /// and each further ring alternates.
    #[inline]
    pub const fn spin_sign(index: usize) -> i32 {
        if index % 2 == 0 {
            -1
        } else {
            1
        }
    }

    /// Dead ring with no segments.
    pub fn inactive(index: usize, center: FixedVec2) -> Self {
        Self {
            body: Body::new(center, 0, Self::radius_for(index)),
            segments: [0; SEGMENTS_PER_RING],
            live_segments: 0,
            full_energy: 0,
            was_hit: false,
        }
    }

    /// Ring `index` with every segment at `energy`.
    pub fn new(index: usize, center: FixedVec2, energy: u32, spin: i32) -> Self {
        let mut ring = Self::inactive(index, center);
        ring.rebuild(energy, spin * Self::spin_sign(index));
        ring
    }

    /// Restore every segment to `energy` in place and set the spin.
    pub fn rebuild(&mut self, energy: u32, rotation_speed: i32) {
        self.segments = [energy; SEGMENTS_PER_RING];
        self.live_segments = if energy > 0 { SEGMENTS_PER_RING as u8 } else { 0 };
        self.full_energy = energy;
        self.body.rotation = 0;
        self.body.rotation_speed = rotation_speed;
        self.body.rotation_accel = 0;
        self.body.velocity = FixedVec2::ZERO;
        self.was_hit = false;
    }

    /// At least one segment stands.
    #[inline]
    pub fn alive(&self) -> bool {
        self.live_segments > 0
    }

    /// Number of segments with energy left.
    #[inline]
    pub fn live_segments(&self) -> usize {
        self.live_segments as usize
    }

    /// Per-segment energies.
    #[inline]
    pub fn segments(&self) -> &[u32; SEGMENTS_PER_RING] {
        &self.segments
    }

    /// Energy of one segment.
    #[inline]
    pub fn segment_energy(&self, segment: usize) -> u32 {
        self.segments[segment]
    }

    /// Energy every segment started the level with.
    #[inline]
    pub fn full_energy(&self) -> u32 {
        self.full_energy
    }

    /// No segment has been shot away. Chipped segments still count.
    pub fn is_undamaged(&self) -> bool {
        self.segments.iter().all(|&e| e > 0)
    }

    /// Remove one point from `segment`.
    pub fn hit_segment(&mut self, segment: usize) -> SegmentHit {
        let energy = &mut self.segments[segment];
        if *energy == 0 {
            return SegmentHit::AlreadyDestroyed;
        }

        *energy -= 1;
        self.was_hit = true;
        if *energy > 0 {
            return SegmentHit::Damaged { energy_left: *energy };
        }

        self.live_segments -= 1;
        SegmentHit::Destroyed {
            ring_destroyed: self.live_segments == 0,
        }
    }

    /// Advance rotation by one tick of spin.
    #[inline]
    pub fn spin(&mut self) {
        self.body.integrate_rotation(0);
    }

    /// Hash ring state.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_i32(self.body.rotation);
        hasher.update_i32(self.body.rotation_speed);
        for &energy in &self.segments {
            hasher.update_u32(energy);
        }
        hasher.update_u8(self.live_segments);
    }
}

// =============================================================================
// STARS
// =============================================================================

/// Background star. Decoration only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Star {
    /// Position on whole pixels
    pub position: FixedVec2,
    /// Heading index
    pub rotation: i32,
    /// Size multiplier (x1024), 0.5 to 1.5
    pub scale: Fixed,
}

// =============================================================================
// PHASE / MESSAGES
// =============================================================================

/// Progression phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Phase {
    /// Simulation running
    #[default]
    Playing = 0,
    /// Cannon destroyed, next level set up, waiting
    LevelCleared = 1,
    /// Player destroyed, lives left, waiting
    LifeLost = 2,
    /// No lives left; only a restart leaves this
    GameOver = 3,
}

/// What the on-screen message says.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageKind {
    /// "Next level"
    LevelCleared = 0,
    /// "Try again"
    LifeLost = 1,
    /// "Game over"
    GameOver = 2,
}

impl MessageKind {
    /// Headline text.
    pub fn text(self) -> &'static str {
        match self {
            MessageKind::LevelCleared => "LEVEL CLEARED",
            MessageKind::LifeLost => "SHIP DESTROYED",
            MessageKind::GameOver => "GAME OVER",
        }
    }

    /// Second line.
    pub fn prompt(self) -> &'static str {
        match self {
            MessageKind::GameOver => "Press [ENTER] to restart",
            _ => "Press [ENTER] to continue",
        }
    }
}

/// Message shown while play is suspended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Which message
    pub kind: MessageKind,
    /// Ticks before play resumes by itself. Ignored for game over.
    pub ticks_remaining: u32,
}

// =============================================================================
// WORLD
// =============================================================================

/// Complete simulation state.
#[derive(Clone, Debug)]
pub struct World {
    /// Configuration the world was built with
    pub config: WorldConfig,
    /// World extent
    pub bounds: WorldBounds,
    /// Trig lookup
    pub table: AngleTable,
    /// Ticks advanced since creation
    pub tick: u64,
    /// Spawn headings and stars
    pub rng: DeterministicRng,
    /// Current difficulty
    pub params: LevelParams,
    /// Human ship
    pub player: Ship,
    /// Adversary ship
    pub cannon: Ship,
    /// Missile arena
    pub missiles: MissilePool,
    /// Ring storage; only the first `params.ring_count` are in play
    pub rings: [Ring; MAX_RINGS],
    /// Background
    pub stars: [Star; NUMBER_OF_STARS],
    /// Current level (0-based)
    pub level: u32,
    /// Lives left
    pub lives: i32,
    /// Player score
    pub score: u32,
    /// Progression phase
    pub phase: Phase,
    /// Message on screen, if any
    pub message: Option<Message>,
    /// Input waiting for the next tick
    pub input: InputFrame,
    /// Events produced by the last tick
    pub events: Vec<GameEvent>,
}

impl World {
    /// Build a world at level 0 from a validated config.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let bounds = WorldBounds {
            width: config.width(),
            height: config.height(),
        };
        let center = bounds.center();
        let params = LevelParams::for_level(0, config.max_rings);

        let mut world = Self {
            bounds,
            table: AngleTable::new(),
            tick: 0,
            rng: DeterministicRng::new(config.rng_seed),
            params,
            player: Ship::player(center, 0),
            cannon: Ship::cannon(center, 0, &params),
            missiles: MissilePool::new(),
            rings: std::array::from_fn(|i| Ring::inactive(i, center)),
            stars: [Star::default(); NUMBER_OF_STARS],
            level: 0,
            lives: config.initial_lives,
            score: 0,
            phase: Phase::Playing,
            message: None,
            input: InputFrame::new(),
            events: Vec::with_capacity(EVENT_BUFFER_CAPACITY),
            config,
        };
        world.restart();
        Ok(world)
    }

    /// Queue an input event for the next tick.
    #[inline]
    pub fn apply_input(&mut self, event: InputEvent) {
        self.input.apply(event);
    }

    /// Rings in play this level, innermost first (alive or not).
    #[inline]
    pub fn active_rings(&self) -> &[Ring] {
        &self.rings[..self.params.ring_count]
    }

    /// Ship by kind.
    #[inline]
    pub fn ship(&self, kind: ShipKind) -> &Ship {
        match kind {
            ShipKind::Player => &self.player,
            ShipKind::Cannon => &self.cannon,
        }
    }

    /// Mutable ship by kind.
    #[inline]
    pub fn ship_mut(&mut self, kind: ShipKind) -> &mut Ship {
        match kind {
            ShipKind::Player => &mut self.player,
            ShipKind::Cannon => &mut self.cannon,
        }
    }

    /// Where the player spawns: centred horizontally, a quarter of the way down.
    #[inline]
    pub fn player_spawn(&self) -> FixedVec2 {
        FixedVec2::new(self.bounds.width / 2, self.bounds.height / 4)
    }

    /// Record an event for this tick.
    #[inline]
    pub fn push_event(&mut self, data: GameEventData) {
        self.events.push(GameEvent::new(self.tick, data));
    }

    /// Add points to the score.
    pub fn award(&mut self, points: u32) {
        if points == 0 {
            return;
        }
        self.score = self.score.saturating_add(points);
        self.push_event(GameEventData::ScoreAwarded {
            points,
            total: self.score,
        });
    }

    /// Re-spawn both ships and empty the missile pool. Rings keep their damage.
    pub fn reset_ships(&mut self) {
        let center = self.bounds.center();
        let cannon_rotation = self.rng.next_rotation();
        let player_rotation = self.rng.next_rotation();

        self.cannon = Ship::cannon(center, cannon_rotation, &self.params);
        self.player = Ship::player(self.player_spawn(), player_rotation);
        self.missiles.clear();
    }

    /// Rebuild the rings for the current level; rings beyond the count go dark.
    pub fn rebuild_rings(&mut self) {
        let center = self.bounds.center();
        let count = self.params.ring_count;
        for (i, ring) in self.rings.iter_mut().enumerate() {
            *ring = Ring::inactive(i, center);
            if i < count {
                ring.rebuild(self.params.segment_energy, self.params.ring_spin * Ring::spin_sign(i));
            }
        }
    }

    /// Scatter the background stars.
    pub fn scatter_stars(&mut self) {
        let width_px = to_pixels(self.bounds.width) as u32;
        let height_px = to_pixels(self.bounds.height) as u32;
        for star in self.stars.iter_mut() {
            let x = self.rng.next_int(width_px) as i32;
            let y = self.rng.next_int(height_px) as i32;
            star.position = FixedVec2::from_pixels(x, y);
            star.rotation = self.rng.next_rotation();
            star.scale = FIXED_SCALE / 2 + self.rng.next_int(FIXED_SCALE as u32) as Fixed;
        }
    }

    /// Set up `level` from scratch: parameters, ships, missiles, rings, stars.
    pub fn enter_level(&mut self, level: u32) {
        self.level = level;
        self.params = LevelParams::for_level(level, self.config.max_rings);
        self.reset_ships();
        self.rebuild_rings();
        self.scatter_stars();
    }

    /// Full restart: level 0, configured lives, zero score, playing.
    pub fn restart(&mut self) {
        self.lives = self.config.initial_lives;
        self.score = 0;
        self.phase = Phase::Playing;
        self.message = None;
        self.enter_level(0);
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.config.rng_seed, |hasher| {
            self.player.hash_into(hasher);
            self.cannon.hash_into(hasher);

            hasher.update_u32(self.missiles.next_index() as u32);
            for (slot, missile) in self.missiles.iter_active() {
                hasher.update_u32(slot as u32);
                hash_body(hasher, &missile.body);
                hasher.update_i32(missile.lifetime);
                hasher.update_bool(missile.exploded);
                hasher.update_u8(missile.owner as u8);
            }

            for ring in self.active_rings() {
                ring.hash_into(hasher);
            }

            hasher.update_u32(self.level);
            hasher.update_i32(self.lives);
            hasher.update_u32(self.score);
            hasher.update_u8(self.phase as u8);
            if let Some(message) = self.message {
                hasher.update_u8(message.kind as u8);
                hasher.update_u32(message.ticks_remaining);
            }
        })
    }
}

fn hash_body(hasher: &mut StateHasher, body: &Body) {
    hasher.update_vec2(body.position);
    hasher.update_vec2(body.velocity);
    hasher.update_i32(body.rotation);
    hasher.update_i32(body.rotation_speed);
    hasher.update_i32(body.rotation_accel);
}

// =============================================================================
// TESTS
// =============================================================================
