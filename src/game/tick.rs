//! Authoritative Simulation Tick
//!
//! One call to [`advance`] moves the world forward by exactly one frame.
//! The order of the steps is part of the game's behaviour and must never
//! change, or recorded games stop replaying to the same state.

use tracing::{info, trace, warn};

use crate::core::fixed::{GRAVITY_DIVISOR, SHIP_MAX_VELOCITY, TURN_IMPULSE};
use crate::game::cannon::operate_cannon;
use crate::game::combat::{bounce_off_shield, check_missile_collisions, fire_if_ready, update_energy};
use crate::game::config::{ConfigError, WorldConfig};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::input::{InputEvent, InputFrame, InputRecording};
use crate::game::pool::PoolSlot;
use crate::game::progression::{clear_hit_flags, evaluate_progression, restart, update_suspended};
use crate::game::snapshot::Snapshot;
use crate::game::state::{MissilePool, Phase, ShipIntent, ShipKind, World};
use crate::scores::ScoreRecorder;

/// Order the ships are integrated in.
const SHIP_UPDATE_ORDER: [ShipKind; 2] = [ShipKind::Cannon, ShipKind::Player];

/// Run one tick using the input queued on the world.
pub fn advance(world: &mut World) {
    let frame = world.input.consume();
    step(world, frame);
}

/// Run one tick with an explicit input frame.
///
/// # Determinism
///
/// Given the same world and frame the result is bit-identical:
/// - Integer arithmetic only (the angle table is built once up front)
/// - Fixed iteration order over ships, rings and missile slots
/// - Randomness only from the world's seeded RNG
pub fn step(world: &mut World, frame: InputFrame) {
    world.tick += 1;
    world.events.clear();

    if frame.reset() {
        restart(world);
        return;
    }

    if world.phase != Phase::Playing {
        update_suspended(world, frame.confirm());
        return;
    }

    // 1. Clear transient hit flags
    clear_hit_flags(world);

    // 2. Player intent
    apply_player_intent(world, frame);

    // 3. Cannon decision
    let decision = operate_cannon(world);
    trace!(tick = world.tick, ?decision, "cannon");

    // 4. Ship physics and weapons
    apply_gravity(world);
    for kind in SHIP_UPDATE_ORDER {
        drive_ship(world, kind);
    }

    // 5. Player against the shield
    bounce_off_shield(world);

    // 6. Missiles
    update_missiles(world);

    // 7. Shield rotation
    spin_rings(world);

    // 8. Energy
    update_energy(world);

    // 9. Progression
    evaluate_progression(world);

    #[cfg(feature = "debug-tracing")]
    trace!(
        tick = world.tick,
        missiles = world.missiles.active_count(),
        hash = %hex::encode(world.compute_hash()),
        "tick complete"
    );
}

/// Copy the frame into the player's intent and set up turning.
///
/// Held turn keys and the analog impulse both feed the rotation impulse.
/// With neither present the ship stops turning at once.
fn apply_player_intent(world: &mut World, frame: InputFrame) {
    let player = &mut world.player;
    player.intent = ShipIntent {
        thrusting: frame.thrusting(),
        reversing: frame.reversing(),
        firing: frame.firing(),
    };

    let accel = frame.turn_direction() * TURN_IMPULSE + i32::from(frame.turn_impulse);
    if accel == 0 {
        player.body.rotation_speed = 0;
    } else {
        player.body.rotation_accel = accel;
    }
}

/// Pull the living player toward the cannon on gravity levels.
fn apply_gravity(world: &mut World) {
    let gravity = world.params.gravity;
    if gravity == 0 || !world.player.alive || !world.cannon.alive {
        return;
    }

    let bearing = world
        .table
        .bearing_between(world.player.body.position, world.cannon.body.position);
    let pull = world
        .table
        .direction(bearing)
        .scale_ratio(i64::from(gravity), i64::from(GRAVITY_DIVISOR));
    world.player.body.velocity = world.player.body.velocity.add(pull);
}

/// Turn, thrust, move and fire one ship. Dead ships stay where they are.
fn drive_ship(world: &mut World, kind: ShipKind) {
    let bounds = world.bounds;
    let table = &world.table;
    let ship = match kind {
        ShipKind::Player => &mut world.player,
        ShipKind::Cannon => &mut world.cannon,
    };
    if !ship.alive {
        return;
    }

    ship.body.integrate_rotation(ship.max_turn_rate);
    if ship.intent.thrusting {
        ship.body.apply_thrust(table, 1);
    }
    if ship.intent.reversing {
        ship.body.apply_thrust(table, -1);
    }
    ship.body.clamp_velocity(SHIP_MAX_VELOCITY);
    ship.body.integrate_position(&bounds);

    fire_if_ready(world, kind);
}

/// Move every active missile, resolve its contacts and age it.
fn update_missiles(world: &mut World) {
    let bounds = world.bounds;
    for slot in 0..MissilePool::CAPACITY {
        match world.missiles.get_mut(slot) {
            Some(missile) if missile.is_active() => missile.body.step(&bounds, 0),
            _ => continue,
        }

        check_missile_collisions(world, slot);

        if let Some(missile) = world.missiles.get_mut(slot) {
            missile.lifetime -= 1;
        }
    }
}

fn spin_rings(world: &mut World) {
    let count = world.params.ring_count;
    for ring in world.rings[..count].iter_mut().filter(|r| r.alive()) {
        ring.spin();
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// A game in progress: the world, its input history and the score store.
///
/// The score store is only touched between ticks, on the tick a game ends.
/// A failing store is logged and remembered; play carries on.
pub struct Session {
    world: World,
    recorder: Box<dyn ScoreRecorder>,
    recording: InputRecording,
    last_persistence_error: Option<String>,
}

impl Session {
    /// Start a game at level 0.
    pub fn new(config: WorldConfig, recorder: Box<dyn ScoreRecorder>) -> Result<Self, ConfigError> {
        Ok(Self {
            world: World::new(config)?,
            recorder,
            recording: InputRecording::new(),
            last_persistence_error: None,
        })
    }

    /// Queue an input event for the next tick.
    #[inline]
    pub fn apply_input(&mut self, event: InputEvent) {
        self.world.apply_input(event);
    }

    /// Run one tick and return the events it produced.
    pub fn advance(&mut self) -> &[GameEvent] {
        let frame = self.world.input.consume();
        self.recording.record(self.world.tick, frame);
        step(&mut self.world, frame);

        let finished = self.world.events.iter().find_map(|e| match e.data {
            GameEventData::GameOver { score, level } => Some((score, level)),
            _ => None,
        });
        if let Some((score, level)) = finished {
            self.record_score(score, level);
        }

        &self.world.events
    }

    fn record_score(&mut self, score: u32, level: u32) {
        match self.recorder.record(score, level) {
            Ok(rank) => {
                info!(score, level, rank, "score recorded");
                self.last_persistence_error = None;
            }
            Err(e) => {
                warn!(score, level, error = %e, "failed to record score");
                self.last_persistence_error = Some(e.to_string());
            }
        }
    }

    /// Current world, read-only.
    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only view for rendering.
    #[inline]
    pub fn snapshot(&self) -> Snapshot<'_> {
        self.world.snapshot()
    }

    /// Inputs consumed so far.
    #[inline]
    pub fn recording(&self) -> &InputRecording {
        &self.recording
    }

    /// Message of the last failed score write, cleared by the next success.
    #[inline]
    pub fn last_persistence_error(&self) -> Option<&str> {
        self.last_persistence_error.as_deref()
    }

    /// Stop the game and hand back the world and its input history.
    pub fn finish(self) -> (World, InputRecording) {
        (self.world, self.recording)
    }
}

/// Replay a recorded game from a fresh world.
///
/// The same config and recording always produce the same final state hash.
pub fn replay(config: WorldConfig, recording: &InputRecording) -> Result<World, ConfigError> {
    let mut world = World::new(config)?;
    for (_, frame) in recording.replay_iter() {
        step(&mut world, frame);
    }
    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use proptest::prelude::*;

    use crate::core::fixed::{ROTATION_STEPS, SEGMENTS_PER_RING, SHIP_MAX_ENERGY};
    use crate::scores::{MemoryScoreStore, ScoreError};

    fn world() -> World {
        World::new(WorldConfig::default()).unwrap()
    }

    /// Deterministic pseudo-random script of held keys and presses.
    fn scripted_frame(t: u64) -> InputFrame {
        let mut frame = InputFrame::new();
        frame.set(InputFrame::FLAG_THRUST, t % 40 < 12);
        frame.set(InputFrame::FLAG_TURN_LEFT, t % 50 < 10);
        frame.set(InputFrame::FLAG_TURN_RIGHT, (t / 7) % 9 == 3);
        frame.set(InputFrame::FLAG_FIRE, t % 3 == 0);
        frame.set(InputFrame::FLAG_CONFIRM, t % 97 == 0);
        frame
    }

    #[derive(Clone, Default)]
    struct CapturingRecorder(Rc<RefCell<Vec<(u32, u32)>>>);

    impl ScoreRecorder for CapturingRecorder {
        fn record(&mut self, amount: u32, level: u32) -> Result<usize, ScoreError> {
            self.0.borrow_mut().push((amount, level));
            Ok(1)
        }
    }

    struct FailingRecorder;

    impl ScoreRecorder for FailingRecorder {
        fn record(&mut self, _amount: u32, _level: u32) -> Result<usize, ScoreError> {
            Err(ScoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    #[test]
    fn test_fire_on_first_tick() {
        let mut w = world();
        w.apply_input(InputEvent::Fire(true));
        advance(&mut w);

        assert_eq!(w.tick, 1);
        assert!(w
            .events
            .iter()
            .any(|e| matches!(e.data, GameEventData::MissileFired { owner: ShipKind::Player, .. })));
        // Shot cost, then one tick of regen
        assert_eq!(w.player.energy, SHIP_MAX_ENERGY - 10 + 1);
    }

    #[test]
    fn test_turn_keys_drive_rotation() {
        let mut w = world();
        let start = w.player.body.rotation;

        w.apply_input(InputEvent::TurnRight(true));
        advance(&mut w);
        assert_eq!(w.player.body.rotation, (start + 2) % ROTATION_STEPS);
        advance(&mut w);
        assert_eq!(w.player.body.rotation, (start + 6) % ROTATION_STEPS);

        w.apply_input(InputEvent::TurnRight(false));
        advance(&mut w);
        assert_eq!(w.player.body.rotation, (start + 6) % ROTATION_STEPS);
        assert_eq!(w.player.body.rotation_speed, 0);
    }

    #[test]
    fn test_gravity_pulls_toward_cannon() {
        let mut w = world();
        w.enter_level(1);
        assert_eq!(w.params.gravity, 1);

        advance(&mut w);
        // Player spawns due north of the cannon
        assert_eq!(w.player.body.velocity.x, 0);
        assert!(w.player.body.velocity.y > 0);
    }

    #[test]
    fn test_suspended_world_is_frozen() {
        let mut w = world();
        w.player.alive = false;
        advance(&mut w);
        assert_eq!(w.phase, Phase::LifeLost);

        let player = w.player;
        let cannon = w.cannon;
        advance(&mut w);
        assert_eq!(w.tick, 2);
        assert_eq!(w.player, player);
        assert_eq!(w.cannon, cannon);

        w.apply_input(InputEvent::Confirm);
        advance(&mut w);
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn test_reset_input_restarts() {
        let mut w = world();
        w.enter_level(3);
        w.score = 700;

        w.apply_input(InputEvent::ResetToLevelZero);
        advance(&mut w);

        assert_eq!(w.level, 0);
        assert_eq!(w.score, 0);
        assert!(w.events.iter().any(|e| e.data == GameEventData::Restarted));
        // One-shot: the next tick plays normally
        advance(&mut w);
        assert!(!w.events.iter().any(|e| e.data == GameEventData::Restarted));
    }

    #[test]
    fn test_advance_determinism() {
        let mut a = world();
        let mut b = world();
        for t in 0..600 {
            step(&mut a, scripted_frame(t));
            step(&mut b, scripted_frame(t));
        }
        assert_eq!(a.tick, 600);
        assert_eq!(a.compute_hash(), b.compute_hash());
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn test_replay_matches_session() {
        let config = WorldConfig::default();
        let mut session = Session::new(config.clone(), Box::new(MemoryScoreStore::new())).unwrap();

        for t in 0..400u64 {
            if t % 30 == 0 {
                session.apply_input(InputEvent::Thrust(t % 60 == 0));
            }
            if t % 25 == 0 {
                session.apply_input(InputEvent::Fire(t % 50 == 0));
            }
            if t % 45 == 0 {
                session.apply_input(InputEvent::TurnImpulse(6));
            }
            session.advance();
        }

        let replayed = replay(config, session.recording()).unwrap();
        assert_eq!(replayed.tick, 400);
        assert_eq!(replayed.compute_hash(), session.world().compute_hash());
    }

    #[test]
    fn test_session_records_game_over() {
        let captured = CapturingRecorder::default();
        let mut session = Session::new(WorldConfig::default(), Box::new(captured.clone())).unwrap();
        session.world.lives = 1;
        session.world.score = 500;
        session.world.player.alive = false;

        let events = session.advance();
        assert!(events
            .iter()
            .any(|e| e.data == GameEventData::LifeLost { lives_left: 0 }));
        assert!(captured.0.borrow().is_empty());

        // Resume, then the next playing tick ends the game
        session.apply_input(InputEvent::Confirm);
        session.advance();
        assert_eq!(session.world().phase, Phase::Playing);

        let events = session.advance();
        assert!(events
            .iter()
            .any(|e| matches!(e.data, GameEventData::GameOver { score: 500, .. })));
        assert_eq!(*captured.0.borrow(), vec![(500, 0)]);

        // Waiting on the message does not record again
        session.advance();
        assert_eq!(captured.0.borrow().len(), 1);
    }

    #[test]
    fn test_persistence_failure_does_not_stop_play() {
        let mut session = Session::new(WorldConfig::default(), Box::new(FailingRecorder)).unwrap();
        session.world.lives = 0;

        session.advance();
        assert_eq!(session.world().phase, Phase::GameOver);
        assert!(session.last_persistence_error().is_some());

        session.apply_input(InputEvent::Confirm);
        session.advance();
        assert_eq!(session.world().phase, Phase::Playing);
        assert_eq!(session.world().lives, 3);
    }

    #[test]
    fn test_replay_of_empty_recording() {
        let recording = InputRecording::new();
        let w = replay(WorldConfig::default(), &recording).unwrap();
        assert_eq!(w.tick, 0);
        assert_eq!(w.compute_hash(), world().compute_hash());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_tick_invariants(script in proptest::collection::vec(any::<u8>(), 1..250)) {
            let mut w = world();

            for bits in script {
                let rings_before: Vec<[u32; SEGMENTS_PER_RING]> =
                    w.rings.iter().map(|r| *r.segments()).collect();
                let level_before = w.level;

                step(&mut w, InputFrame { flags: bits & 0x3F, turn_impulse: 0 });

                for ship in [&w.player, &w.cannon] {
                    prop_assert!(w.bounds.contains(ship.body.position));
                    prop_assert!((0..ROTATION_STEPS).contains(&ship.body.rotation));
                    prop_assert!(ship.energy >= 0 && ship.energy <= ship.max_energy);
                }
                for (_, m) in w.missiles.iter_active() {
                    prop_assert!(w.bounds.contains(m.body.position));
                    if m.exploded {
                        prop_assert_eq!(m.body.velocity, crate::core::vec2::FixedVec2::ZERO);
                    }
                }
                for ring in &w.rings {
                    prop_assert!((0..ROTATION_STEPS).contains(&ring.body.rotation));
                    prop_assert_eq!(ring.alive(), ring.segments().iter().any(|&e| e > 0));
                }

                let rebuilt = w.level != level_before
                    || w.events.iter().any(|e| e.data == GameEventData::Restarted);
                if !rebuilt {
                    for (ring, before) in w.rings.iter().zip(&rings_before) {
                        for (now, was) in ring.segments().iter().zip(before) {
                            prop_assert!(now <= was);
                        }
                    }
                }
            }
        }
    }
}
