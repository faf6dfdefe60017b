//! Space Castle headless driver
//!
//! Plays a scripted game against the cannon, then replays the recorded
//! input and checks that the final state hash matches.
//!
//! Usage: `space-castle [config.json] [scores.txt]`

use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use space_castle::{
    core::fixed::angle_difference,
    game::{config::WorldConfig, events::GameEventData},
    replay, FileScoreStore, InputEvent, MemoryScoreStore, Phase, ScoreRecorder, Session,
    MILLIS_PER_TICK, TICK_RATE, VERSION,
};

/// Five minutes of play.
const DEMO_TICKS: u64 = TICK_RATE as u64 * 60 * 5;

/// Ticks between status lines.
const REPORT_INTERVAL: u64 = TICK_RATE as u64 * 20;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Space Castle v{}", VERSION);
    info!("Tick Rate: {} Hz ({} ms per tick)", TICK_RATE, MILLIS_PER_TICK);

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => WorldConfig::from_json_file(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => WorldConfig::default(),
    };
    let recorder = open_recorder(args.next().map(PathBuf::from));

    demo_game(config, recorder)
}

/// File-backed store if a path was given. An unreadable file is reported
/// and play goes ahead with an empty table.
fn open_recorder(path: Option<PathBuf>) -> Box<dyn ScoreRecorder> {
    let Some(path) = path else {
        return Box::new(MemoryScoreStore::with_initials("CPU"));
    };

    let mut store = FileScoreStore::new(path, "CPU");
    match store.load() {
        Ok(count) => info!(path = %store.path().display(), count, "high scores loaded"),
        Err(e) => warn!(path = %store.path().display(), error = %e, "high scores unavailable"),
    }
    if let Some(best) = store.table().best() {
        info!("Best so far: {} by {} (level {})", best.amount, best.initials, best.level);
    }
    Box::new(store)
}

/// Play, report, then verify the replay.
fn demo_game(config: WorldConfig, recorder: Box<dyn ScoreRecorder>) -> anyhow::Result<()> {
    info!("=== Starting Demo Game ===");
    info!("RNG Seed: {}", config.rng_seed);

    let mut session = Session::new(config.clone(), recorder)?;
    let mut total_events = 0;

    for t in 0..DEMO_TICKS {
        steer(&mut session, t);

        let events = session.advance();
        total_events += events.len();

        for event in events.iter().filter(|e| e.is_progression()) {
            match event.data {
                GameEventData::LevelCleared { level, bonus } => {
                    info!("Tick {}: level cleared, now on level {} (+{})", event.tick, level, bonus);
                }
                GameEventData::LifeLost { lives_left } => {
                    info!("Tick {}: ship lost, {} lives left", event.tick, lives_left);
                }
                GameEventData::GameOver { score, level } => {
                    info!("Tick {}: game over with {} points on level {}", event.tick, score, level);
                }
                _ => {}
            }
        }

        if t % REPORT_INTERVAL == 0 {
            let hud = session.snapshot().hud();
            info!("Status: {}", serde_json::to_string(&hud)?);
        }

        if session.world().phase == Phase::GameOver {
            break;
        }
    }

    if let Some(error) = session.last_persistence_error() {
        warn!("Score was not saved: {}", error);
    }

    info!("=== Game Results ===");
    let (world, recording) = session.finish();
    let hash = world.compute_hash();
    info!("Ticks: {}, level: {}, score: {}", world.tick, world.level, world.score);
    info!("Total events: {}, input changes: {}", total_events, recording.delta_count());
    info!("Final State Hash: {}", hex::encode(hash));

    info!("=== Verifying Determinism ===");
    let replayed = replay(config, &recording)?;
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash != replay_hash {
        bail!("determinism failure: replay hash differs");
    }
    info!("DETERMINISM VERIFIED: Hashes match!");
    Ok(())
}

/// Scripted pilot: turn toward the cannon, fire when lined up, thrust in
/// short bursts, acknowledge messages after a pause.
fn steer(session: &mut Session, t: u64) {
    let world = session.world();
    if world.phase != Phase::Playing {
        if t % 50 == 0 {
            session.apply_input(InputEvent::Confirm);
        }
        return;
    }

    let player = &world.player;
    let bearing = world
        .table
        .bearing_between(player.body.position, world.cannon.body.position);
    let diff = angle_difference(player.body.rotation, bearing);

    let inputs = [
        InputEvent::TurnLeft(diff < -2),
        InputEvent::TurnRight(diff > 2),
        InputEvent::Fire(diff.abs() <= 4),
        InputEvent::Thrust(t % 80 < 6),
        InputEvent::Reverse(t % 80 == 40),
    ];
    for input in inputs {
        session.apply_input(input);
    }
}
