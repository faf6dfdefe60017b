//! Progression State Machine
//!
//! ```text
//!            cannon dead                      confirm / countdown
//!  PLAYING ───────────────▶ LEVEL_CLEARED ─────────────────────▶ PLAYING
//!     │      player dead,                     confirm / countdown
//!     ├─────────────────────▶ LIFE_LOST ───────────────────────▶ PLAYING
//!     │      lose a life
//!     │      no lives left                       confirm (full restart)
//!     └─────────────────────▶ GAME_OVER ───────────────────────▶ PLAYING
//! ```
//!
//! Entities are reset the moment a transition fires, so the message is shown
//! over the fresh layout while the simulation stays frozen.

use tracing::info;

use crate::game::events::GameEventData;
use crate::game::state::{Message, MessageKind, Phase, World};

/// Check for a phase transition after a simulated tick.
///
/// Only runs while playing with no message up. Priority: cannon destroyed,
/// then no lives, then player destroyed. Losing the last ship still shows
/// the retry message; the game ends on the first playing tick after it.
/// Returns the new phase if one was entered.
pub fn evaluate_progression(world: &mut World) -> Option<Phase> {
    if world.phase != Phase::Playing || world.message.is_some() {
        return None;
    }

    if !world.cannon.alive {
        clear_level(world);
    } else if world.lives <= 0 {
        game_over(world);
    } else if !world.player.alive {
        lose_life(world);
    } else {
        return None;
    }

    clear_hit_flags(world);
    Some(world.phase)
}

/// Tick the message while play is suspended. `confirm` is the player's
/// acknowledgement for this tick.
pub fn update_suspended(world: &mut World, confirm: bool) {
    match world.phase {
        Phase::Playing => {}
        Phase::GameOver => {
            if confirm {
                restart(world);
            }
        }
        Phase::LevelCleared | Phase::LifeLost => {
            let Some(message) = world.message.as_mut() else {
                world.phase = Phase::Playing;
                return;
            };
            message.ticks_remaining = message.ticks_remaining.saturating_sub(1);
            if confirm || message.ticks_remaining == 0 {
                let after = message.kind;
                world.message = None;
                world.phase = Phase::Playing;
                info!(?after, level = world.level, "play resumed");
                world.push_event(GameEventData::Resumed { after });
            }
        }
    }
}

/// Start over from level zero, whatever the current phase.
pub fn restart(world: &mut World) {
    world.restart();
    clear_hit_flags(world);
    info!("game restarted");
    world.push_event(GameEventData::Restarted);
}

fn clear_level(world: &mut World) {
    let cleared = world.level;
    let bonus = world.config.scoring.level_clear_bonus;
    world.award(bonus);

    world.enter_level(cleared + 1);
    show_message(world, Phase::LevelCleared, MessageKind::LevelCleared);

    info!(cleared, next = world.level, bonus, score = world.score, "level cleared");
    world.push_event(GameEventData::LevelCleared {
        level: world.level,
        bonus,
    });
}

fn lose_life(world: &mut World) {
    world.lives -= 1;
    world.reset_ships();
    show_message(world, Phase::LifeLost, MessageKind::LifeLost);

    info!(lives = world.lives, level = world.level, "life lost");
    world.push_event(GameEventData::LifeLost {
        lives_left: world.lives,
    });
}

fn game_over(world: &mut World) {
    world.lives = 0;
    show_message(world, Phase::GameOver, MessageKind::GameOver);

    info!(score = world.score, level = world.level, "game over");
    world.push_event(GameEventData::GameOver {
        score: world.score,
        level: world.level,
    });
}

fn show_message(world: &mut World, phase: Phase, kind: MessageKind) {
    world.phase = phase;
    world.message = Some(Message {
        kind,
        ticks_remaining: world.config.message_ticks,
    });
}

/// Clear the per-tick hit indicators on both ships and every ring.
pub fn clear_hit_flags(world: &mut World) {
    world.player.was_hit = false;
    world.cannon.was_hit = false;
    for ring in world.rings.iter_mut() {
        ring.was_hit = false;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::WorldConfig;
    use crate::game::state::LevelParams;

    fn world() -> World {
        World::new(WorldConfig::default()).unwrap()
    }

    #[test]
    fn test_nothing_happens_while_both_alive() {
        let mut w = world();
        assert_eq!(evaluate_progression(&mut w), None);
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn test_cannon_death_clears_level() {
        let mut w = world();
        w.cannon.alive = false;
        w.rings[0].hit_segment(0);

        assert_eq!(evaluate_progression(&mut w), Some(Phase::LevelCleared));
        assert_eq!(w.level, 1);
        assert_eq!(w.params, LevelParams::for_level(1, w.config.max_rings));
        assert_eq!(w.score, 1000);
        assert!(w.cannon.alive);
        assert_eq!(w.missiles.active_count(), 0);
        // Rings rebuilt at the new strength
        assert!(w
            .active_rings()
            .iter()
            .all(|r| r.segments().iter().all(|&e| e == r.full_energy())));
        assert_eq!(w.rings[0].full_energy(), 2);
        assert_eq!(w.message.map(|m| m.kind), Some(MessageKind::LevelCleared));
    }

    #[test]
    fn test_cannon_death_wins_over_player_death() {
        let mut w = world();
        w.cannon.alive = false;
        w.player.alive = false;
        assert_eq!(evaluate_progression(&mut w), Some(Phase::LevelCleared));
        assert_eq!(w.lives, 3);
    }

    #[test]
    fn test_player_death_costs_a_life() {
        let mut w = world();
        w.player.alive = false;
        w.player.energy = 0;
        w.rings[1].hit_segment(2);

        assert_eq!(evaluate_progression(&mut w), Some(Phase::LifeLost));
        assert_eq!(w.lives, 2);
        assert_eq!(w.level, 0);
        assert!(w.player.alive);
        assert_eq!(w.player.energy, w.player.max_energy);
        // Shield damage carries over
        assert_eq!(w.rings[1].segment_energy(2), 0);
    }

    #[test]
    fn test_last_life_ends_game() {
        let mut w = world();
        w.lives = 1;
        w.score = 1234;
        w.player.alive = false;

        // The retry message comes first, even for the last ship
        assert_eq!(evaluate_progression(&mut w), Some(Phase::LifeLost));
        assert_eq!(w.lives, 0);
        assert!(w
            .events
            .iter()
            .any(|e| e.data == GameEventData::LifeLost { lives_left: 0 }));

        update_suspended(&mut w, true);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(evaluate_progression(&mut w), Some(Phase::GameOver));
        assert_eq!(w.lives, 0);
        assert!(w
            .events
            .iter()
            .any(|e| e.data == GameEventData::GameOver { score: 1234, level: 0 }));
    }

    #[test]
    fn test_no_lives_while_playing_is_game_over() {
        let mut w = world();
        w.lives = 0;
        assert_eq!(evaluate_progression(&mut w), Some(Phase::GameOver));
    }

    #[test]
    fn test_no_transition_while_message_shown() {
        let mut w = world();
        w.player.alive = false;
        evaluate_progression(&mut w);
        w.player.alive = false;
        assert_eq!(evaluate_progression(&mut w), None);
        assert_eq!(w.lives, 2);
    }

    #[test]
    fn test_confirm_resumes() {
        let mut w = world();
        w.cannon.alive = false;
        evaluate_progression(&mut w);

        update_suspended(&mut w, false);
        assert_eq!(w.phase, Phase::LevelCleared);
        update_suspended(&mut w, true);
        assert_eq!(w.phase, Phase::Playing);
        assert!(w.message.is_none());
    }

    #[test]
    fn test_countdown_resumes() {
        let mut w = world();
        w.player.alive = false;
        evaluate_progression(&mut w);

        for _ in 1..w.config.message_ticks {
            update_suspended(&mut w, false);
            assert_eq!(w.phase, Phase::LifeLost);
        }
        update_suspended(&mut w, false);
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn test_game_over_waits_for_confirm() {
        let mut w = world();
        w.lives = 0;
        assert_eq!(evaluate_progression(&mut w), Some(Phase::GameOver));

        for _ in 0..w.config.message_ticks * 2 {
            update_suspended(&mut w, false);
        }
        assert_eq!(w.phase, Phase::GameOver);

        update_suspended(&mut w, true);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.level, 0);
        assert_eq!(w.lives, 3);
        assert_eq!(w.score, 0);
    }

    #[test]
    fn test_transition_clears_hit_flags() {
        let mut w = world();
        w.player.alive = false;
        w.rings[0].was_hit = true;
        evaluate_progression(&mut w);
        assert!(!w.rings[0].was_hit);
        assert!(!w.player.was_hit);
    }
}
