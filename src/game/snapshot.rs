//! Read-Only Snapshot
//!
//! What a renderer gets to see. A [`Snapshot`] borrows the world immutably
//! and hands out small `Copy` views; nothing reachable from it can change
//! simulation state. [`Drawable`] tags each view with its entity kind so a
//! renderer can dispatch on it.

use serde::Serialize;

use crate::core::fixed::{Fixed, SEGMENTS_PER_RING};
use crate::core::vec2::FixedVec2;
use crate::game::state::{MessageKind, Phase, ShipKind, Star, World};

/// Ship as seen by a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ShipView {
    /// Which ship
    pub kind: ShipKind,
    /// Position
    pub position: FixedVec2,
    /// Heading index
    pub rotation: i32,
    /// Turning this tick (sign gives direction), for the turning flare
    pub rotation_speed: i32,
    /// Energy for the status bar
    pub energy: i32,
    /// Status bar full scale
    pub max_energy: i32,
    /// Still flying
    pub alive: bool,
    /// Flash this frame
    pub was_hit: bool,
    /// Engine flare
    pub thrusting: bool,
    /// Reverse flare
    pub reversing: bool,
}

/// Missile as seen by a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MissileView {
    /// Pool slot
    pub slot: usize,
    /// Who fired it, for colouring
    pub owner: ShipKind,
    /// Position
    pub position: FixedVec2,
    /// Heading index
    pub rotation: i32,
    /// Draw the explosion instead of the missile
    pub exploded: bool,
    /// Ticks left; drives the explosion fade
    pub lifetime: i32,
}

/// Shield ring as seen by a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RingView {
    /// Ring index, innermost first
    pub index: usize,
    /// Centre
    pub position: FixedVec2,
    /// Outer radius
    pub radius: Fixed,
    /// Rotation index
    pub rotation: i32,
    /// Energy per segment; zero segments are gaps
    pub segments: [u32; SEGMENTS_PER_RING],
    /// Segment energy at full strength
    pub full_energy: u32,
    /// Flash this frame
    pub was_hit: bool,
}

/// Anything a renderer draws, tagged by kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Drawable {
    /// Player or cannon
    Ship(ShipView),
    /// Missile or explosion
    Missile(MissileView),
    /// Shield ring
    Ring(RingView),
    /// Background decoration
    Star(Star),
}

/// Score line and message state for the overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct HudView {
    /// Tick number
    pub tick: u64,
    /// Current level (0-based)
    pub level: u32,
    /// Lives left
    pub lives: i32,
    /// Score
    pub score: u32,
    /// Progression phase
    pub phase: Phase,
    /// Message kind, if one is up
    pub message: Option<MessageKind>,
    /// Headline text of the message
    pub message_text: Option<&'static str>,
    /// Second line of the message
    pub message_prompt: Option<&'static str>,
}

/// Immutable view of a world after a tick.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    world: &'a World,
}

impl<'a> Snapshot<'a> {
    /// Borrow `world` for reading.
    pub fn new(world: &'a World) -> Self {
        Self { world }
    }

    /// Ship view by kind.
    pub fn ship(&self, kind: ShipKind) -> ShipView {
        let ship = self.world.ship(kind);
        ShipView {
            kind,
            position: ship.body.position,
            rotation: ship.body.rotation,
            rotation_speed: ship.body.rotation_speed,
            energy: ship.energy,
            max_energy: ship.max_energy,
            alive: ship.alive,
            was_hit: ship.was_hit,
            thrusting: ship.intent.thrusting,
            reversing: ship.intent.reversing,
        }
    }

    /// Player ship.
    pub fn player(&self) -> ShipView {
        self.ship(ShipKind::Player)
    }

    /// Cannon.
    pub fn cannon(&self) -> ShipView {
        self.ship(ShipKind::Cannon)
    }

    /// Active missiles, exploded ones included, in slot order.
    pub fn missiles(&self) -> impl Iterator<Item = MissileView> + 'a {
        let world: &'a World = self.world;
        world.missiles.iter_active().map(|(slot, m)| MissileView {
            slot,
            owner: m.owner,
            position: m.body.position,
            rotation: m.body.rotation,
            exploded: m.exploded,
            lifetime: m.lifetime,
        })
    }

    /// Live rings, innermost first.
    pub fn rings(&self) -> impl Iterator<Item = RingView> + 'a {
        let world: &'a World = self.world;
        world
            .active_rings()
            .iter()
            .enumerate()
            .filter(|(_, r)| r.alive())
            .map(|(index, r)| RingView {
                index,
                position: r.body.position,
                radius: r.body.radius,
                rotation: r.body.rotation,
                segments: *r.segments(),
                full_energy: r.full_energy(),
                was_hit: r.was_hit,
            })
    }

    /// Background stars.
    pub fn stars(&self) -> impl Iterator<Item = Star> + 'a {
        let world: &'a World = self.world;
        world.stars.iter().copied()
    }

    /// Everything to draw, back to front: stars, rings, missiles, ships.
    pub fn drawables(&self) -> impl Iterator<Item = Drawable> + 'a {
        let ships = [self.cannon(), self.player()];
        self.stars()
            .map(Drawable::Star)
            .chain(self.rings().map(Drawable::Ring))
            .chain(self.missiles().map(Drawable::Missile))
            .chain(ships.into_iter().map(Drawable::Ship))
    }

    /// Overlay state.
    pub fn hud(&self) -> HudView {
        let w = self.world;
        let message = w.message.map(|m| m.kind);
        HudView {
            tick: w.tick,
            level: w.level,
            lives: w.lives,
            score: w.score,
            phase: w.phase,
            message,
            message_text: message.map(MessageKind::text),
            message_prompt: message.map(MessageKind::prompt),
        }
    }
}

impl World {
    /// Read-only view for rendering.
    #[inline]
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::NUMBER_OF_STARS;
    use crate::game::combat::launch_missile;
    use crate::game::config::WorldConfig;

    #[test]
    fn test_drawables_cover_every_entity() {
        let mut w = World::new(WorldConfig::default()).unwrap();
        launch_missile(&mut w, ShipKind::Player);
        launch_missile(&mut w, ShipKind::Cannon);

        let snap = w.snapshot();
        let all: Vec<_> = snap.drawables().collect();

        let stars = all.iter().filter(|d| matches!(d, Drawable::Star(_))).count();
        let rings = all.iter().filter(|d| matches!(d, Drawable::Ring(_))).count();
        let missiles = all.iter().filter(|d| matches!(d, Drawable::Missile(_))).count();
        let ships = all.iter().filter(|d| matches!(d, Drawable::Ship(_))).count();

        assert_eq!(stars, NUMBER_OF_STARS);
        assert_eq!(rings, 3);
        assert_eq!(missiles, 2);
        assert_eq!(ships, 2);
        assert!(matches!(all.last(), Some(Drawable::Ship(v)) if v.kind == ShipKind::Player));
    }

    #[test]
    fn test_dead_rings_are_hidden() {
        let mut w = World::new(WorldConfig::default()).unwrap();
        for seg in 0..SEGMENTS_PER_RING {
            w.rings[1].hit_segment(seg);
        }
        let indices: Vec<_> = w.snapshot().rings().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_views_match_world() {
        let w = World::new(WorldConfig::default()).unwrap();
        let snap = w.snapshot();
        let player = snap.player();
        assert_eq!(player.position, w.player.body.position);
        assert_eq!(player.energy, w.player.energy);

        let hud = snap.hud();
        assert_eq!(hud.lives, 3);
        assert_eq!(hud.phase, Phase::Playing);
        assert!(hud.message_text.is_none());
    }

    #[test]
    fn test_snapshot_serializes() {
        let w = World::new(WorldConfig::default()).unwrap();
        let snap = w.snapshot();
        let json = serde_json::to_string(&snap.drawables().collect::<Vec<_>>()).unwrap();
        assert!(json.contains("\"Ring\""));
        let hud = serde_json::to_value(snap.hud()).unwrap();
        assert_eq!(hud["level"], 0);
    }
}
