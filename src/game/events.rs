//! Game Events
//!
//! Facts produced while a tick runs. The world keeps them in a buffer that is
//! cleared at the start of every tick; drivers read them afterwards for
//! logging, sound cues and score persistence. Every event is `Copy`, so
//! recording one never allocates once the buffer has its capacity.

use serde::{Deserialize, Serialize};

use crate::game::state::{MessageKind, ShipKind};

/// Buffer capacity reserved up front.
pub const EVENT_BUFFER_CAPACITY: usize = 256;

/// Game event data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// A ship launched a missile into pool slot `slot`.
    MissileFired {
        /// Ship that fired.
        owner: ShipKind,
        /// Pool slot used.
        slot: usize,
    },

    /// A missile struck a ship.
    ShipHit {
        /// Ship affected.
        ship: ShipKind,
        /// Owner of the missile.
        by: ShipKind,
        /// Energy after the hit.
        energy_left: i32,
    },

    /// The player bounced off the shield.
    ShipBounced {
        /// Ring index, innermost first.
        ring: usize,
        /// Energy lost to the impact.
        damage: i32,
    },

    /// A missile removed one point from a ring segment.
    SegmentHit {
        /// Ring index, innermost first.
        ring: usize,
        /// Segment index.
        segment: usize,
        /// Segment energy after the hit.
        energy_left: u32,
        /// Owner of the missile.
        by: ShipKind,
    },

    /// The last segment of a ring went down.
    RingDestroyed {
        /// Ring index, innermost first.
        ring: usize,
    },

    /// A ship's energy ran out.
    ShipDestroyed {
        /// Ship affected.
        ship: ShipKind,
    },

    /// Points were added to the score.
    ScoreAwarded {
        /// Points just added.
        points: u32,
        /// Score afterwards.
        total: u32,
    },

    /// The cannon died; `level` is the level now being set up.
    LevelCleared {
        /// Level number.
        level: u32,
        /// Clear bonus added to the score.
        bonus: u32,
    },

    /// The player died with lives to spare.
    LifeLost {
        /// Lives remaining.
        lives_left: i32,
    },

    /// No lives left. `score` and `level` go to the score store.
    GameOver {
        /// Final score.
        score: u32,
        /// Level number.
        level: u32,
    },

    /// A progression message was dismissed and play continues.
    Resumed {
        /// Message that was showing.
        after: MessageKind,
    },

    /// Back to level zero with full lives.
    Restarted,
}

/// A game event stamped with the tick it happened on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u64,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    #[inline]
    pub fn new(tick: u64, data: GameEventData) -> Self {
        Self { tick, data }
    }

    /// Whether this event changes the game phase.
    pub fn is_progression(&self) -> bool {
        matches!(
            self.data,
            GameEventData::LevelCleared { .. }
                | GameEventData::LifeLost { .. }
                | GameEventData::GameOver { .. }
                | GameEventData::Resumed { .. }
                | GameEventData::Restarted
        )
    }

    /// Ship involved, if any.
    pub fn ship(&self) -> Option<ShipKind> {
        match self.data {
            GameEventData::MissileFired { owner, .. } => Some(owner),
            GameEventData::ShipHit { ship, .. } => Some(ship),
            GameEventData::ShipDestroyed { ship } => Some(ship),
            GameEventData::ShipBounced { .. } => Some(ShipKind::Player),
            _ => None,
        }
    }
}
