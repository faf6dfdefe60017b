//! # Space Castle
//!
//! Deterministic combat simulation core for the Space Castle arcade shooter:
//! a player ship attacks a cannon hiding behind rotating segmented shield
//! rings.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       SPACE CASTLE                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - x1024 fixed-point arithmetic, constants   │
//! │  ├── trig.rs     - Angle table and bearings                  │
//! │  ├── vec2.rs     - 2D vector with toroidal wrap              │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── body.rs     - Physics body integrator                   │
//! │  ├── collision.rs- Circle, band and segment tests            │
//! │  ├── combat.rs   - Hits, bounce, energy                      │
//! │  ├── cannon.rs   - Adversary AI                              │
//! │  ├── progression.rs - Level / life / game-over machine       │
//! │  ├── snapshot.rs - Read-only views for renderers             │
//! │  └── tick.rs     - Authoritative simulation loop             │
//! │                                                              │
//! │  scores.rs       - High-score persistence (file I/O)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - No floating-point arithmetic in game logic
//! - No system time dependencies
//! - All randomness from seeded Xorshift128+
//!
//! Given identical inputs and RNG seed, the simulation produces
//! **identical results** on any platform.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod scores;

// Re-export commonly used types
pub use core::fixed::{Fixed, FIXED_SCALE, ROTATION_STEPS};
pub use core::vec2::FixedVec2;
pub use core::rng::DeterministicRng;
pub use game::input::{InputEvent, InputFrame, InputRecording};
pub use game::state::{Phase, ShipKind, World};
pub use game::tick::{advance, replay, Session};
pub use scores::{FileScoreStore, MemoryScoreStore, ScoreError, ScoreRecorder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 25;

/// Length of one tick in milliseconds
pub const MILLIS_PER_TICK: u32 = 1000 / TICK_RATE;
