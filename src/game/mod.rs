//! Game Logic Module
//!
//! All game simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `config`: World configuration and validation
//! - `body`: Kinematic state and per-tick integration
//! - `collision`: Circle, ring band and segment tests
//! - `pool`: Fixed-capacity round-robin slot arena
//! - `state`: Ships, missiles, rings, stars and the world
//! - `input`: Input intent, frames and recordings
//! - `combat`: Firing, hits, shield bounce and energy
//! - `cannon`: Adversary aim/turn/fire decision
//! - `progression`: Level, life and game-over transitions
//! - `events`: Per-tick event log
//! - `snapshot`: Read-only views for rendering
//! - `tick`: Authoritative simulation loop, session and replay

pub mod body;
pub mod cannon;
pub mod collision;
pub mod combat;
pub mod config;
pub mod events;
pub mod input;
pub mod pool;
pub mod progression;
pub mod snapshot;
pub mod state;
pub mod tick;

// Re-export key types
pub use config::{ConfigError, WorldConfig};
pub use events::{GameEvent, GameEventData};
pub use input::{InputEvent, InputFrame, InputRecording};
pub use snapshot::{Drawable, Snapshot};
pub use state::{Phase, ShipKind, World};
pub use tick::{advance, replay, Session};
