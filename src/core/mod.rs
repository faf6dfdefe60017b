//! Core deterministic primitives.
//!
//! Scaled-integer arithmetic, the angle table, vectors, the seeded RNG and
//! state hashing. Nothing here knows about ships or rings.

pub mod fixed;
pub mod hash;
pub mod rng;
pub mod trig;
pub mod vec2;

// Re-export core types
pub use fixed::{Fixed, FIXED_HALF_SCALE, FIXED_SCALE, ROTATION_STEPS};
pub use hash::{compute_state_hash, StateHash, StateHasher};
pub use rng::DeterministicRng;
pub use trig::AngleTable;
pub use vec2::FixedVec2;
