//! # Lynx Engine
//!
//! Deterministic tick-level simulator for the Lynx tile-puzzle ruleset.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       LYNX ENGINE                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/              - Deterministic primitives               │
//! │  ├── position.rs    - 32x32 grid cells                       │
//! │  ├── direction.rs   - Directions and relative turns          │
//! │  ├── rng.rs         - LCG + walker shift-register PRNG       │
//! │  └── hash.rs        - State hashing for verification         │
//! │                                                              │
//! │  game/              - Simulation (deterministic)             │
//! │  ├── tile.rs        - Tile codes and classification          │
//! │  ├── creature.rs    - Per-creature terrain rules             │
//! │  ├── creature_list  - Claim layer and tick phases            │
//! │  ├── level.rs       - Level construction and timers          │
//! │  ├── tick.rs        - Authoritative simulation loop          │
//! │  └── cheats.rs      - Editor operations                      │
//! │                                                              │
//! │  savestate/         - Codec (deterministic)                  │
//! │  ├── writer/reader  - Version 6 and 7 formats                │
//! │  ├── rle.rs         - Layer run-length encoding              │
//! │  └── compressor.rs  - Background v6 -> v7 worker             │
//! │                                                              │
//! │  config.rs          - Level descriptions, engine settings    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/`, `game/` and `savestate/` modules are **100% deterministic**:
//! - Integer arithmetic only
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//! - All randomness from the level's seeded generators
//!
//! Given the same level and the same inputs, two runs produce
//! **byte-identical savestates** after every tick.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;
pub mod savestate;

// Re-export commonly used types
pub use crate::config::{EngineConfig, LevelDescription};
pub use crate::core::direction::{parse_moves, Direction};
pub use crate::core::position::Position;
pub use crate::game::level::Level;
pub use crate::game::tick::{Replay, TickOutcome};
pub use crate::game::tile::Tile;
pub use crate::savestate::{SavestateCompressor, SavestateError, SavestateHandle};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
