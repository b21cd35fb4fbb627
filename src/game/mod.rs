//! Game Logic Module
//!
//! All simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `tile`: Tile codes and classification
//! - `creature_id`: Creature kinds
//! - `step`: Step parity (teeth steps, death animation length)
//! - `board`: Layer, inventory, RNG and wiring
//! - `creature`: Per-creature rules
//! - `creature_list`: Creature list, claim layer, tick phases
//! - `button`: Button effects
//! - `level`: Level construction, savestates, timers
//! - `tick`: Authoritative simulation loop
//! - `cheats`: Editor operations

pub mod board;
pub mod button;
pub mod cheats;
pub mod creature;
pub mod creature_id;
pub mod creature_list;
pub mod level;
pub mod step;
pub mod tick;
pub mod tile;

// Re-export key types
pub use board::{Board, Inventory};
pub use button::Button;
pub use creature::Creature;
pub use creature_id::CreatureId;
pub use creature_list::{CreatureList, Phase, CHIP_INDEX};
pub use level::{Level, LevelError, UNTIMED};
pub use step::Step;
pub use tick::{Replay, TickOutcome};
pub use tile::Tile;
