//! Core deterministic primitives.
//!
//! Grid geometry, direction algebra, the two Lynx random generators and
//! state hashing. Nothing here knows about tiles or creatures.

pub mod position;
pub mod direction;
pub mod rng;
pub mod hash;

// Re-export core types
pub use position::{Position, GRID_CELLS, GRID_WIDTH};
pub use direction::Direction;
pub use rng::LynxRng;
pub use hash::{hash_savestate, StateHash};
