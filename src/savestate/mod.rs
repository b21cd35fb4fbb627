//! Savestate Codec
//!
//! A savestate is a flat big-endian snapshot of everything that influences
//! future ticks:
//!
//! ```text
//! version(1) ruleset(1)
//! layer: 1024 tile bytes (v6) or run-length stream (v7)
//! tick(i32) chips_left(i16) keys(4 x i16) boots(4 x u8)
//! rng current(i32) prng1(i32) prng2(i32) rff(u8)
//! creature count(i16) + one packed u32 per creature
//! claim bitmap (128 bytes, cell i = byte i/8, bit i%8)
//! last_move_forced(u8)
//! ```
//!
//! Levels always write version 6. [`SavestateCompressor`] rewrites buffers
//! to version 7 on a background thread; readers accept both.

pub mod compressor;
pub mod error;
pub mod packed;
pub mod reader;
pub mod rle;
pub mod writer;

use crate::core::direction::Direction;
use crate::core::position::GRID_CELLS;
use crate::core::rng::LynxRng;
use crate::game::board::Inventory;
use crate::game::creature::Creature;
use crate::game::tile::Tile;

pub use compressor::{SavestateCompressor, SavestateHandle};
pub use error::SavestateError;
pub use packed::PackedCreature;
pub use reader::{peek_chip, read};
pub use writer::write;

/// Version byte of an uncompressed savestate.
pub const VERSION_UNCOMPRESSED: u8 = 6;

/// Version byte of a savestate with a run-length layer.
pub const VERSION_COMPRESSED: u8 = 7;

/// Ruleset byte for Lynx.
pub const RULESET_LYNX: u8 = 2;

/// Size of the claim bitmap.
pub const CLAIM_BYTES: usize = GRID_CELLS / 8;

const HEADER_LEN: usize = 2;

/// A fully decoded and validated savestate.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// Whether the source buffer was version 7.
    pub compressed: bool,
    /// Foreground layer.
    pub layer: Box<[Tile; GRID_CELLS]>,
    /// Tick counter.
    pub tick: i32,
    /// Keys, boots, chips left.
    pub inventory: Inventory,
    /// Both random generators.
    pub rng: LynxRng,
    /// Random-force-floor cursor.
    pub rff: Direction,
    /// Creatures, Chip first.
    pub creatures: Vec<Creature>,
    /// Whether Chip's last move was terrain-forced.
    pub last_move_forced: bool,
}

/// Rewrite a version 6 savestate as version 7.
///
/// Only the layer is re-encoded; every later byte is copied unchanged.
/// Version 7 input is returned as-is.
pub fn compress(bytes: &[u8]) -> error::Result<Vec<u8>> {
    let Some(&version) = bytes.first() else {
        return Err(SavestateError::Truncated { offset: 0, needed: 1 });
    };
    match version {
        VERSION_COMPRESSED => return Ok(bytes.to_vec()),
        VERSION_UNCOMPRESSED => {}
        other => return Err(SavestateError::UnsupportedVersion(other)),
    }

    let layer_end = HEADER_LEN + GRID_CELLS;
    if bytes.len() < layer_end {
        return Err(SavestateError::Truncated {
            offset: bytes.len(),
            needed: layer_end - bytes.len(),
        });
    }
    if bytes[1] != RULESET_LYNX {
        return Err(SavestateError::UnsupportedRuleset(bytes[1]));
    }

    let mut out = Vec::with_capacity(bytes.len() / 2);
    out.push(VERSION_COMPRESSED);
    out.push(RULESET_LYNX);
    out.extend_from_slice(&rle::encode(&bytes[HEADER_LEN..layer_end]));
    out.extend_from_slice(&bytes[layer_end..]);
    Ok(out)
}
