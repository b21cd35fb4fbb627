//! Configuration
//!
//! [`LevelDescription`] is the already-decoded level an upstream loader hands
//! to [`Level::new`](crate::game::level::Level::new). [`EngineConfig`] tunes
//! the background savestate compressor. Both deserialize from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::direction::Direction;
use crate::core::position::Position;
use crate::game::step::Step;

/// A button wired to a target cell (clone machine or trap).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Button position.
    pub button: Position,
    /// Connected clone machine or trap.
    pub target: Position,
}

/// An initial level, as produced by a level-set loader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelDescription {
    /// Level number within its set.
    pub number: u16,
    /// Title.
    pub title: String,
    /// Password.
    pub password: String,
    /// Hint text.
    pub hint: String,
    /// Time limit in seconds; 0 means untimed.
    pub time_limit: u16,
    /// Chips needed to open the socket.
    pub chips_required: i16,
    /// Foreground layer, 1024 tile bytes in reading order.
    pub layer: Vec<u8>,
    /// Tiles lying underneath creatures, 1024 bytes. Empty means all floor.
    pub background: Vec<u8>,
    /// Teleports in reading order. Derived from the layer when empty.
    pub teleports: Vec<Position>,
    /// Toggle doors. Derived from the layer when empty.
    pub toggle_doors: Vec<Position>,
    /// Red buttons and their clone machines.
    pub clone_connections: Vec<Connection>,
    /// Brown buttons and their traps.
    pub trap_connections: Vec<Connection>,
    /// LCG seed. Only the low 31 bits are used.
    pub rng_seed: u32,
    /// First walker register.
    pub prng1: u8,
    /// Second walker register.
    pub prng2: u8,
    /// Initial random-force-floor direction. Default: `Up`.
    pub rff: Direction,
    /// Step parity. Default: `Even`.
    pub step: Step,
}

impl Default for LevelDescription {
    fn default() -> Self {
        Self {
            number: 0,
            title: String::new(),
            password: String::new(),
            hint: String::new(),
            time_limit: 0,
            chips_required: 0,
            layer: Vec::new(),
            background: Vec::new(),
            teleports: Vec::new(),
            toggle_doors: Vec::new(),
            clone_connections: Vec::new(),
            trap_connections: Vec::new(),
            rng_seed: 0,
            prng1: 0,
            prng2: 0,
            rff: Direction::Up,
            step: Step::Even,
        }
    }
}

impl LevelDescription {
    /// Parse from a JSON string.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// =============================================================================
// COMPRESSOR / ENGINE
// =============================================================================

/// Settings for the background savestate compressor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorConfig {
    /// Pending buffers the queue holds before new submissions are left
    /// uncompressed. Default: 256.
    pub queue_capacity: usize,
    /// Worker thread name. Default: `"savestate-compressor"`.
    pub thread_name: String,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            thread_name: "savestate-compressor".to_string(),
        }
    }
}

/// Engine-wide settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Compressor settings.
    pub compressor: CompressorConfig,
    /// Hand every savestate taken through the engine to the compressor.
    /// Default: `false`.
    pub compress_saves: bool,
}

impl EngineConfig {
    /// Parse from a JSON string.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Read and parse a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::from_json(&text)?)
    }
}
