//! Creature Kinds
//!
//! The 4-bit kind codes stored in packed creature records. Three codes only
//! exist on disk: `TankStationary` and `ChipSliding` collapse on load, and
//! `IceBlock` is not part of this ruleset.

use serde::{Deserialize, Serialize};

/// Kind of a creature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CreatureId {
    /// Follows the left wall.
    Bug = 0,
    /// Follows the right wall, walks through fire.
    Fireball = 1,
    /// Bounces back and forth.
    Ball = 2,
    /// Moves straight until a blue button turns it around.
    Tank = 3,
    /// Prefers left turns, swims.
    Glider = 4,
    /// Chases Chip on teeth-step ticks.
    Teeth = 5,
    /// Turns a pseudo-random amount when blocked.
    Walker = 6,
    /// Moves in a random cardinal at half speed.
    Blob = 7,
    /// Follows the right wall the other way round.
    Paramecium = 8,
    /// Stationary tank (load-time alias of `Tank`).
    TankStationary = 9,
    /// Pushable block.
    Block = 10,
    /// The player.
    Chip = 11,
    /// Ice block (unsupported).
    IceBlock = 12,
    /// Sliding Chip (load-time alias of `Chip`).
    ChipSliding = 13,
    /// Chip in water with flippers.
    ChipSwimming = 14,
    /// Removed from play; may still be animating.
    Dead = 15,
}

impl CreatureId {
    /// Decode a 4-bit kind code.
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => CreatureId::Bug,
            1 => CreatureId::Fireball,
            2 => CreatureId::Ball,
            3 => CreatureId::Tank,
            4 => CreatureId::Glider,
            5 => CreatureId::Teeth,
            6 => CreatureId::Walker,
            7 => CreatureId::Blob,
            8 => CreatureId::Paramecium,
            9 => CreatureId::TankStationary,
            10 => CreatureId::Block,
            11 => CreatureId::Chip,
            12 => CreatureId::IceBlock,
            13 => CreatureId::ChipSliding,
            14 => CreatureId::ChipSwimming,
            15 => CreatureId::Dead,
            _ => return None,
        })
    }

    /// 4-bit kind code.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Any of the player kinds.
    #[inline]
    pub const fn is_chip(self) -> bool {
        matches!(self, CreatureId::Chip | CreatureId::ChipSliding | CreatureId::ChipSwimming)
    }

    /// Bug through Paramecium (tanks included).
    #[inline]
    pub const fn is_monster(self) -> bool {
        (self as u8) <= CreatureId::TankStationary as u8
    }

    /// Tank in either form.
    #[inline]
    pub const fn is_tank(self) -> bool {
        matches!(self, CreatureId::Tank | CreatureId::TankStationary)
    }

    /// Kind after load-time aliasing, with whether the alias implies sliding.
    pub const fn normalized(self) -> (Self, bool) {
        match self {
            CreatureId::TankStationary => (CreatureId::Tank, false),
            CreatureId::ChipSliding => (CreatureId::Chip, true),
            other => (other, false),
        }
    }
}
