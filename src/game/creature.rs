//! Creature State
//!
//! One actor on the board: Chip, a monster or a block. This module holds
//! the per-creature rules that need nothing but the board (priority lists,
//! terrain legality, speed). Anything touching other creatures lives in
//! [`crate::game::creature_list`].

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::direction::{turn, Direction};
use crate::core::position::Position;
use crate::game::board::{Board, BOOT_ICE, BOOT_SLIDE};
use crate::game::creature_id::CreatureId;
use crate::game::tile::Tile;

/// Distance units travelled per tile.
pub const TILE_DISTANCE: u8 = 8;

/// Largest value `animation_timer` can hold.
pub const MAX_ANIMATION: u8 = 12;

/// A single actor.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Creature {
    /// Cell the creature occupies (or is moving into).
    pub position: Position,
    /// Kind; `Dead` once killed.
    pub kind: CreatureId,
    /// Facing.
    pub direction: Direction,
    /// Voluntary move chosen this tick.
    pub t_direction: Direction,
    /// Move imposed by terrain this tick.
    pub f_direction: Direction,
    /// Whether the current move was terrain-forced.
    pub sliding: bool,
    /// Progress toward the next tile, 0..=8. Zero means free to start a move.
    pub time_traveled: u8,
    /// Death or exit animation frames left, 0..=12.
    pub animation_timer: u8,
    /// Set once a teleport has been resolved for this arrival.
    pub teleport_flag: bool,
    /// Chip only: may cancel the next force-floor slide.
    pub override_token: bool,
    /// One-shot direction injected by an editor.
    #[serde(skip)]
    pub next_move_cheat: Option<Direction>,
}

impl Creature {
    /// A resting creature.
    pub fn new(position: Position, kind: CreatureId, direction: Direction) -> Self {
        let (kind, sliding) = kind.normalized();
        Self {
            position,
            kind,
            direction,
            t_direction: Direction::None,
            f_direction: Direction::None,
            sliding,
            time_traveled: 0,
            animation_timer: 0,
            teleport_flag: false,
            override_token: false,
            next_move_cheat: None,
        }
    }

    /// The creature a layer tile spawns, if any.
    pub fn from_tile(position: Position, tile: Tile) -> Option<Self> {
        if !tile.is_creature() {
            return None;
        }
        let code = tile.byte();
        let (kind, direction) = if tile.is_clone_block() {
            (CreatureId::Block, Direction::cardinal(code + 2))
        } else if tile == Tile::Block {
            (CreatureId::Block, Direction::Up)
        } else if tile.is_swimming_chip() {
            (CreatureId::ChipSwimming, Direction::cardinal(code))
        } else if tile.is_chip() {
            (CreatureId::Chip, Direction::cardinal(code))
        } else {
            (CreatureId::from_code((code - Tile::BugUp.byte()) >> 2)?, Direction::cardinal(code))
        };
        Some(Self::new(position, kind, direction))
    }

    /// Tile used to draw this creature.
    pub fn to_tile(&self) -> Tile {
        match self.kind {
            CreatureId::Block => Tile::Block,
            CreatureId::Chip | CreatureId::ChipSliding => Tile::facing(Tile::ChipUp, self.direction),
            CreatureId::ChipSwimming => Tile::facing(Tile::ChipSwimmingUp, self.direction),
            CreatureId::Tank | CreatureId::TankStationary => Tile::facing(Tile::TankUp, self.direction),
            CreatureId::Dead => match self.direction {
                Direction::Up => Tile::DrownedChip,
                Direction::Left => Tile::BurnedChip,
                _ => Tile::BombedChip,
            },
            CreatureId::IceBlock => Tile::IceBlock,
            kind => Tile::from_byte(Tile::BugUp.byte() + (kind.code() << 2))
                .map(|base| Tile::facing(base, self.direction))
                .unwrap_or(Tile::Floor),
        }
    }

    /// Not killed.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.kind != CreatureId::Dead
    }

    /// Dead with an animation still playing.
    #[inline]
    pub fn is_animation(&self) -> bool {
        self.kind == CreatureId::Dead && self.animation_timer != 0
    }

    /// Dead with nothing left to draw; the slot can be reused.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.kind == CreatureId::Dead && self.animation_timer == 0
    }

    /// Chip kinds (normal or swimming).
    #[inline]
    pub fn is_chip(&self) -> bool {
        self.kind.is_chip()
    }

    /// Voluntary candidates in priority order.
    ///
    /// May contain the `WalkerTurn` / `BlobTurn` pseudo-directions, which the
    /// caller resolves against the RNG when it reaches them.
    pub fn direction_priority(&self, chip: Position) -> SmallVec<[Direction; 4]> {
        let d = self.direction;
        match self.kind {
            CreatureId::Bug => d.turn_all(&[turn::LEFT, turn::FORWARD, turn::RIGHT, turn::AROUND]),
            CreatureId::Fireball => d.turn_all(&[turn::FORWARD, turn::RIGHT, turn::LEFT, turn::AROUND]),
            CreatureId::Ball => d.turn_all(&[turn::FORWARD, turn::AROUND]),
            CreatureId::Tank | CreatureId::TankStationary => d.turn_all(&[turn::FORWARD]),
            CreatureId::Glider => d.turn_all(&[turn::FORWARD, turn::LEFT, turn::RIGHT, turn::AROUND]),
            CreatureId::Teeth => self.position.seek(chip).into_iter().collect(),
            CreatureId::Walker => SmallVec::from_slice(&[d, Direction::WalkerTurn]),
            CreatureId::Blob => SmallVec::from_slice(&[Direction::BlobTurn]),
            CreatureId::Paramecium => d.turn_all(&[turn::RIGHT, turn::FORWARD, turn::LEFT, turn::AROUND]),
            _ => SmallVec::new(),
        }
    }

    /// Whether terrain allows entering `tile` while moving `direction`.
    pub fn can_enter(&self, direction: Direction, tile: Tile, board: &Board) -> bool {
        use Direction::{Down, Left, Right, Up};

        let is_chip = self.is_chip();
        let inventory = &board.inventory;
        match tile {
            Tile::Floor | Tile::Water | Tile::Ice => true,
            Tile::ForceUp | Tile::ForceLeft | Tile::ForceDown | Tile::ForceRight | Tile::ForceRandom => true,
            Tile::ButtonGreen | Tile::ButtonRed | Tile::ButtonBrown | Tile::ButtonBlue => true,
            Tile::ToggleOpen | Tile::Teleport | Tile::Bomb | Tile::Trap => true,
            Tile::KeyBlue | Tile::KeyRed => true,
            Tile::Fire => is_chip || matches!(self.kind, CreatureId::Fireball | CreatureId::Block),
            Tile::ThinWallUp => direction != Down,
            Tile::ThinWallLeft => direction != Right,
            Tile::ThinWallDown => direction != Up,
            Tile::ThinWallRight => direction != Left,
            Tile::ThinWallDownRight => direction != Up && direction != Left,
            Tile::IceSlideSouthEast => direction != Down && direction != Right,
            Tile::IceSlideSouthWest => direction != Down && direction != Left,
            Tile::IceSlideNorthWest => direction != Up && direction != Left,
            Tile::IceSlideNorthEast => direction != Up && direction != Right,
            Tile::DoorBlue | Tile::DoorRed | Tile::DoorGreen | Tile::DoorYellow => {
                is_chip && tile.key_slot().is_some_and(|slot| inventory.keys[slot] > 0)
            }
            Tile::Socket => is_chip && inventory.chips_left <= 0,
            Tile::Gravel => is_chip || self.kind == CreatureId::Block,
            Tile::Chip | Tile::Dirt | Tile::Exit | Tile::Thief | Tile::Hint | Tile::PopUpWall => is_chip,
            Tile::BlueWallFake | Tile::BlueWallReal | Tile::HiddenWallTemp => is_chip,
            Tile::KeyGreen | Tile::KeyYellow => is_chip,
            Tile::BootsWater | Tile::BootsFire | Tile::BootsIce | Tile::BootsSlide => is_chip,
            Tile::ChipUp | Tile::ChipLeft | Tile::ChipDown | Tile::ChipRight => !is_chip,
            _ => false,
        }
    }

    /// Whether terrain allows leaving `tile` while moving `direction`.
    ///
    /// Traps hold everything until released. Force floors refuse a move
    /// straight back against the flow unless Chip wears suction boots.
    pub fn can_leave(&self, direction: Direction, tile: Tile, releasing: bool, board: &Board) -> bool {
        use Direction::{Down, Left, Right, Up};

        match tile {
            Tile::ThinWallUp => return direction != Up,
            Tile::ThinWallRight => return direction != Right,
            Tile::ThinWallDown => return direction != Down,
            Tile::ThinWallLeft => return direction != Left,
            Tile::ThinWallDownRight => return direction != Down && direction != Right,
            Tile::Trap => return releasing,
            _ => {}
        }
        if tile.is_force_floor() && !(self.is_chip() && board.inventory.has_boot(BOOT_SLIDE)) {
            let flow = tile.force_direction().unwrap_or(board.rff);
            return direction.reverse() != flow;
        }
        true
    }

    /// Distance units covered per tick while standing on `tile`.
    pub fn speed(&self, tile: Tile, board: &Board) -> u8 {
        if !self.is_alive() {
            return 0;
        }
        let base = if self.kind == CreatureId::Blob { 1 } else { 2 };
        let chip_immune = |slot| self.is_chip() && board.inventory.has_boot(slot);
        if tile.is_ice() && !chip_immune(BOOT_ICE) {
            base * 2
        } else if tile.is_force_floor() && !chip_immune(BOOT_SLIDE) {
            base * 2
        } else {
            base
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
