//! Level State
//!
//! A `Level` owns the [`Board`] and the [`CreatureList`] and is the only
//! public way to advance or snapshot the simulation:
//!
//! - [`Level::tick`] runs one tick (see [`crate::game::tick`])
//! - [`Level::save`] / [`Level::load`] produce and restore savestates
//! - cheat and editor operations live in [`crate::game::cheats`]

use thiserror::Error;
use tracing::debug;

use crate::config::LevelDescription;
use crate::core::direction::Direction;
use crate::core::hash::{hash_savestate, StateHash};
use crate::core::position::{Position, GRID_CELLS};
use crate::core::rng::LynxRng;
use crate::game::board::{Board, Inventory};
use crate::game::button::Button;
use crate::game::creature::Creature;
use crate::game::creature_id::CreatureId;
use crate::game::creature_list::CreatureList;
use crate::game::step::Step;
use crate::game::tile::Tile;
use crate::savestate::{self, SavestateError};

/// Timer value of a level without a time limit.
pub const UNTIMED: i32 = -2;

/// Timer units per second.
const TIMER_UNITS_PER_SECOND: i32 = 100;

/// Fraction of a second on the clock when a timed level starts.
const TIMER_START_FRACTION: i32 = 95;

/// Timer units consumed per tick.
const TIMER_UNITS_PER_TICK: i32 = 5;

/// Start value of the "time since start" clock shown for untimed play.
const TCHIP_START: i32 = 99995;

/// Errors building a level from a description.
#[derive(Debug, Error)]
pub enum LevelError {
    /// A tile layer has the wrong length.
    #[error("{field} must hold {expected} bytes, got {len}")]
    LayerLength {
        /// Which layer.
        field: &'static str,
        /// Required length.
        expected: usize,
        /// Actual length.
        len: usize,
    },

    /// More creatures than a savestate can count.
    #[error("{0} creatures exceed the 16-bit creature count")]
    TooManyCreatures(usize),

    /// Description JSON failed to parse.
    #[error("invalid level description: {0}")]
    Json(#[from] serde_json::Error),
}

/// A playable level.
#[derive(Clone, Debug)]
pub struct Level {
    pub(crate) board: Board,
    pub(crate) creatures: CreatureList,
    /// Whether Chip's latest move was terrain-forced. Carried in the
    /// savestate for compatibility; the simulation itself never reads it.
    pub(crate) last_move_forced: bool,
    pub(crate) level_won: bool,
    start_time: i32,
    number: u16,
    title: String,
    password: String,
    hint: String,
}

fn parse_layer(bytes: &[u8], field: &'static str) -> Result<Box<[Tile; GRID_CELLS]>, LevelError> {
    if bytes.len() != GRID_CELLS {
        return Err(LevelError::LayerLength {
            field,
            expected: GRID_CELLS,
            len: bytes.len(),
        });
    }
    let mut layer = Box::new([Tile::Floor; GRID_CELLS]);
    let mut invalid = 0usize;
    for (cell, &byte) in bytes.iter().enumerate() {
        layer[cell] = Tile::from_byte(byte).unwrap_or_else(|| {
            invalid += 1;
            Tile::Wall
        });
    }
    if invalid > 0 {
        debug!(field, invalid, "unknown tile bytes replaced with walls");
    }
    Ok(layer)
}

/// Positions whose tile satisfies `pred`, in reading order.
fn cells_matching(layer: &[Tile; GRID_CELLS], pred: impl Fn(Tile) -> bool) -> Vec<Position> {
    layer
        .iter()
        .enumerate()
        .filter(|&(_, &tile)| pred(tile))
        .filter_map(|(cell, _)| Position::from_index(cell as u16))
        .collect()
}

impl Level {
    /// Build a level at tick 0.
    ///
    /// Creature tiles are lifted off the layer into the creature list and
    /// replaced by the background tile. The first Chip found becomes
    /// creature 0; a level without one gets Chip at the origin facing down.
    pub fn new(desc: &LevelDescription) -> Result<Self, LevelError> {
        let mut layer = parse_layer(&desc.layer, "layer")?;
        let background = if desc.background.is_empty() {
            Box::new([Tile::Floor; GRID_CELLS])
        } else {
            parse_layer(&desc.background, "background")?
        };

        let mut creatures: Vec<Creature> = Vec::new();
        let mut chip_found = false;
        for cell in 0..GRID_CELLS {
            let Some(position) = Position::from_index(cell as u16) else {
                continue;
            };
            let Some(creature) = Creature::from_tile(position, layer[cell]) else {
                continue;
            };
            // Later Chips stay on the layer as plain tiles
            if creature.is_chip() && chip_found {
                continue;
            }
            chip_found |= creature.is_chip();
            creatures.push(creature);
            let under = background[cell];
            layer[cell] = if under.is_creature() { Tile::Floor } else { under };
        }
        match creatures.iter().position(Creature::is_chip) {
            Some(i) => creatures.swap(0, i),
            None => creatures.insert(0, Creature::new(Position::ORIGIN, CreatureId::Chip, Direction::Down)),
        }
        if creatures.len() > i16::MAX as usize {
            return Err(LevelError::TooManyCreatures(creatures.len()));
        }

        let rff = if desc.rff.is_cardinal() { desc.rff } else { Direction::Up };
        let rng = LynxRng::new(desc.rng_seed, desc.prng1, desc.prng2);
        let mut board = Board::new(layer, rng, rff, desc.step);
        board.inventory.chips_left = desc.chips_required;

        board.teleports = if desc.teleports.is_empty() {
            cells_matching(board.layer(), |t| t == Tile::Teleport)
        } else {
            desc.teleports.clone()
        };
        board.toggle_doors = if desc.toggle_doors.is_empty() {
            cells_matching(board.layer(), |t| matches!(t, Tile::ToggleOpen | Tile::ToggleClosed))
        } else {
            desc.toggle_doors.clone()
        };
        for position in cells_matching(board.layer(), |t| t == Tile::ButtonGreen) {
            board.buttons.insert(position, Button::Green);
        }
        for position in cells_matching(board.layer(), |t| t == Tile::ButtonBlue) {
            board.buttons.insert(position, Button::Blue);
        }
        for c in &desc.clone_connections {
            board.buttons.insert(c.button, Button::Red { clone_machine: c.target });
        }
        for c in &desc.trap_connections {
            board.buttons.insert(c.button, Button::Brown { trap: c.target });
        }

        let start_time = if desc.time_limit == 0 {
            UNTIMED
        } else {
            desc.time_limit as i32 * TIMER_UNITS_PER_SECOND + TIMER_START_FRACTION
        };

        debug!(
            number = desc.number,
            title = %desc.title,
            creatures = creatures.len(),
            teleports = board.teleports.len(),
            buttons = board.buttons.len(),
            "level built"
        );

        let creatures = CreatureList::new(creatures, &board);
        Ok(Self {
            board,
            creatures,
            last_move_forced: false,
            level_won: false,
            start_time,
            number: desc.number,
            title: desc.title.clone(),
            password: desc.password.clone(),
            hint: desc.hint.clone(),
        })
    }

    /// Parse a JSON description and build the level.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Self::new(&LevelDescription::from_json(json)?)
    }

    // =========================================================================
    // SAVESTATES
    // =========================================================================

    /// Snapshot the full simulation state as an uncompressed savestate.
    pub fn save(&self) -> Vec<u8> {
        savestate::write(&self.board, &self.creatures, self.last_move_forced)
    }

    /// Restore a savestate of either version.
    ///
    /// The buffer is decoded and validated completely before anything is
    /// applied; on error the level is unchanged. Wiring (buttons, teleports,
    /// toggle doors) and metadata are not part of a savestate.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), SavestateError> {
        let snapshot = savestate::read(bytes)?;
        debug!(
            tick = snapshot.tick,
            creatures = snapshot.creatures.len(),
            compressed = snapshot.compressed,
            "savestate loaded"
        );

        self.board.layer = snapshot.layer;
        self.board.tick = snapshot.tick;
        self.board.inventory = snapshot.inventory;
        self.board.rng = snapshot.rng;
        self.board.rff = snapshot.rff;
        self.creatures.replace(snapshot.creatures, &self.board);
        self.last_move_forced = snapshot.last_move_forced;
        self.level_won = false;
        Ok(())
    }

    /// SHA-256 of the uncompressed savestate.
    pub fn state_hash(&self) -> StateHash {
        hash_savestate(&self.save())
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Ticks elapsed.
    pub fn tick_number(&self) -> i32 {
        self.board.tick
    }

    /// Chip.
    pub fn chip(&self) -> &Creature {
        self.creatures.chip()
    }

    /// Chip's cell.
    pub fn chip_position(&self) -> Position {
        self.creatures.chip().position
    }

    /// All creatures, Chip first.
    pub fn creatures(&self) -> &CreatureList {
        &self.creatures
    }

    /// Board state.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Tile at a position.
    pub fn tile(&self, position: Position) -> Tile {
        self.board.tile(position)
    }

    /// Keys, boots and chips left.
    pub fn inventory(&self) -> &Inventory {
        &self.board.inventory
    }

    /// Chips still needed.
    pub fn chips_left(&self) -> i16 {
        self.board.inventory.chips_left
    }

    /// Key counts: blue, red, green, yellow.
    pub fn keys(&self) -> [i16; 4] {
        self.board.inventory.keys
    }

    /// Boots: water, fire, ice, slide.
    pub fn boots(&self) -> [u8; 4] {
        self.board.inventory.boots
    }

    /// Random generators.
    pub fn rng(&self) -> &LynxRng {
        &self.board.rng
    }

    /// Random-force-floor cursor.
    pub fn rff(&self) -> Direction {
        self.board.rff
    }

    /// Step parity.
    pub fn step(&self) -> Step {
        self.board.step
    }

    /// Whether the last tick ended with Chip leaving through the exit.
    pub fn level_won(&self) -> bool {
        self.level_won
    }

    /// Whether Chip's most recent move was terrain-forced.
    ///
    /// Bookkeeping only: stored in and restored from savestates, with no
    /// effect on later ticks.
    pub fn last_move_forced(&self) -> bool {
        self.last_move_forced
    }

    /// Level number.
    pub fn number(&self) -> u16 {
        self.number
    }

    /// Title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Password.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Hint text.
    pub fn hint(&self) -> &str {
        &self.hint
    }

    // =========================================================================
    // TIMERS
    // =========================================================================

    /// Whether the level has no time limit.
    pub fn is_untimed(&self) -> bool {
        self.start_time < 0
    }

    /// Remaining time in hundredths of a second, or [`UNTIMED`].
    pub fn timer(&self) -> i32 {
        if self.is_untimed() || self.board.tick == 0 {
            self.start_time
        } else {
            self.start_time - self.board.tick * TIMER_UNITS_PER_TICK
        }
    }

    /// Make [`Level::timer`] read `remaining` on the current tick.
    pub fn set_timer(&mut self, remaining: i32) {
        self.start_time = remaining + self.board.tick * TIMER_UNITS_PER_TICK;
    }

    /// Count-down clock shown for untimed levels.
    pub fn tchip_time(&self) -> i32 {
        TCHIP_START - self.board.tick * TIMER_UNITS_PER_TICK
    }
}

// =============================================================================
// TESTS
// =============================================================================
