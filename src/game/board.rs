//! Board State
//!
//! Everything a creature can read or mutate while it moves: the foreground
//! layer, Chip's inventory, the RNG, the random-force-floor cursor, the
//! tick counter and the static wiring (buttons, teleports, toggle doors).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::direction::Direction;
use crate::core::position::{Position, GRID_CELLS};
use crate::core::rng::LynxRng;
use crate::game::button::Button;
use crate::game::step::Step;
use crate::game::tile::Tile;

/// Boot slot for flippers.
pub const BOOT_WATER: usize = 0;
/// Boot slot for fire boots.
pub const BOOT_FIRE: usize = 1;
/// Boot slot for ice skates.
pub const BOOT_ICE: usize = 2;
/// Boot slot for suction boots.
pub const BOOT_SLIDE: usize = 3;

/// Chip's collected items.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Blue, red, green, yellow key counts.
    pub keys: [i16; 4],
    /// Water, fire, ice, slide boots (nonzero = held).
    pub boots: [u8; 4],
    /// Computer chips still required for the socket.
    pub chips_left: i16,
}

impl Inventory {
    /// Whether a boot slot is held.
    #[inline]
    pub fn has_boot(&self, slot: usize) -> bool {
        self.boots[slot] != 0
    }
}

/// Layer, inventory and level-global simulation state.
#[derive(Clone, Debug)]
pub struct Board {
    pub(crate) layer: Box<[Tile; GRID_CELLS]>,
    /// Chip's inventory.
    pub inventory: Inventory,
    /// Both random generators.
    pub rng: LynxRng,
    /// Next direction a random force floor will push.
    pub rff: Direction,
    /// Ticks elapsed since the level started.
    pub tick: i32,
    /// Step parity of the level.
    pub step: Step,
    /// Buttons keyed by their position.
    pub buttons: BTreeMap<Position, Button>,
    /// Teleports in reading order; creatures walk this list backwards.
    pub teleports: Vec<Position>,
    /// Toggle doors flipped by green buttons.
    pub toggle_doors: Vec<Position>,
}

impl Board {
    /// Create a board at tick 0.
    pub fn new(layer: Box<[Tile; GRID_CELLS]>, rng: LynxRng, rff: Direction, step: Step) -> Self {
        Self {
            layer,
            inventory: Inventory::default(),
            rng,
            rff,
            tick: 0,
            step,
            buttons: BTreeMap::new(),
            teleports: Vec::new(),
            toggle_doors: Vec::new(),
        }
    }

    /// Tile at a position.
    #[inline]
    pub fn tile(&self, position: Position) -> Tile {
        self.layer[position.index()]
    }

    /// Overwrite the tile at a position.
    #[inline]
    pub fn set_tile(&mut self, position: Position, tile: Tile) {
        self.layer[position.index()] = tile;
    }

    /// The whole foreground layer in index order.
    pub fn layer(&self) -> &[Tile; GRID_CELLS] {
        &self.layer
    }

    /// Return the random-force-floor direction and turn the cursor right.
    pub fn cycle_rff(&mut self) -> Direction {
        let prior = self.rff;
        self.rff = self.rff.right();
        prior
    }

    /// Direction terrain imposes on something moving `direction` over `tile`.
    ///
    /// Ice corners deflect two incoming directions each. Random force floors
    /// read the cursor and, when `advance` is set, cycle it.
    pub fn slide_direction(&mut self, direction: Direction, tile: Tile, advance: bool) -> Direction {
        use Direction::{Down, Left, Right, Up};

        if let Some(forced) = tile.force_direction() {
            return forced;
        }
        match (tile, direction) {
            (Tile::ForceRandom, _) if advance => self.cycle_rff(),
            (Tile::ForceRandom, _) => self.rff,
            (Tile::IceSlideSouthEast, Up) => Right,
            (Tile::IceSlideSouthEast, Left) => Down,
            (Tile::IceSlideNorthEast, Down) => Right,
            (Tile::IceSlideNorthEast, Left) => Up,
            (Tile::IceSlideNorthWest, Down) => Left,
            (Tile::IceSlideNorthWest, Right) => Up,
            (Tile::IceSlideSouthWest, Up) => Left,
            (Tile::IceSlideSouthWest, Right) => Down,
            _ => direction,
        }
    }

    /// Death animation length for a kill on the current tick.
    #[inline]
    pub fn death_timer(&self) -> u8 {
        self.step.death_timer(self.tick)
    }
}
