//! Cheats and Editor Operations
//!
//! Direct state edits for tools: never called from the tick. Each one
//! leaves the claim layer consistent with the creature list.

use tracing::debug;

use crate::core::direction::Direction;
use crate::core::position::Position;
use crate::game::button::{self, Button};
use crate::game::creature_id::CreatureId;
use crate::game::creature_list::CHIP_INDEX;
use crate::game::level::Level;
use crate::game::tile::Tile;

impl Level {
    /// Press the button registered at `position`, as if something had
    /// stepped on it. Returns `false` when there is no button there.
    pub fn press_button(&mut self, position: Position) -> bool {
        self.creatures.initialise(&self.board);
        let pressed = button::press_button(&mut self.creatures, &mut self.board, position);
        self.creatures.finalise();
        pressed
    }

    /// Clone from the clone machine at `machine`.
    pub fn clone_at(&mut self, machine: Position) -> bool {
        self.creatures.initialise(&self.board);
        let cloned = self.creatures.clone_from(machine, &mut self.board);
        self.creatures.finalise();
        cloned
    }

    /// Point creature `index` in `direction`.
    ///
    /// Blobs and walkers also get it as a one-shot move for their next
    /// selection, which still consumes the random draw it replaces.
    pub fn set_creature_direction(&mut self, index: usize, direction: Direction) -> bool {
        let Some(creature) = self.creatures.get_mut(index) else {
            return false;
        };
        if matches!(creature.kind, CreatureId::Blob | CreatureId::Walker) {
            creature.next_move_cheat = Some(direction);
        }
        creature.direction = direction;
        true
    }

    /// Kill creature `index`. Killing a dead creature clears its animation.
    pub fn kill_creature(&mut self, index: usize) -> bool {
        if index >= self.creatures.len() {
            return false;
        }
        self.creatures.initialise(&self.board);
        self.creatures.kill(index, &self.board);
        self.creatures.finalise();
        true
    }

    /// Bring Chip back to life where it stands.
    pub fn revive_chip(&mut self) {
        if let Some(chip) = self.creatures.get_mut(CHIP_INDEX) {
            chip.kind = CreatureId::Chip;
            chip.animation_timer = 0;
        }
    }

    /// Overwrite the key counts (blue, red, green, yellow).
    pub fn set_keys(&mut self, keys: [i16; 4]) {
        self.board.inventory.keys = keys;
    }

    /// Overwrite the boots (water, fire, ice, slide).
    pub fn set_boots(&mut self, boots: [u8; 4]) {
        self.board.inventory.boots = boots;
    }

    /// Overwrite the chips-left counter.
    pub fn set_chips_left(&mut self, chips_left: i16) {
        self.board.inventory.chips_left = chips_left;
    }

    /// Overwrite the LCG value.
    pub fn set_rng(&mut self, value: u32) {
        self.board.rng.set_current(value);
    }

    /// Clear the tile at `position` to floor.
    pub fn pop_tile(&mut self, position: Position) {
        self.board.set_tile(position, Tile::Floor);
        self.creatures.refresh_claims(&self.board);
    }

    /// Place `tile` at `position`.
    ///
    /// Green and blue buttons need no wiring and are registered right
    /// away; red and brown buttons stay inert until connected.
    pub fn insert_tile(&mut self, position: Position, tile: Tile) {
        self.board.set_tile(position, tile);
        let wired = match tile {
            Tile::ButtonGreen => Some(Button::Green),
            Tile::ButtonBlue => Some(Button::Blue),
            _ => None,
        };
        if let Some(button) = wired {
            debug!(%position, ?button, "button registered by editor");
            self.board.buttons.insert(position, button);
        }
        self.creatures.refresh_claims(&self.board);
    }
}
