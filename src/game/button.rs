//! Buttons
//!
//! Four button colours, each wired to a level-global or positional effect:
//!
//! - green flips every toggle door,
//! - red clones whatever rests on its clone machine,
//! - brown springs the creature sitting in its trap,
//! - blue turns every live tank around.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::position::Position;
use crate::game::board::Board;
use crate::game::creature_list::CreatureList;
use crate::game::tile::Tile;

/// A button and its wiring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Button {
    /// Toggles all toggle doors.
    Green,
    /// Clones from the connected clone machine.
    Red {
        /// Clone machine position.
        clone_machine: Position,
    },
    /// Releases the connected trap.
    Brown {
        /// Trap position.
        trap: Position,
    },
    /// Reverses all tanks.
    Blue,
}

impl Button {
    /// Layer tile this button is drawn as.
    pub fn tile(self) -> Tile {
        match self {
            Button::Green => Tile::ButtonGreen,
            Button::Red { .. } => Tile::ButtonRed,
            Button::Brown { .. } => Tile::ButtonBrown,
            Button::Blue => Tile::ButtonBlue,
        }
    }
}

/// Press the button registered at `position`.
///
/// Returns `false` when no button is registered there.
pub fn press_button(list: &mut CreatureList, board: &mut Board, position: Position) -> bool {
    let Some(button) = board.buttons.get(&position).copied() else {
        return false;
    };
    trace!(tick = board.tick, %position, ?button, "button pressed");

    match button {
        Button::Green => toggle_doors(board),
        Button::Red { clone_machine } => {
            list.clone_from(clone_machine, board);
        }
        Button::Brown { trap } => list.spring_trap(trap, board),
        Button::Blue => list.turn_tanks(),
    }
    true
}

/// Flip every toggle door between open and closed.
pub fn toggle_doors(board: &mut Board) {
    for i in 0..board.toggle_doors.len() {
        let door = board.toggle_doors[i];
        match board.tile(door) {
            Tile::ToggleOpen => board.set_tile(door, Tile::ToggleClosed),
            Tile::ToggleClosed => board.set_tile(door, Tile::ToggleOpen),
            _ => {}
        }
    }
}
