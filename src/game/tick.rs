//! Level Tick
//!
//! The core game loop. It must be 100% deterministic: the same level and
//! the same inputs always produce byte-identical savestates.
//!
//! One tick runs, in order:
//!
//! 1. advance the tick counter, clear the win flag
//! 2. monsters select moves
//! 3. Chip selects a move from the input
//! 4. monsters move
//! 5. Chip moves
//! 6. teleports resolve
//! 7. the exit check
//!
//! Collision outcomes depend on this interleaving.

use crate::core::direction::Direction;
use crate::core::hash::{StateHash, StateHasher};
use crate::game::creature_list::CHIP_INDEX;
use crate::game::level::Level;
use crate::game::tile::Tile;

/// Result of a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Chip left through the exit this tick.
    pub completed: bool,
    /// Chip just started a forced move; the caller should run another tick.
    pub must_repeat: bool,
}

/// Result of a replay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replay {
    /// Hash of the move list.
    pub moves_hash: StateHash,
    /// Savestate hash after each tick played.
    pub hashes: Vec<StateHash>,
    /// Whether the level was completed (play stops there).
    pub completed: bool,
}

/// Run one simulation tick with Chip's input for the tick.
///
/// `input` may be a cardinal, a diagonal or `Direction::None`.
pub fn tick(level: &mut Level, input: Direction) -> TickOutcome {
    let board = &mut level.board;
    let creatures = &mut level.creatures;

    board.tick += 1;
    level.level_won = false;

    creatures.initialise(board);
    creatures.tick(board);
    creatures.select_chip_move(input, board);
    creatures.tick(board);
    let started = creatures.move_chip(board);
    // Recorded for savestates only
    if started {
        level.last_move_forced = creatures.chip().sliding;
    }
    creatures.tick(board);
    creatures.finalise();

    let chip = creatures.chip();
    let exiting = chip.is_alive()
        && chip.time_traveled == 0
        && chip.animation_timer == 0
        && board.tile(chip.position) == Tile::Exit;
    if exiting {
        let position = chip.position;
        // The second kill cancels the death animation the first one starts
        creatures.kill(CHIP_INDEX, board);
        creatures.kill(CHIP_INDEX, board);
        board.set_tile(position, Tile::ExitedChip);
        level.level_won = true;
    }

    TickOutcome {
        completed: level.level_won,
        must_repeat: started && level.creatures.chip().sliding,
    }
}

/// Hash a move list.
pub fn hash_moves(moves: &[Direction]) -> StateHash {
    let mut hasher = StateHasher::for_moves();
    hasher.update_u32(moves.len() as u32);
    for direction in moves {
        hasher.update_u8(direction.code());
    }
    hasher.finalize()
}

/// Play a move list, one tick per move, stopping at completion.
pub fn replay(level: &mut Level, moves: &[Direction]) -> Replay {
    let mut hashes = Vec::with_capacity(moves.len());
    let mut completed = false;

    for &input in moves {
        let outcome = tick(level, input);
        hashes.push(level.state_hash());
        if outcome.completed {
            completed = true;
            break;
        }
    }

    Replay {
        moves_hash: hash_moves(moves),
        hashes,
        completed,
    }
}

impl Level {
    /// Run one tick. See [`tick`].
    pub fn tick(&mut self, input: Direction) -> TickOutcome {
        tick(self, input)
    }

    /// Play a move list. See [`replay`].
    pub fn replay(&mut self, moves: &[Direction]) -> Replay {
        replay(self, moves)
    }
}
