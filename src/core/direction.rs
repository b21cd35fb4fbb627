//! Direction Algebra
//!
//! Eight compass values plus three sentinels. `WalkerTurn` and `BlobTurn`
//! never describe a real heading: they sit in a creature's priority list
//! and are resolved against the RNG at the moment they are reached.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

/// A movement direction, with the 4-bit codes used by the savestate format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// North.
    Up = 0,
    /// West.
    Left = 1,
    /// South.
    Down = 2,
    /// East.
    Right = 3,
    /// North-west (player input only).
    UpLeft = 4,
    /// South-west (player input only).
    DownLeft = 5,
    /// South-east (player input only).
    DownRight = 6,
    /// North-east (player input only).
    UpRight = 7,
    /// No movement.
    #[default]
    None = 8,
    /// Walker pseudo-direction: turn right a PRNG-chosen number of times.
    WalkerTurn = 9,
    /// Blob pseudo-direction: pick a cardinal from the LCG.
    BlobTurn = 10,
}

/// The four cardinals in code order.
pub const CARDINALS: [Direction; 4] = [Direction::Up, Direction::Left, Direction::Down, Direction::Right];

/// Relative turns. Turning by one of these adds its code modulo 4.
pub mod turn {
    use super::Direction;

    /// Keep heading.
    pub const FORWARD: Direction = Direction::Up;
    /// Quarter turn anticlockwise.
    pub const LEFT: Direction = Direction::Left;
    /// Half turn.
    pub const AROUND: Direction = Direction::Down;
    /// Quarter turn clockwise.
    pub const RIGHT: Direction = Direction::Right;
}

impl Direction {
    /// Decode a 4-bit code, `None` for codes above 10.
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Direction::Up,
            1 => Direction::Left,
            2 => Direction::Down,
            3 => Direction::Right,
            4 => Direction::UpLeft,
            5 => Direction::DownLeft,
            6 => Direction::DownRight,
            7 => Direction::UpRight,
            8 => Direction::None,
            9 => Direction::WalkerTurn,
            10 => Direction::BlobTurn,
            _ => return None,
        })
    }

    /// 4-bit code.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Cardinal from the low two bits of `n`.
    #[inline]
    pub const fn cardinal(n: u8) -> Self {
        CARDINALS[(n & 3) as usize]
    }

    /// Up, left, down or right.
    #[inline]
    pub const fn is_cardinal(self) -> bool {
        (self as u8) < 4
    }

    /// One of the four diagonals.
    #[inline]
    pub const fn is_diagonal(self) -> bool {
        matches!(self, Direction::UpLeft | Direction::DownLeft | Direction::DownRight | Direction::UpRight)
    }

    /// Grid offset `(dx, dy)` for cardinals.
    #[inline]
    pub const fn delta(self) -> Option<(i32, i32)> {
        match self {
            Direction::Up => Some((0, -1)),
            Direction::Left => Some((-1, 0)),
            Direction::Down => Some((0, 1)),
            Direction::Right => Some((1, 0)),
            _ => None,
        }
    }

    /// Turn by a relative amount (see [`turn`]).
    ///
    /// Non-cardinal values on either side leave `self` unchanged.
    #[inline]
    pub const fn turn(self, by: Direction) -> Self {
        if !self.is_cardinal() || !by.is_cardinal() {
            return self;
        }
        Self::cardinal(self as u8 + by as u8)
    }

    /// Quarter turn anticlockwise.
    #[inline]
    pub const fn left(self) -> Self {
        self.turn(turn::LEFT)
    }

    /// Quarter turn clockwise.
    #[inline]
    pub const fn right(self) -> Self {
        self.turn(turn::RIGHT)
    }

    /// Half turn.
    #[inline]
    pub const fn reverse(self) -> Self {
        self.turn(turn::AROUND)
    }

    /// Apply a list of relative turns to this heading.
    pub fn turn_all(self, turns: &[Direction]) -> SmallVec<[Direction; 4]> {
        turns.iter().map(|&t| self.turn(t)).collect()
    }

    /// Split a diagonal into its vertical and horizontal parts.
    ///
    /// Any other value decomposes to itself.
    pub fn decompose(self) -> SmallVec<[Direction; 2]> {
        match self {
            Direction::UpLeft => smallvec![Direction::Up, Direction::Left],
            Direction::DownLeft => smallvec![Direction::Down, Direction::Left],
            Direction::DownRight => smallvec![Direction::Down, Direction::Right],
            Direction::UpRight => smallvec![Direction::Up, Direction::Right],
            other => smallvec![other],
        }
    }

    /// Whether `part` is one of the two components of this diagonal.
    pub fn has_component(self, part: Direction) -> bool {
        self.is_diagonal() && self.decompose().contains(&part)
    }

    /// Parse a move-string character (`u l d r -`).
    pub const fn from_move_char(c: char) -> Option<Self> {
        match c {
            'u' => Some(Direction::Up),
            'l' => Some(Direction::Left),
            'd' => Some(Direction::Down),
            'r' => Some(Direction::Right),
            '-' => Some(Direction::None),
            _ => None,
        }
    }

    /// Move-string character for cardinals and `None`.
    pub const fn to_move_char(self) -> Option<char> {
        match self {
            Direction::Up => Some('u'),
            Direction::Left => Some('l'),
            Direction::Down => Some('d'),
            Direction::Right => Some('r'),
            Direction::None => Some('-'),
            _ => None,
        }
    }
}

/// Parse a whole move string, rejecting unknown characters.
pub fn parse_moves(moves: &str) -> Result<Vec<Direction>, char> {
    moves
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| Direction::from_move_char(c).ok_or(c))
        .collect()
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Left => "left",
            Direction::Down => "down",
            Direction::Right => "right",
            Direction::UpLeft => "up-left",
            Direction::DownLeft => "down-left",
            Direction::DownRight => "down-right",
            Direction::UpRight => "up-right",
            Direction::None => "none",
            Direction::WalkerTurn => "walker-turn",
            Direction::BlobTurn => "blob-turn",
        };
        f.write_str(name)
    }
}

// =============================================================================
// TESTS
// =============================================================================
