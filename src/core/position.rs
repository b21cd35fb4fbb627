//! Grid Addressing
//!
//! A `Position` names one cell of the 32x32 world. It is always valid:
//! anything that could step off the grid returns `Option<Position>` instead.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::direction::Direction;

/// Width (and height) of the world in cells.
pub const GRID_WIDTH: u16 = 32;

/// Number of cells in the world.
pub const GRID_CELLS: usize = 1024;

/// A cell of the 32x32 grid.
///
/// Invariant: `index == y * 32 + x` with `x, y` in `[0, 32)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Position {
    index: u16,
}

impl Position {
    /// Top-left corner, where a synthesized Chip is placed.
    pub const ORIGIN: Position = Position { index: 0 };

    /// Create from a cell index, `None` when outside `0..1024`.
    #[inline]
    pub const fn from_index(index: u16) -> Option<Self> {
        if (index as usize) < GRID_CELLS {
            Some(Self { index })
        } else {
            None
        }
    }

    /// Create from coordinates, `None` when either is outside `0..32`.
    #[inline]
    pub fn new(x: i32, y: i32) -> Option<Self> {
        let width = GRID_WIDTH as i32;
        if (0..width).contains(&x) && (0..width).contains(&y) {
            Some(Self { index: (y * width + x) as u16 })
        } else {
            None
        }
    }

    /// Cell index in `0..1024`.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Column.
    #[inline]
    pub const fn x(self) -> i32 {
        (self.index % GRID_WIDTH) as i32
    }

    /// Row.
    #[inline]
    pub const fn y(self) -> i32 {
        (self.index / GRID_WIDTH) as i32
    }

    /// The neighbouring cell in a cardinal direction.
    ///
    /// Returns `None` for non-cardinal directions and when the step would
    /// leave the grid.
    #[inline]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.delta()?;
        Self::new(self.x() + dx, self.y() + dy)
    }

    /// Directions that close the Manhattan distance to `target`.
    ///
    /// The axis with the larger distance comes first; ties prefer the
    /// vertical axis. Axes with zero distance are omitted.
    pub fn seek(self, target: Position) -> SmallVec<[Direction; 2]> {
        let dy = self.y() - target.y();
        let dx = self.x() - target.x();

        let vertical = match dy.signum() {
            1 => Some(Direction::Up),
            -1 => Some(Direction::Down),
            _ => None,
        };
        let horizontal = match dx.signum() {
            1 => Some(Direction::Left),
            -1 => Some(Direction::Right),
            _ => None,
        };

        let ordered = if dy.abs() >= dx.abs() {
            [vertical, horizontal]
        } else {
            [horizontal, vertical]
        };
        ordered.into_iter().flatten().collect()
    }
}

impl TryFrom<u16> for Position {
    type Error = String;

    fn try_from(index: u16) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or_else(|| format!("cell index {index} is outside the grid"))
    }
}

impl From<Position> for u16 {
    fn from(position: Position) -> u16 {
        position.index
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x(), self.y())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_index_and_coordinates_agree() {
        let p = Position::new(5, 3).unwrap();
        assert_eq!(p.index(), 3 * 32 + 5);
        assert_eq!((p.x(), p.y()), (5, 3));
        assert_eq!(Position::from_index(101), Some(p));
    }

    #[test]
    fn test_out_of_range() {
        assert!(Position::new(32, 0).is_none());
        assert!(Position::new(0, -1).is_none());
        assert!(Position::from_index(1024).is_none());
    }

    #[test]
    fn test_step_edges() {
        let corner = Position::ORIGIN;
        assert_eq!(corner.step(Direction::Up), None);
        assert_eq!(corner.step(Direction::Left), None);
        assert_eq!(corner.step(Direction::Right).map(Position::index), Some(1));
        assert_eq!(corner.step(Direction::Down).map(Position::index), Some(32));

        // Right edge must not wrap onto the next row
        let edge = Position::new(31, 4).unwrap();
        assert_eq!(edge.step(Direction::Right), None);

        // Diagonals and pseudo-directions never step
        assert_eq!(edge.step(Direction::DownLeft), None);
        assert_eq!(edge.step(Direction::None), None);
    }

    #[test]
    fn test_seek_prefers_longer_axis() {
        let from = Position::new(10, 10).unwrap();

        let far_right = Position::new(15, 12).unwrap();
        assert_eq!(from.seek(far_right).as_slice(), &[Direction::Right, Direction::Down]);

        let far_up = Position::new(9, 2).unwrap();
        assert_eq!(from.seek(far_up).as_slice(), &[Direction::Up, Direction::Left]);

        // Ties go vertical first
        let diagonal = Position::new(7, 13).unwrap();
        assert_eq!(from.seek(diagonal).as_slice(), &[Direction::Down, Direction::Left]);

        assert!(from.seek(from).is_empty());
    }

    proptest! {
        #[test]
        fn prop_step_roundtrip(index in 0u16..1024, d in 0u8..4) {
            let p = Position::from_index(index).unwrap();
            let dir = Direction::from_code(d).unwrap();
            if let Some(q) = p.step(dir) {
                prop_assert_eq!(q.step(dir.reverse()), Some(p));
                prop_assert_eq!((q.x() - p.x()).abs() + (q.y() - p.y()).abs(), 1);
            }
        }
    }
}
