//! Step Parity
//!
//! A level's step value shifts the tick phase used by Teeth and by the
//! death-animation length.

use serde::{Deserialize, Serialize};

/// Step offset, ordinals 0..8.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Step {
    /// Even step, no offset.
    #[default]
    Even = 0,
    /// Even step plus one.
    EvenPlus1 = 1,
    /// Even step plus two.
    EvenPlus2 = 2,
    /// Even step plus three.
    EvenPlus3 = 3,
    /// Odd step.
    Odd = 4,
    /// Odd step plus one.
    OddPlus1 = 5,
    /// Odd step plus two.
    OddPlus2 = 6,
    /// Odd step plus three.
    OddPlus3 = 7,
}

impl Step {
    /// Decode an ordinal.
    pub const fn from_ordinal(n: u8) -> Option<Self> {
        Some(match n {
            0 => Step::Even,
            1 => Step::EvenPlus1,
            2 => Step::EvenPlus2,
            3 => Step::EvenPlus3,
            4 => Step::Odd,
            5 => Step::OddPlus1,
            6 => Step::OddPlus2,
            7 => Step::OddPlus3,
            _ => return None,
        })
    }

    /// Ordinal.
    #[inline]
    pub const fn ordinal(self) -> i32 {
        self as i32
    }

    /// Whether Teeth may start a move on `tick`.
    ///
    /// Teeth move during four ticks out of every eight.
    #[inline]
    pub const fn is_teeth_step(self, tick: i32) -> bool {
        ((tick - 1 + self.ordinal()) & 4) == 0
    }

    /// Death animation length for a creature killed on `tick`.
    #[inline]
    pub const fn death_timer(self, tick: i32) -> u8 {
        if (tick + self.ordinal()) & 1 == 0 {
            11
        } else {
            12
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teeth_step_window() {
        let even: Vec<bool> = (1..=8).map(|t| Step::Even.is_teeth_step(t)).collect();
        assert_eq!(even, vec![true, true, true, true, false, false, false, false]);

        // An odd step shifts the window by four ticks
        let odd: Vec<bool> = (1..=8).map(|t| Step::Odd.is_teeth_step(t)).collect();
        assert_eq!(odd, vec![false, false, false, false, true, true, true, true]);
    }

    #[test]
    fn test_death_timer_parity() {
        assert_eq!(Step::Even.death_timer(2), 11);
        assert_eq!(Step::Even.death_timer(3), 12);
        assert_eq!(Step::EvenPlus1.death_timer(2), 12);
    }

    #[test]
    fn test_ordinals() {
        for n in 0..8 {
            assert_eq!(Step::from_ordinal(n).map(Step::ordinal), Some(n as i32));
        }
        assert_eq!(Step::from_ordinal(8), None);
    }
}
