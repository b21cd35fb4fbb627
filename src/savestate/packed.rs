//! Packed Creature Records
//!
//! Each creature is stored as one big-endian `u32`. Fields from the least
//! significant bit up:
//!
//! | bits  | field            |
//! |-------|------------------|
//! | 0-9   | position index   |
//! | 10-13 | kind code        |
//! | 14-17 | direction code   |
//! | 18-21 | time traveled    |
//! | 22-25 | animation timer  |
//! | 26    | sliding          |
//! | 27    | override token   |
//! | 28    | teleport flag    |
//! | 29-31 | reserved, zero   |

use crate::core::direction::Direction;
use crate::core::position::Position;
use crate::game::creature::{Creature, MAX_ANIMATION, TILE_DISTANCE};
use crate::game::creature_id::CreatureId;

use super::error::{Result, SavestateError};

const POSITION_SHIFT: u32 = 0;
const POSITION_MASK: u32 = 0x3FF;
const KIND_SHIFT: u32 = 10;
const DIRECTION_SHIFT: u32 = 14;
const TIME_SHIFT: u32 = 18;
const ANIMATION_SHIFT: u32 = 22;
const NIBBLE: u32 = 0xF;
const SLIDING_BIT: u32 = 1 << 26;
const OVERRIDE_BIT: u32 = 1 << 27;
const TELEPORT_BIT: u32 = 1 << 28;
const RESERVED_MASK: u32 = !((1 << 29) - 1);

/// The saved fields of one creature.
///
/// Pending `t`/`f` directions and editor-injected moves are not part of the
/// record; they are recomputed every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackedCreature {
    /// Cell index.
    pub position: Position,
    /// Kind.
    pub kind: CreatureId,
    /// Facing.
    pub direction: Direction,
    /// Movement progress.
    pub time_traveled: u8,
    /// Animation frames left.
    pub animation_timer: u8,
    /// Current move is terrain-forced.
    pub sliding: bool,
    /// Force-floor override token.
    pub override_token: bool,
    /// Teleport resolved for this arrival.
    pub teleport_flag: bool,
}

impl PackedCreature {
    /// Capture a creature.
    pub fn from_creature(creature: &Creature) -> Self {
        Self {
            position: creature.position,
            kind: creature.kind,
            direction: creature.direction,
            time_traveled: creature.time_traveled,
            animation_timer: creature.animation_timer,
            sliding: creature.sliding,
            override_token: creature.override_token,
            teleport_flag: creature.teleport_flag,
        }
    }

    /// Rebuild a resting creature with these fields.
    pub fn to_creature(self) -> Creature {
        let mut creature = Creature::new(self.position, self.kind, self.direction);
        creature.time_traveled = self.time_traveled;
        creature.animation_timer = self.animation_timer;
        creature.sliding |= self.sliding;
        creature.override_token = self.override_token;
        creature.teleport_flag = self.teleport_flag;
        creature
    }

    /// Pack into the record word.
    pub fn pack(self) -> u32 {
        let mut word = (self.position.index() as u32 & POSITION_MASK) << POSITION_SHIFT;
        word |= (self.kind.code() as u32 & NIBBLE) << KIND_SHIFT;
        word |= (self.direction.code() as u32 & NIBBLE) << DIRECTION_SHIFT;
        word |= (self.time_traveled as u32 & NIBBLE) << TIME_SHIFT;
        word |= (self.animation_timer as u32 & NIBBLE) << ANIMATION_SHIFT;
        if self.sliding {
            word |= SLIDING_BIT;
        }
        if self.override_token {
            word |= OVERRIDE_BIT;
        }
        if self.teleport_flag {
            word |= TELEPORT_BIT;
        }
        word
    }

    /// Unpack and range-check a record word.
    ///
    /// `record` is only used to label errors.
    pub fn unpack(word: u32, record: usize) -> Result<Self> {
        if word & RESERVED_MASK != 0 {
            return Err(SavestateError::FieldOutOfRange {
                field: "creature reserved bits",
                value: (word >> 29) as i64,
            });
        }
        let nibble = |shift: u32| ((word >> shift) & NIBBLE) as u8;

        let index = ((word >> POSITION_SHIFT) & POSITION_MASK) as u16;
        let position = Position::from_index(index).ok_or(SavestateError::FieldOutOfRange {
            field: "creature position",
            value: index as i64,
        })?;

        let kind_code = nibble(KIND_SHIFT);
        let kind = CreatureId::from_code(kind_code)
            .filter(|&k| k != CreatureId::IceBlock)
            .ok_or(SavestateError::InvalidCreatureKind { record, code: kind_code })?;

        let direction_code = nibble(DIRECTION_SHIFT);
        let direction = Direction::from_code(direction_code)
            .filter(|d| d.code() <= Direction::None.code())
            .ok_or(SavestateError::InvalidDirection {
                field: "creature direction",
                code: direction_code,
            })?;

        let time_traveled = nibble(TIME_SHIFT);
        if time_traveled > TILE_DISTANCE {
            return Err(SavestateError::FieldOutOfRange {
                field: "time traveled",
                value: time_traveled as i64,
            });
        }
        let animation_timer = nibble(ANIMATION_SHIFT);
        if animation_timer > MAX_ANIMATION {
            return Err(SavestateError::FieldOutOfRange {
                field: "animation timer",
                value: animation_timer as i64,
            });
        }

        Ok(Self {
            position,
            kind,
            direction,
            time_traveled,
            animation_timer,
            sliding: word & SLIDING_BIT != 0,
            override_token: word & OVERRIDE_BIT != 0,
            teleport_flag: word & TELEPORT_BIT != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> PackedCreature {
        PackedCreature {
            position: Position::from_index(0x2AB).unwrap(),
            kind: CreatureId::Walker,
            direction: Direction::Left,
            time_traveled: 6,
            animation_timer: 0,
            sliding: true,
            override_token: false,
            teleport_flag: true,
        }
    }

    #[test]
    fn test_bit_layout() {
        let word = sample().pack();
        assert_eq!(word & 0x3FF, 0x2AB);
        assert_eq!((word >> 10) & 0xF, CreatureId::Walker.code() as u32);
        assert_eq!((word >> 14) & 0xF, Direction::Left.code() as u32);
        assert_eq!((word >> 18) & 0xF, 6);
        assert_eq!((word >> 22) & 0xF, 0);
        assert_ne!(word & (1 << 26), 0);
        assert_eq!(word & (1 << 27), 0);
        assert_ne!(word & (1 << 28), 0);
        assert_eq!(word >> 29, 0);
    }

    #[test]
    fn test_unpack_rejects_bad_fields() {
        let word = sample().pack();

        assert!(matches!(
            PackedCreature::unpack(word | (1 << 30), 0),
            Err(SavestateError::FieldOutOfRange { field: "creature reserved bits", .. })
        ));

        let ice_block = (word & !(0xF << 10)) | ((CreatureId::IceBlock.code() as u32) << 10);
        assert_eq!(
            PackedCreature::unpack(ice_block, 3),
            Err(SavestateError::InvalidCreatureKind { record: 3, code: 12 })
        );

        let walker_turn = (word & !(0xF << 14)) | (9 << 14);
        assert!(matches!(
            PackedCreature::unpack(walker_turn, 0),
            Err(SavestateError::InvalidDirection { code: 9, .. })
        ));

        let overtime = (word & !(0xF << 18)) | (9 << 18);
        assert!(matches!(
            PackedCreature::unpack(overtime, 0),
            Err(SavestateError::FieldOutOfRange { field: "time traveled", value: 9 })
        ));

        let long_animation = word | (13 << 22);
        assert!(matches!(
            PackedCreature::unpack(long_animation, 0),
            Err(SavestateError::FieldOutOfRange { field: "animation timer", value: 13 })
        ));
    }

    #[test]
    fn test_legacy_kinds_collapse_on_unpack() {
        let mut stationary = sample();
        stationary.kind = CreatureId::TankStationary;
        let creature = PackedCreature::unpack(stationary.pack(), 0).unwrap().to_creature();
        assert_eq!(creature.kind, CreatureId::Tank);

        let mut sliding_chip = sample();
        sliding_chip.kind = CreatureId::ChipSliding;
        sliding_chip.sliding = false;
        let creature = PackedCreature::unpack(sliding_chip.pack(), 0).unwrap().to_creature();
        assert_eq!(creature.kind, CreatureId::Chip);
        assert!(creature.sliding);
    }

    proptest! {
        #[test]
        fn prop_valid_records_survive_pack(
            index in 0u16..1024,
            kind in 0u8..12,
            dir in 0u8..9,
            time in 0u8..=8,
            anim in 0u8..=12,
            flags in 0u8..8,
        ) {
            let packed = PackedCreature {
                position: Position::from_index(index).unwrap(),
                kind: CreatureId::from_code(kind).unwrap(),
                direction: Direction::from_code(dir).unwrap(),
                time_traveled: time,
                animation_timer: anim,
                sliding: flags & 1 != 0,
                override_token: flags & 2 != 0,
                teleport_flag: flags & 4 != 0,
            };
            prop_assert_eq!(PackedCreature::unpack(packed.pack(), 0).unwrap(), packed);
        }
    }
}
