//! Savestate Writer

use crate::game::board::Board;
use crate::game::creature_list::CreatureList;

use super::packed::PackedCreature;
use super::{CLAIM_BYTES, RULESET_LYNX, VERSION_UNCOMPRESSED};

/// Append-only big-endian byte sink.
#[derive(Debug, Default)]
pub struct SavestateWriter {
    buf: Vec<u8>,
}

impl SavestateWriter {
    /// Empty writer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity) }
    }

    /// Write a byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Write a bool as 0 or 1.
    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(value as u8);
    }

    /// Write a big-endian i16.
    #[inline]
    pub fn write_i16(&mut self, value: i16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Write a big-endian i32.
    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Write a big-endian u32.
    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Write raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Nothing written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finish and return the buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Serialize a level's state as an uncompressed (version 6) savestate.
///
/// The creature count is a 16-bit field; callers keep the list below
/// `i16::MAX` entries.
///
/// The claim layer is written as a 1024-bit field: 128 bytes, cell `n` in
/// bit `n % 8` of byte `n / 8`. Writers that emit one byte per cell
/// produce a different buffer; the reader accepts only the packed form.
pub fn write(board: &Board, creatures: &CreatureList, last_move_forced: bool) -> Vec<u8> {
    let mut w = SavestateWriter::with_capacity(1200 + creatures.len() * 4);

    w.write_u8(VERSION_UNCOMPRESSED);
    w.write_u8(RULESET_LYNX);
    for &tile in board.layer().iter() {
        w.write_u8(tile.byte());
    }

    w.write_i32(board.tick);
    let inventory = &board.inventory;
    w.write_i16(inventory.chips_left);
    for &key in &inventory.keys {
        w.write_i16(key);
    }
    w.write_bytes(&inventory.boots);

    let (prng1, prng2) = board.rng.registers();
    w.write_i32(board.rng.current() as i32);
    w.write_i32(prng1 as i32);
    w.write_i32(prng2 as i32);
    w.write_u8(board.rff.code());

    w.write_i16(creatures.len() as i16);
    for creature in creatures.as_slice() {
        w.write_u32(PackedCreature::from_creature(creature).pack());
    }

    let mut bitmap = [0u8; CLAIM_BYTES];
    for (cell, claimed) in creatures.claims().iter().enumerate() {
        if *claimed {
            bitmap[cell / 8] |= 1 << (cell % 8);
        }
    }
    w.write_bytes(&bitmap);

    w.write_bool(last_move_forced);
    w.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::direction::Direction;
    use crate::core::position::{Position, GRID_CELLS};
    use crate::core::rng::LynxRng;
    use crate::game::creature::Creature;
    use crate::game::creature_id::CreatureId;
    use crate::game::step::Step;
    use crate::game::tile::Tile;

    #[test]
    fn test_claims_written_as_bitmap() {
        let board = Board::new(Box::new([Tile::Floor; GRID_CELLS]), LynxRng::new(0, 0, 0), Direction::Up, Step::Even);
        let at = |cell: u16| Position::from_index(cell).unwrap();
        let creatures = CreatureList::new(
            vec![
                Creature::new(at(0), CreatureId::Chip, Direction::Down),
                Creature::new(at(9), CreatureId::Bug, Direction::Up),
                Creature::new(at(1023), CreatureId::Ball, Direction::Left),
            ],
            &board,
        );

        let bytes = write(&board, &creatures, false);
        let bitmap = &bytes[bytes.len() - 1 - CLAIM_BYTES..bytes.len() - 1];
        assert_eq!(bitmap.len(), 128);
        assert_eq!(bitmap[1], 0b0000_0010);
        assert_eq!(bitmap[127], 0b1000_0000);
        assert_eq!(bitmap.iter().filter(|&&b| b != 0).count(), 2);
    }

    #[test]
    fn test_writer_is_big_endian() {
        let mut w = SavestateWriter::default();
        w.write_i16(-2);
        w.write_i32(0x01020304);
        w.write_u32(0xA0B0C0D0);
        w.write_bool(true);
        assert_eq!(
            w.into_bytes(),
            vec![0xFF, 0xFE, 1, 2, 3, 4, 0xA0, 0xB0, 0xC0, 0xD0, 1]
        );
    }
}
