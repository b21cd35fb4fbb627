//! Savestate Reader
//!
//! Decoding never touches a live level. [`read`] validates every field and
//! the claim layer into a [`Snapshot`]; the level swaps it in only once the
//! whole buffer has been accepted.

use crate::core::direction::Direction;
use crate::core::position::GRID_CELLS;
use crate::core::rng::LynxRng;
use crate::game::board::Inventory;
use crate::game::creature::Creature;
use crate::game::creature_id::CreatureId;
use crate::game::creature_list::compute_claims;
use crate::game::tile::Tile;

use super::error::{Result, SavestateError};
use super::packed::PackedCreature;
use super::{rle, Snapshot, CLAIM_BYTES, RULESET_LYNX, VERSION_COMPRESSED, VERSION_UNCOMPRESSED};

/// Bytes between the layer and the creature count.
const FIXED_FIELDS_LEN: usize = 4 + 2 + 4 * 2 + 4 + 3 * 4 + 1;

/// Big-endian cursor over a savestate buffer.
#[derive(Debug)]
pub struct SavestateReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> SavestateReader<'a> {
    /// Start at the beginning of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Current offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes not yet read.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    /// Take the next `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(SavestateError::Truncated {
                offset: self.offset,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.bytes[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a 0/1 byte.
    pub fn read_bool(&mut self, field: &'static str) -> Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(SavestateError::FieldOutOfRange { field, value: other as i64 }),
        }
    }

    /// Read a big-endian i16.
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian i32.
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian u32.
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Read the version/ruleset header. Returns whether the layer is compressed.
    fn read_header(&mut self) -> Result<bool> {
        let compressed = match self.read_u8()? {
            VERSION_UNCOMPRESSED => false,
            VERSION_COMPRESSED => true,
            other => return Err(SavestateError::UnsupportedVersion(other)),
        };
        let ruleset = self.read_u8()?;
        if ruleset != RULESET_LYNX {
            return Err(SavestateError::UnsupportedRuleset(ruleset));
        }
        Ok(compressed)
    }

    /// Read the raw layer bytes in either encoding.
    fn read_layer_bytes(&mut self, compressed: bool) -> Result<Box<[u8; GRID_CELLS]>> {
        if compressed {
            let (layer, used) = rle::decode(&self.bytes[self.offset..])?;
            self.offset += used;
            Ok(layer)
        } else {
            Ok(Box::new(self.read_array::<GRID_CELLS>()?))
        }
    }

    fn read_creature_count(&mut self) -> Result<usize> {
        let count = self.read_i16()?;
        match count {
            0 => Err(SavestateError::MissingChip),
            n if n < 0 => Err(SavestateError::FieldOutOfRange {
                field: "creature count",
                value: n as i64,
            }),
            n => Ok(n as usize),
        }
    }
}

/// Record 0 must hold Chip (alive or dead); later records must not.
fn check_chip_slot(record: usize, packed: &PackedCreature) -> Result<()> {
    let is_chip = packed.kind.is_chip();
    if record == 0 && !is_chip && packed.kind != CreatureId::Dead {
        return Err(SavestateError::MissingChip);
    }
    if record > 0 && is_chip {
        return Err(SavestateError::InvalidCreatureKind {
            record,
            code: packed.kind.code(),
        });
    }
    Ok(())
}

fn read_range_i32(reader: &mut SavestateReader<'_>, field: &'static str, max: i64) -> Result<i32> {
    let value = reader.read_i32()?;
    if value < 0 || value as i64 > max {
        return Err(SavestateError::FieldOutOfRange { field, value: value as i64 });
    }
    Ok(value)
}

/// Decode and validate a version 6 or 7 savestate.
pub fn read(bytes: &[u8]) -> Result<Snapshot> {
    let mut r = SavestateReader::new(bytes);
    let compressed = r.read_header()?;

    let raw_layer = r.read_layer_bytes(compressed)?;
    let mut layer = Box::new([Tile::Floor; GRID_CELLS]);
    for (cell, &byte) in raw_layer.iter().enumerate() {
        layer[cell] = Tile::from_byte(byte).ok_or(SavestateError::InvalidTile { cell, byte })?;
    }

    let tick = read_range_i32(&mut r, "tick", i32::MAX as i64)?;
    let mut inventory = Inventory {
        chips_left: r.read_i16()?,
        ..Inventory::default()
    };
    for key in inventory.keys.iter_mut() {
        *key = r.read_i16()?;
    }
    inventory.boots = r.read_array()?;

    let current = read_range_i32(&mut r, "rng current", i32::MAX as i64)?;
    let prng1 = read_range_i32(&mut r, "prng register 1", u8::MAX as i64)?;
    let prng2 = read_range_i32(&mut r, "prng register 2", u8::MAX as i64)?;
    let rng = LynxRng::new(current as u32, prng1 as u8, prng2 as u8);

    let rff_code = r.read_u8()?;
    let rff = Direction::from_code(rff_code)
        .filter(|d| d.is_cardinal())
        .ok_or(SavestateError::InvalidDirection {
            field: "random force floor",
            code: rff_code,
        })?;

    let count = r.read_creature_count()?;
    let mut creatures: Vec<Creature> = Vec::with_capacity(count);
    for record in 0..count {
        let packed = PackedCreature::unpack(r.read_u32()?, record)?;
        check_chip_slot(record, &packed)?;
        creatures.push(packed.to_creature());
    }

    let bitmap = r.read_array::<CLAIM_BYTES>()?;
    let last_move_forced = r.read_bool("last move forced")?;
    if r.remaining() != 0 {
        return Err(SavestateError::TrailingBytes(r.remaining()));
    }

    let claims = compute_claims(&creatures, &layer);
    for (cell, &expected) in claims.iter().enumerate() {
        let stored = bitmap[cell / 8] & (1 << (cell % 8)) != 0;
        if stored != expected {
            return Err(SavestateError::ClaimMismatch(cell));
        }
    }

    Ok(Snapshot {
        compressed,
        layer,
        tick,
        inventory,
        rng,
        rff,
        creatures,
        last_move_forced,
    })
}

/// Decode only Chip's record, skipping everything before it.
pub fn peek_chip(bytes: &[u8]) -> Result<Creature> {
    let mut r = SavestateReader::new(bytes);
    let compressed = r.read_header()?;
    r.read_layer_bytes(compressed)?;
    r.read_bytes(FIXED_FIELDS_LEN)?;
    r.read_creature_count()?;
    let packed = PackedCreature::unpack(r.read_u32()?, 0)?;
    check_chip_slot(0, &packed)?;
    Ok(packed.to_creature())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_reports_truncation_offset() {
        let bytes = [0u8, 1, 2];
        let mut r = SavestateReader::new(&bytes);
        assert_eq!(r.read_i16().unwrap(), 1);
        assert_eq!(
            r.read_i32(),
            Err(SavestateError::Truncated { offset: 2, needed: 3 })
        );
    }

    #[test]
    fn test_header_checks() {
        assert_eq!(read(&[5, 2]).unwrap_err(), SavestateError::UnsupportedVersion(5));
        assert_eq!(read(&[6, 1]).unwrap_err(), SavestateError::UnsupportedRuleset(1));
        assert!(matches!(read(&[6]).unwrap_err(), SavestateError::Truncated { .. }));
    }

    #[test]
    fn test_bool_bytes_must_be_binary() {
        let mut r = SavestateReader::new(&[2]);
        assert_eq!(
            r.read_bool("flag"),
            Err(SavestateError::FieldOutOfRange { field: "flag", value: 2 })
        );
    }
}
