//! Layer Run-Length Coding
//!
//! Compressed savestates replace the 1024 raw layer bytes with a run-length
//! stream:
//!
//! - `0x7F n b` repeats `b` for `n + 1` cells (runs of 2..=256)
//! - any other byte is one literal cell
//! - `0x7E` ends the stream
//!
//! Tile bytes never reach `0x7E`, so literals cannot collide with the two
//! control bytes.

use crate::core::position::GRID_CELLS;

use super::error::{Result, SavestateError};

/// Escape byte introducing a run.
pub const RUN: u8 = 0x7F;

/// Stream terminator.
pub const END: u8 = 0x7E;

/// Longest run a single escape can describe.
pub const MAX_RUN: usize = 256;

/// Encode a layer, terminator included.
pub fn encode(layer: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(64);
    let mut i = 0;
    while i < layer.len() {
        let byte = layer[i];
        let run = layer[i..]
            .iter()
            .take(MAX_RUN)
            .take_while(|&&b| b == byte)
            .count();
        if run == 1 {
            out.push(byte);
        } else {
            out.extend_from_slice(&[RUN, (run - 1) as u8, byte]);
        }
        i += run;
    }
    out.push(END);
    out
}

/// Decode a stream that must expand to exactly one layer.
///
/// Returns the layer and the number of stream bytes consumed, terminator
/// included.
pub fn decode(stream: &[u8]) -> Result<(Box<[u8; GRID_CELLS]>, usize)> {
    let mut layer = Box::new([0u8; GRID_CELLS]);
    let mut filled = 0usize;
    let mut i = 0usize;

    loop {
        let Some(&byte) = stream.get(i) else {
            return Err(SavestateError::MalformedRle("missing terminator"));
        };
        i += 1;
        match byte {
            END => break,
            RUN => {
                let (Some(&count), Some(&value)) = (stream.get(i), stream.get(i + 1)) else {
                    return Err(SavestateError::MalformedRle("run cut short"));
                };
                i += 2;
                let run = count as usize + 1;
                if filled + run > GRID_CELLS {
                    return Err(SavestateError::MalformedRle("expands past 1024 cells"));
                }
                layer[filled..filled + run].fill(value);
                filled += run;
            }
            literal => {
                if filled == GRID_CELLS {
                    return Err(SavestateError::MalformedRle("expands past 1024 cells"));
                }
                layer[filled] = literal;
                filled += 1;
            }
        }
    }

    if filled != GRID_CELLS {
        return Err(SavestateError::MalformedRle("expands to fewer than 1024 cells"));
    }
    Ok((layer, i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_uniform_layer() {
        let layer = [0u8; GRID_CELLS];
        // Four maximal runs then the terminator
        assert_eq!(
            encode(&layer),
            vec![RUN, 255, 0, RUN, 255, 0, RUN, 255, 0, RUN, 255, 0, END]
        );
    }

    #[test]
    fn test_single_bytes_stay_literal() {
        let mut layer = [0u8; GRID_CELLS];
        layer[0] = 1;
        layer[1] = 2;
        layer[2] = 2;
        let encoded = encode(&layer);
        assert_eq!(&encoded[..4], &[1, RUN, 1, 2]);
        let (decoded, used) = decode(&encoded).unwrap();
        assert_eq!(&decoded[..], &layer[..]);
        assert_eq!(used, encoded.len());
    }

    #[test]
    fn test_decode_reports_consumed_length() {
        let mut stream = encode(&[5u8; GRID_CELLS]);
        let len = stream.len();
        stream.extend_from_slice(&[9, 9, 9]);
        let (_, used) = decode(&stream).unwrap();
        assert_eq!(used, len);
    }

    #[test]
    fn test_decode_rejects_malformed_streams() {
        assert_eq!(decode(&[]), Err(SavestateError::MalformedRle("missing terminator")));
        assert_eq!(decode(&[RUN, 3]), Err(SavestateError::MalformedRle("run cut short")));
        assert_eq!(
            decode(&[RUN, 255, 0, END]),
            Err(SavestateError::MalformedRle("expands to fewer than 1024 cells"))
        );

        let mut too_long = encode(&[0u8; GRID_CELLS]);
        too_long.insert(too_long.len() - 1, 1);
        assert_eq!(
            decode(&too_long),
            Err(SavestateError::MalformedRle("expands past 1024 cells"))
        );

        let mut unterminated = encode(&[0u8; GRID_CELLS]);
        unterminated.pop();
        assert_eq!(
            decode(&unterminated),
            Err(SavestateError::MalformedRle("missing terminator"))
        );
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(cells in proptest::collection::vec(0u8..0x70, GRID_CELLS)) {
            let encoded = encode(&cells);
            let (decoded, used) = decode(&encoded).unwrap();
            prop_assert_eq!(&decoded[..], &cells[..]);
            prop_assert_eq!(used, encoded.len());
        }
    }
}
