//! Savestate decode errors.

use thiserror::Error;

/// Why a savestate could not be restored.
///
/// Every variant is fatal to the load; the target level is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SavestateError {
    /// Buffer ended before a field could be read.
    #[error("savestate truncated at offset {offset}: {needed} more bytes needed")]
    Truncated {
        /// Offset of the incomplete field.
        offset: usize,
        /// Bytes missing.
        needed: usize,
    },

    /// Version byte is neither 6 nor 7.
    #[error("unsupported savestate version {0}")]
    UnsupportedVersion(u8),

    /// Ruleset byte is not Lynx.
    #[error("unsupported ruleset {0}")]
    UnsupportedRuleset(u8),

    /// Layer holds a byte with no tile.
    #[error("invalid tile byte {byte:#04x} at cell {cell}")]
    InvalidTile {
        /// Cell index.
        cell: usize,
        /// Offending byte.
        byte: u8,
    },

    /// Creature record holds an unusable kind.
    #[error("invalid creature kind {code} in record {record}")]
    InvalidCreatureKind {
        /// Record index.
        record: usize,
        /// Kind code.
        code: u8,
    },

    /// Direction code outside the allowed set for its field.
    #[error("invalid direction code {code} for {field}")]
    InvalidDirection {
        /// Field name.
        field: &'static str,
        /// Direction code.
        code: u8,
    },

    /// Numeric field outside its range.
    #[error("{field} out of range: {value}")]
    FieldOutOfRange {
        /// Field name.
        field: &'static str,
        /// Decoded value.
        value: i64,
    },

    /// Compressed layer stream is malformed.
    #[error("malformed layer stream: {0}")]
    MalformedRle(&'static str),

    /// Bytes left over after the last field.
    #[error("{0} trailing bytes after savestate")]
    TrailingBytes(usize),

    /// Record 0 is not Chip.
    #[error("creature list does not start with Chip")]
    MissingChip,

    /// Stored claim layer disagrees with the creature list.
    #[error("claim layer disagrees with creature positions at cell {0}")]
    ClaimMismatch(usize),
}

/// Result alias for savestate operations.
pub type Result<T> = std::result::Result<T, SavestateError>;
