//! State Hashing for Verification
//!
//! SHA-256 digests used to compare simulations without comparing whole
//! buffers:
//! - a savestate hash after every replayed tick
//! - a move-list hash identifying the input that produced them
//!
//! Every digest starts with a domain tag so a savestate can never collide
//! with a move list of the same bytes.

use sha2::{Digest, Sha256};

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

const SAVESTATE_DOMAIN: &[u8] = b"LYNX_SAVESTATE_V6";
const MOVES_DOMAIN: &[u8] = b"LYNX_MOVES_V1";

/// Incremental, domain-tagged SHA-256.
///
/// Feed order is part of the digest.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Start a digest under `domain`.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Digest of an uncompressed savestate.
    pub fn for_savestate() -> Self {
        Self::new(SAVESTATE_DOMAIN)
    }

    /// Digest of a move list.
    pub fn for_moves() -> Self {
        Self::new(MOVES_DOMAIN)
    }

    /// Feed raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Feed one byte.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Feed a u32, little-endian.
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Finish.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// One-shot digest of `data` under `domain`.
pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> StateHash {
    let mut hasher = StateHasher::new(domain);
    hasher.update_bytes(data);
    hasher.finalize()
}

/// Digest of an uncompressed savestate buffer.
pub fn hash_savestate(bytes: &[u8]) -> StateHash {
    hash_with_domain(SAVESTATE_DOMAIN, bytes)
}

/// First 8 bytes of a digest as hex, for log lines.
pub fn short_hex(hash: &StateHash) -> String {
    hex::encode(&hash[..8])
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incremental_matches_one_shot() {
        let bytes = [6u8, 2, 0, 0, 1];
        let mut hasher = StateHasher::for_savestate();
        hasher.update_bytes(&bytes[..2]);
        hasher.update_bytes(&bytes[2..]);
        assert_eq!(hasher.finalize(), hash_savestate(&bytes));
    }

    #[test]
    fn test_single_byte_change_changes_hash() {
        let mut save = vec![0u8; 1200];
        let before = hash_savestate(&save);
        save[700] = 1;
        assert_ne!(hash_savestate(&save), before);
    }

    #[test]
    fn test_moves_and_savestates_never_collide() {
        let data = [1u8, 2, 3, 4];
        let mut moves = StateHasher::for_moves();
        moves.update_bytes(&data);
        assert_ne!(moves.finalize(), hash_savestate(&data));
        assert_eq!(hash_with_domain(MOVES_DOMAIN, &data), {
            let mut h = StateHasher::for_moves();
            h.update_bytes(&data);
            h.finalize()
        });
    }

    #[test]
    fn test_u32_feed_is_little_endian() {
        let mut a = StateHasher::new(b"x");
        a.update_u32(0x0403_0201);
        let mut b = StateHasher::new(b"x");
        for byte in [1, 2, 3, 4] {
            b.update_u8(byte);
        }
        assert_eq!(a.finalize(), b.finalize());
    }

    #[test]
    fn test_short_hex() {
        let hash = [0xABu8; 32];
        assert_eq!(short_hex(&hash), "abababababababab");
    }
}
