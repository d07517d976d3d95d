// Hashing utilities

use sha2::{Digest, Sha256};

use crate::core::{BLOCK_HEADER_SIZE, Hash256};

/// SHA256 double hash (Bitcoin convention)
/// hash256 = SHA256(SHA256(data))
pub fn hash256(data: &[u8]) -> Hash256 {
    let first_hash = Sha256::digest(data);
    let second_hash = Sha256::digest(first_hash);
    Hash256::new(second_hash.into())
}

/// Double SHA256 over an 80-byte header with the first 64-byte block absorbed once.
///
/// Only the trailing 16 bytes (end of merkle root, time, bits, nonce) change
/// between attempts, so each nonce costs one compression for the tail plus
/// the second hash.
#[derive(Clone)]
pub struct HeaderHasher {
    midstate: Sha256,
    tail: [u8; 16],
}

impl HeaderHasher {
    pub fn new(header: &[u8; BLOCK_HEADER_SIZE]) -> Self {
        let mut midstate = Sha256::new();
        midstate.update(&header[..64]);
        let mut tail = [0u8; 16];
        tail.copy_from_slice(&header[64..]);
        Self { midstate, tail }
    }

    /// Hash the header with `nonce` written into bytes 76..80
    #[inline]
    pub fn hash_with_nonce(&mut self, nonce: u32) -> Hash256 {
        self.tail[12..].copy_from_slice(&nonce.to_le_bytes());
        let mut first = self.midstate.clone();
        first.update(self.tail);
        let second_hash = Sha256::digest(first.finalize());
        Hash256::new(second_hash.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash256_known_vector() {
        // sha256d("hello")
        let hash = hash256(b"hello");
        assert_eq!(
            hash.to_internal_hex(),
            "9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50"
        );
    }

    #[test]
    fn test_hash256_deterministic() {
        let data = b"hello world";
        assert_eq!(hash256(data), hash256(data));
        assert_ne!(hash256(data), hash256(b"hello worle"));
    }

    #[test]
    fn test_midstate_matches_full_hash() {
        let mut header = [0u8; BLOCK_HEADER_SIZE];
        for (i, byte) in header.iter_mut().enumerate() {
            *byte = i as u8;
        }
        let mut hasher = HeaderHasher::new(&header);

        for nonce in [0u32, 1, 0xdead_beef, u32::MAX] {
            header[76..].copy_from_slice(&nonce.to_le_bytes());
            assert_eq!(hasher.hash_with_nonce(nonce), hash256(&header));
        }
    }
}
