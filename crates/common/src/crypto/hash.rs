use sha3::Digest;

/// Size of a digest in bytes (256 bits)
pub const HASH_SIZE: usize = 32;

/// A 256-bit collision-resistant hash.
///
/// Challenge construction only ever talks to this trait, so the bytes that
/// get signed do not depend on the API shape of any particular crypto crate.
pub trait HashFunction: Send + Sync {
    fn hash(&self, data: &[u8]) -> [u8; HASH_SIZE];

    /// Hash the concatenation of `parts`
    fn hash_concat(&self, parts: &[&[u8]]) -> [u8; HASH_SIZE] {
        let joined: Vec<u8> = parts.iter().flat_map(|p| p.iter().copied()).collect();
        self.hash(&joined)
    }
}

/// Keccak-256 (the pre-standard SHA-3 variant used by Ethereum)
#[derive(Debug, Clone, Copy, Default)]
pub struct Keccak256;

impl HashFunction for Keccak256 {
    fn hash(&self, data: &[u8]) -> [u8; HASH_SIZE] {
        sha3::Keccak256::digest(data).into()
    }

    fn hash_concat(&self, parts: &[&[u8]]) -> [u8; HASH_SIZE] {
        let mut hasher = sha3::Keccak256::new();
        for part in parts {
            hasher.update(part);
        }
        hasher.finalize().into()
    }
}
