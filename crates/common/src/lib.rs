/**
 * Account addresses.
 *  - EIP-55 checksum validation and formatting
 *  - Pluggable validation for identity inputs
 */
pub mod address;
/**
 * Deterministic, domain-separated challenges
 *  that an identity signs to prove it may write
 *  a secret.
 */
pub mod challenge;
/**
 * Cryptographic types and operations.
 *  - 256-bit hash boundary (Keccak-256)
 *  - secp256k1 wallet keys and message signing
 */
pub mod crypto;

pub mod prelude {
    pub use crate::address::{Address, AddressError, AddressValidator, ChecksumValidator};
    pub use crate::challenge::{Challenge, ChallengeBuilder, ChallengeError};
    pub use crate::crypto::{HashFunction, Keccak256, KeyError, WalletKey};
}
