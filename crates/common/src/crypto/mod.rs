//! Cryptographic primitives for the SMS client
//!
//! - **Hashing**: a [`HashFunction`] boundary producing 32-byte digests, with
//!   [`Keccak256`] as the implementation the secret store verifies against
//! - **Wallet keys**: secp256k1 [`WalletKey`]s that sign challenges as
//!   EIP-191 personal messages, producing 65-byte `r || s || v` signatures
//!
//! # Authentication Model
//!
//! The secret store never sees a password. To write a secret, the client:
//! 1. Builds a challenge digest over the identity and the secret value
//! 2. Signs the digest with the wallet key of the identity
//! 3. Sends the signature alongside the value
//!
//! The store recovers the signer address from the signature and checks it
//! against the owner it expects for that identity.

mod hash;
mod keys;

pub use hash::{HashFunction, Keccak256, HASH_SIZE};
pub use keys::{
    recover_personal_signer, KeyError, WalletKey, PRIVATE_KEY_SIZE, SIGNATURE_SIZE,
};
