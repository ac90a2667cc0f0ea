//! Challenge construction for authenticated secret writes
//!
//! A challenge binds an identity (an address, optionally with a secret name)
//! to a secret value. The owner of the identity signs the challenge; the
//! secret store rebuilds it from the request and recovers the signer.
//!
//! Every variable-length field is hashed on its own before concatenation so
//! that distinct `(name, value)` pairs can never yield the same byte string:
//!
//! ```text
//! Hd          = H("IEXEC_SMS_DOMAIN")
//! address     = H( Hd || address20 || H(value) )
//! named       = H( Hd || address20 || H(name) || H(value) )
//! ```

use std::fmt;

use crate::address::Address;
use crate::crypto::{HashFunction, Keccak256, HASH_SIZE};

/// Domain separator shared with the secret store
pub const SMS_DOMAIN: &str = "IEXEC_SMS_DOMAIN";

/// Secret name used in app-secret challenges.
///
/// App secrets used to be indexed and the store still verifies against
/// index "1".
pub const LEGACY_APP_SECRET_INDEX: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChallengeError {
    #[error("secret value must not be empty")]
    EmptyValue,
    #[error("secret name must not be empty")]
    EmptyName,
}

/// A 32-byte challenge digest
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Challenge([u8; HASH_SIZE]);

impl Challenge {
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl AsRef<[u8]> for Challenge {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Challenge({})", self.to_hex())
    }
}

/// Builds challenges over a pluggable [`HashFunction`]
#[derive(Debug, Clone, Default)]
pub struct ChallengeBuilder<H = Keccak256> {
    hasher: H,
}

impl ChallengeBuilder<Keccak256> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: HashFunction> ChallengeBuilder<H> {
    pub fn with_hasher(hasher: H) -> Self {
        Self { hasher }
    }

    /// Challenge for a secret keyed by a resource address alone (dataset keys)
    pub fn web3(&self, resource: &Address, value: &str) -> Result<Challenge, ChallengeError> {
        if value.is_empty() {
            return Err(ChallengeError::EmptyValue);
        }
        let domain = self.hasher.hash(SMS_DOMAIN.as_bytes());
        let value = self.hasher.hash(value.as_bytes());
        Ok(Challenge(self.hasher.hash_concat(&[
            &domain,
            resource.as_bytes(),
            &value,
        ])))
    }

    /// Challenge for a secret keyed by an owner address and a name
    /// (web2 secrets and requester secrets)
    pub fn named(
        &self,
        owner: &Address,
        name: &str,
        value: &str,
    ) -> Result<Challenge, ChallengeError> {
        if name.is_empty() {
            return Err(ChallengeError::EmptyName);
        }
        if value.is_empty() {
            return Err(ChallengeError::EmptyValue);
        }
        let domain = self.hasher.hash(SMS_DOMAIN.as_bytes());
        let name = self.hasher.hash(name.as_bytes());
        let value = self.hasher.hash(value.as_bytes());
        Ok(Challenge(self.hasher.hash_concat(&[
            &domain,
            owner.as_bytes(),
            &name,
            &value,
        ])))
    }

    /// Challenge for an app developer secret
    pub fn app(&self, app: &Address, value: &str) -> Result<Challenge, ChallengeError> {
        self.named(app, LEGACY_APP_SECRET_INDEX, value)
    }
}
