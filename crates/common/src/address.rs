//! 20-byte account addresses
//!
//! Identities in the secret store are account addresses. Every address that
//! crosses into the client is validated first: it must be `0x`-prefixed hex
//! of the right length, and if it uses mixed case the EIP-55 checksum must
//! match. Addresses are always displayed in checksummed form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto::{HashFunction, Keccak256};

/// Size of an account address in bytes
pub const ADDRESS_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("invalid address `{0}`: expected 0x-prefixed 40 hex characters")]
    Malformed(String),
    #[error("invalid address `{0}`: bad EIP-55 checksum")]
    BadChecksum(String),
}

/// An account address (contract or externally owned)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_SIZE]);

impl From<[u8; ADDRESS_SIZE]> for Address {
    fn from(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Address(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Address {
    /// Raw address bytes, as they enter challenge construction
    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    /// Build an address from the last 20 bytes of a 32-byte digest
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes.copy_from_slice(&digest[32 - ADDRESS_SIZE..]);
        Address(bytes)
    }

    /// Parse an address, enforcing the EIP-55 checksum when the input is mixed case.
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let trimmed = raw.trim();
        let hex_part = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| AddressError::Malformed(raw.to_string()))?;

        if hex_part.len() != ADDRESS_SIZE * 2 {
            return Err(AddressError::Malformed(raw.to_string()));
        }

        let mut bytes = [0u8; ADDRESS_SIZE];
        hex::decode_to_slice(hex_part, &mut bytes)
            .map_err(|_| AddressError::Malformed(raw.to_string()))?;
        let address = Address(bytes);

        let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper && address.to_checksum()[2..] != *hex_part {
            return Err(AddressError::BadChecksum(raw.to_string()));
        }

        Ok(address)
    }

    /// EIP-55 mixed-case checksum encoding
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = Keccak256.hash(lower.as_bytes());

        let mut out = String::with_capacity(2 + lower.len());
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Address::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Turns raw identity input into a validated [`Address`].
///
/// Name resolution (ENS and friends) lives outside this crate; a resolving
/// implementation plugs in here.
pub trait AddressValidator: Send + Sync {
    fn validate(&self, raw: &str) -> Result<Address, AddressError>;
}

/// Accepts only literal hex addresses, enforcing EIP-55 on mixed-case input
#[derive(Debug, Clone, Copy, Default)]
pub struct ChecksumValidator;

impl AddressValidator for ChecksumValidator {
    fn validate(&self, raw: &str) -> Result<Address, AddressError> {
        Address::parse(raw)
    }
}
