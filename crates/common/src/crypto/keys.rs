use std::fmt;

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;

use super::hash::{HashFunction, Keccak256, HASH_SIZE};
use crate::address::Address;

/// Size of a secp256k1 private key in bytes
pub const PRIVATE_KEY_SIZE: usize = 32;
/// Size of a recoverable signature in bytes (`r || s || v`)
pub const SIGNATURE_SIZE: usize = 65;

const PEM_TAG: &str = "PRIVATE KEY";

/// Errors that can occur during key operations
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("key error: {0}")]
    Default(#[from] anyhow::Error),
}

/// Wallet key for proving ownership of an address
///
/// A secp256k1 private key. Its address is the last 20 bytes of the
/// Keccak-256 hash of the uncompressed public key. Messages are signed the
/// way wallets sign them (EIP-191 `personal_sign`), so the secret store can
/// recover the signer address from the signature alone.
///
/// # Examples
///
/// ```ignore
/// let key = WalletKey::generate();
/// let address = key.address();
///
/// // Persist to PEM format
/// std::fs::write("key.pem", key.to_pem())?;
///
/// // Sign a challenge
/// let signature = key.sign_personal(&challenge);
/// assert_eq!(recover_personal_signer(&challenge, &signature)?, address);
/// ```
#[derive(Clone)]
pub struct WalletKey(SigningKey);

impl fmt::Debug for WalletKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WalletKey").field(&self.address()).finish()
    }
}

impl TryFrom<&[u8]> for WalletKey {
    type Error = KeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != PRIVATE_KEY_SIZE {
            return Err(anyhow::anyhow!(
                "invalid private key size, expected {}, got {}",
                PRIVATE_KEY_SIZE,
                bytes.len()
            )
            .into());
        }
        let key = SigningKey::from_slice(bytes)
            .map_err(|_| anyhow::anyhow!("private key is not a valid secp256k1 scalar"))?;
        Ok(Self(key))
    }
}

impl WalletKey {
    /// Parse a private key from a hexadecimal string
    ///
    /// Accepts both plain hex and "0x"-prefixed hex strings.
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let hex = hex.trim();
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut buff = [0; PRIVATE_KEY_SIZE];
        hex::decode_to_slice(hex, &mut buff)
            .map_err(|_| anyhow::anyhow!("private key hex decode error"))?;
        Self::try_from(&buff[..])
    }

    /// Generate a new random key using a cryptographically secure RNG
    pub fn generate() -> Self {
        loop {
            let mut bytes = [0u8; PRIVATE_KEY_SIZE];
            getrandom::getrandom(&mut bytes).expect("failed to generate random bytes");
            // Out-of-range scalars are astronomically rare; draw again.
            if let Ok(key) = Self::try_from(&bytes[..]) {
                return key;
            }
        }
    }

    /// The address this key controls
    pub fn address(&self) -> Address {
        address_of(self.0.verifying_key())
    }

    /// Convert private key to raw bytes
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_SIZE] {
        let mut bytes = [0u8; PRIVATE_KEY_SIZE];
        bytes.copy_from_slice(&self.0.to_bytes());
        bytes
    }

    /// Convert private key to hexadecimal string
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Encode private key in PEM format for storage
    ///
    /// Returns a PEM-encoded string with tag "PRIVATE KEY".
    pub fn to_pem(&self) -> String {
        let pem = pem::Pem::new(PEM_TAG, self.to_bytes());
        pem::encode(&pem)
    }

    /// Parse a private key from PEM format
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The PEM string is malformed
    /// - The PEM tag is not "PRIVATE KEY"
    /// - The key size is incorrect
    pub fn from_pem(pem_str: &str) -> Result<Self, KeyError> {
        let pem = pem::parse(pem_str).map_err(|e| anyhow::anyhow!("failed to parse PEM: {}", e))?;

        if pem.tag() != PEM_TAG {
            return Err(anyhow::anyhow!("invalid PEM tag, expected {}", PEM_TAG).into());
        }

        Self::try_from(pem.contents())
    }

    /// Sign `message` as an EIP-191 personal message.
    ///
    /// Returns `r || s || v` with `v` in `{27, 28}`.
    pub fn sign_personal(&self, message: &[u8]) -> Result<[u8; SIGNATURE_SIZE], KeyError> {
        let digest = personal_message_hash(message);
        let (signature, recovery_id) = self
            .0
            .sign_prehash_recoverable(&digest)
            .map_err(|e| anyhow::anyhow!("signing failed: {}", e))?;

        let mut out = [0u8; SIGNATURE_SIZE];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = 27 + recovery_id.to_byte();
        Ok(out)
    }
}

/// Recover the address that produced `signature` over the personal message `message`.
pub fn recover_personal_signer(message: &[u8], signature: &[u8]) -> Result<Address, KeyError> {
    if signature.len() != SIGNATURE_SIZE {
        return Err(anyhow::anyhow!(
            "invalid signature size, expected {}, got {}",
            SIGNATURE_SIZE,
            signature.len()
        )
        .into());
    }

    let v = signature[64];
    let recovery_id = RecoveryId::from_byte(v.checked_sub(27).unwrap_or(v))
        .ok_or_else(|| anyhow::anyhow!("invalid recovery id {}", v))?;
    let signature = Signature::from_slice(&signature[..64])
        .map_err(|_| anyhow::anyhow!("invalid signature encoding"))?;

    let digest = personal_message_hash(message);
    let key = VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id)
        .map_err(|_| anyhow::anyhow!("signature recovery failed"))?;
    Ok(address_of(&key))
}

fn personal_message_hash(message: &[u8]) -> [u8; HASH_SIZE] {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", message.len());
    Keccak256.hash_concat(&[prefix.as_bytes(), message])
}

fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 SEC1 tag
    Address::from_digest(&Keccak256.hash(&point.as_bytes()[1..]))
}

#[cfg(test)]
mod test {
    use super::*;

    // Well-known development key (Hardhat account #0)
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_known_address() {
        let key = WalletKey::from_hex(DEV_KEY).unwrap();
        assert_eq!(key.address().to_checksum(), DEV_ADDRESS);
    }

    #[test]
    fn test_pem_serialization() {
        let key = WalletKey::generate();

        let pem = key.to_pem();
        let recovered = WalletKey::from_pem(&pem).unwrap();
        assert_eq!(key.to_bytes(), recovered.to_bytes());
        assert_eq!(key.address(), recovered.address());
    }

    #[test]
    fn test_pem_wrong_tag_rejected() {
        let pem = pem::encode(&pem::Pem::new("PUBLIC KEY", [1u8; PRIVATE_KEY_SIZE]));
        assert!(WalletKey::from_pem(&pem).is_err());
    }

    #[test]
    fn test_sign_and_recover() {
        let key = WalletKey::generate();
        let message = [7u8; 32];

        let signature = key.sign_personal(&message).unwrap();
        assert!(signature[64] == 27 || signature[64] == 28);
        assert_eq!(
            recover_personal_signer(&message, &signature).unwrap(),
            key.address()
        );

        // A different message recovers a different address
        let other = recover_personal_signer(&[8u8; 32], &signature);
        assert!(other.map(|a| a != key.address()).unwrap_or(true));
    }

    #[test]
    fn test_debug_hides_private_key() {
        let key = WalletKey::from_hex(DEV_KEY).unwrap();
        let debug = format!("{:?}", key);
        assert!(!debug.contains(&DEV_KEY[2..]));
        assert!(debug.contains(DEV_ADDRESS));
    }
}
