use async_trait::async_trait;
use common::address::Address;
use common::crypto::WalletKey;

#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("signing failed: {0}")]
    Failed(String),
}

/// Proves control of an address by signing payloads.
///
/// The signer owns any message prefixing its signature scheme needs; the
/// client hands it the bare challenge bytes.
#[async_trait]
pub trait Signer: Send + Sync {
    fn address(&self) -> Address;

    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SignerError>;
}

/// Local wallet key, signing as an EIP-191 personal message
#[async_trait]
impl Signer for WalletKey {
    fn address(&self) -> Address {
        WalletKey::address(self)
    }

    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SignerError> {
        self.sign_personal(payload)
            .map(|signature| signature.to_vec())
            .map_err(|e| SignerError::Failed(e.to_string()))
    }
}
