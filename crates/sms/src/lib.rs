//! Client for a remote Secret Management Service (SMS)
//!
//! The SMS keeps confidential material on behalf of account identities:
//! dataset decryption keys, result-encryption keys, storage tokens, app and
//! requester secrets. Writes are authenticated without any shared password:
//! the client signs a challenge derived from the secret and its owner, and
//! the service recovers the signer from the signature.
//!
//! Four secret namespaces exist, each with its own endpoint shape and
//! mutability rule; see [`namespace`]. Existence checks go through a
//! [`SecretExistenceCache`] that remembers confirmed secrets and never
//! remembers absences.

pub mod cache;
pub mod client;
pub mod error;
pub mod kind;
pub mod namespace;
pub mod signer;
pub mod transport;

pub use cache::SecretExistenceCache;
pub use client::{PushOptions, PushResult, SmsClient, StorageProvider};
pub use error::SmsError;
pub use kind::{ResolvedIdentity, SecretIdentity, SecretKind};
pub use namespace::{Endpoint, Mutability, NameRule, Ownership, SecretNamespace};
pub use signer::{Signer, SignerError};
pub use transport::{ReqwestTransport, SmsRequest, SmsResponse, Transport, TransportError};

/// Web2 secret names the marketplace workers look up by convention
pub mod well_known {
    /// Public key the worker encrypts task results with
    pub const RESULT_ENCRYPTION_KEY: &str = "iexec-result-encryption-public-key";
    /// Token used to upload results to IPFS through the result proxy
    pub const IPFS_TOKEN: &str = "iexec-result-iexec-ipfs-token";
    /// Token used to upload results to Dropbox
    pub const DROPBOX_TOKEN: &str = "iexec-result-dropbox-token";
}
