use common::address::{Address, AddressError};
use common::challenge::ChallengeError;
use http::StatusCode;

use crate::kind::SecretKind;
use crate::signer::SignerError;
use crate::transport::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{kind} secret already exists for {identity} and can't be updated{}", update_hint(.updatable))]
    AlreadyExists {
        kind: SecretKind,
        identity: String,
        /// Whether retrying with a forced update would succeed
        updatable: bool,
    },
    #[error("signer {signer} is not allowed to set {kind} secret for {identity}")]
    Unauthorized {
        kind: SecretKind,
        signer: Address,
        identity: String,
    },
    #[error("unexpected SMS response for {kind} secret: {status}{}", body_suffix(.body))]
    UnexpectedStatus {
        kind: SecretKind,
        status: StatusCode,
        body: String,
    },
    #[error("SMS request for {kind} secret failed: {source}")]
    Transport {
        kind: SecretKind,
        #[source]
        source: TransportError,
    },
    #[error("a signer is required to push secrets")]
    MissingSigner,
    #[error(transparent)]
    Signer(#[from] SignerError),
    #[error("invalid SMS url: {0}")]
    Url(String),
}

impl From<ChallengeError> for SmsError {
    fn from(err: ChallengeError) -> Self {
        SmsError::InvalidInput(err.to_string())
    }
}

fn update_hint(updatable: &bool) -> &'static str {
    if *updatable {
        " without a forced update"
    } else {
        ""
    }
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" ({body})")
    }
}
