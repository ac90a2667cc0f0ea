use std::sync::Arc;

use common::address::{Address, AddressValidator, ChecksumValidator};
use common::challenge::ChallengeBuilder;
use futures::future::try_join_all;
use http::header::{HeaderValue, AUTHORIZATION};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::SecretExistenceCache;
use crate::error::SmsError;
use crate::kind::{ResolvedIdentity, SecretIdentity, SecretKind};
use crate::namespace::{Mutability, SecretNamespace};
use crate::signer::Signer;
use crate::transport::{ReqwestTransport, SmsRequest, Transport, TransportError};
use crate::well_known;

/// Options for [`SmsClient::push`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PushOptions {
    /// Overwrite an existing secret (updatable namespaces only)
    pub force_update: bool,
}

impl PushOptions {
    pub fn force_update() -> Self {
        Self { force_update: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushResult {
    pub is_pushed: bool,
    pub is_updated: bool,
}

/// Client for one secret management service
///
/// Checks never need a signer; pushes do. Clones share the transport, the
/// signer and the existence cache.
#[derive(Clone)]
pub struct SmsClient {
    url: Url,
    transport: Arc<dyn Transport>,
    cache: SecretExistenceCache,
    validator: Arc<dyn AddressValidator>,
    signer: Option<Arc<dyn Signer>>,
    challenges: ChallengeBuilder,
}

impl std::fmt::Debug for SmsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsClient")
            .field("url", &self.url.as_str())
            .field("signer", &self.signer.as_ref().map(|s| s.address()))
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl SmsClient {
    /// Client over `transport` with a fresh cache and no signer
    pub fn new(url: &Url, transport: Arc<dyn Transport>) -> Self {
        Self {
            url: url.clone(),
            transport,
            cache: SecretExistenceCache::new(),
            validator: Arc::new(ChecksumValidator),
            signer: None,
            challenges: ChallengeBuilder::new(),
        }
    }

    /// Client talking HTTP through a default `reqwest` transport
    pub fn connect(url: &Url) -> Result<Self, TransportError> {
        Ok(Self::new(url, Arc::new(ReqwestTransport::new()?)))
    }

    /// Share an existing cache (e.g. one per process)
    pub fn with_cache(mut self, cache: SecretExistenceCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn AddressValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn cache(&self) -> &SecretExistenceCache {
        &self.cache
    }

    pub fn signer_address(&self) -> Option<Address> {
        self.signer.as_ref().map(|s| s.address())
    }

    /// Whether the secret exists on the service.
    ///
    /// Confirmed secrets are answered from the cache; anything else costs one
    /// probe. A 404 is a plain `false` and is not remembered.
    #[tracing::instrument(skip(self), fields(sms = %self.url))]
    pub async fn check_exists(
        &self,
        kind: SecretKind,
        identity: &SecretIdentity,
    ) -> Result<bool, SmsError> {
        let namespace = kind.namespace();
        let resolved = self.resolve(namespace, identity)?;
        self.probe(namespace, &resolved).await
    }

    /// Check several secrets concurrently, failing on the first error
    pub async fn check_many(
        &self,
        secrets: &[(SecretKind, SecretIdentity)],
    ) -> Result<Vec<bool>, SmsError> {
        try_join_all(
            secrets
                .iter()
                .map(|(kind, identity)| self.check_exists(*kind, identity)),
        )
        .await
    }

    /// Store a secret, signing the write with the attached signer.
    ///
    /// Immutable namespaces always create and rely on the service to refuse
    /// duplicates. The updatable namespace probes first: an existing secret is
    /// only replaced with [`PushOptions::force_update`]. The probe is not a
    /// lock; a concurrent writer can still slip in before the write.
    #[tracing::instrument(skip(self, value), fields(sms = %self.url))]
    pub async fn push(
        &self,
        kind: SecretKind,
        identity: &SecretIdentity,
        value: &str,
        options: PushOptions,
    ) -> Result<PushResult, SmsError> {
        let signer = self.signer.as_ref().ok_or(SmsError::MissingSigner)?;
        if value.is_empty() {
            return Err(SmsError::InvalidInput(
                "secret value must not be empty".to_string(),
            ));
        }

        let namespace = kind.namespace();
        let resolved = self.resolve(namespace, identity)?;

        let exists = match namespace.mutability {
            Mutability::Immutable => false,
            Mutability::Updatable => {
                let exists = self.probe(namespace, &resolved).await?;
                if exists && !options.force_update {
                    return Err(SmsError::AlreadyExists {
                        kind,
                        identity: resolved.to_string(),
                        updatable: true,
                    });
                }
                exists
            }
        };

        let challenge = namespace.challenge(&self.challenges, &resolved, value)?;
        let signature = signer.sign(challenge.as_bytes()).await?;
        let authorization = HeaderValue::try_from(format!("0x{}", hex::encode(signature)))
            .map_err(|e| SmsError::InvalidInput(format!("signature is not a valid header: {e}")))?;

        let method = namespace.write_method(exists).clone();
        tracing::debug!(%method, challenge = %challenge.to_hex(), "writing secret");

        let mut request = SmsRequest::new(method, namespace.url(&self.url, &resolved)?);
        request.headers.insert(AUTHORIZATION, authorization);
        request.body = Some(value.to_string());

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|source| SmsError::Transport { kind, source })?;

        if response.status.is_success() {
            self.remember(namespace, &resolved);
            tracing::info!(identity = %resolved, updated = exists, "secret pushed");
            return Ok(PushResult {
                is_pushed: true,
                is_updated: exists,
            });
        }

        Err(match (namespace.mutability, response.status) {
            (Mutability::Immutable, StatusCode::CONFLICT) => SmsError::AlreadyExists {
                kind,
                identity: resolved.to_string(),
                updatable: false,
            },
            (Mutability::Immutable, StatusCode::UNAUTHORIZED) => SmsError::Unauthorized {
                kind,
                signer: signer.address(),
                identity: resolved.to_string(),
            },
            // Updatable writes are gated by the probe; whatever the service
            // says past that point is unexpected.
            (_, status) => SmsError::UnexpectedStatus {
                kind,
                status,
                body: response.body,
            },
        })
    }

    /// Dataset decryption key
    pub async fn check_web3_secret(&self, resource: &str) -> Result<bool, SmsError> {
        self.check_exists(SecretKind::Web3Secret, &SecretIdentity::address(resource))
            .await
    }

    pub async fn push_web3_secret(
        &self,
        resource: &str,
        value: &str,
    ) -> Result<PushResult, SmsError> {
        self.push(
            SecretKind::Web3Secret,
            &SecretIdentity::address(resource),
            value,
            PushOptions::default(),
        )
        .await
    }

    pub async fn check_web2_secret(&self, owner: &str, name: &str) -> Result<bool, SmsError> {
        self.check_exists(SecretKind::Web2Secret, &SecretIdentity::named(owner, name))
            .await
    }

    /// Web2 secrets belong to the signer, so the owner is the signer address
    pub async fn push_web2_secret(
        &self,
        name: &str,
        value: &str,
        options: PushOptions,
    ) -> Result<PushResult, SmsError> {
        let owner = self.signer_address().ok_or(SmsError::MissingSigner)?;
        self.push(
            SecretKind::Web2Secret,
            &SecretIdentity::named(owner.to_checksum(), name),
            value,
            options,
        )
        .await
    }

    pub async fn check_requester_secret(
        &self,
        requester: &str,
        name: &str,
    ) -> Result<bool, SmsError> {
        self.check_exists(
            SecretKind::RequesterSecret,
            &SecretIdentity::named(requester, name),
        )
        .await
    }

    /// Requester secrets belong to the signer
    pub async fn push_requester_secret(
        &self,
        name: &str,
        value: &str,
    ) -> Result<PushResult, SmsError> {
        let requester = self.signer_address().ok_or(SmsError::MissingSigner)?;
        self.push(
            SecretKind::RequesterSecret,
            &SecretIdentity::named(requester.to_checksum(), name),
            value,
            PushOptions::default(),
        )
        .await
    }

    pub async fn check_app_secret(&self, app: &str) -> Result<bool, SmsError> {
        self.check_exists(SecretKind::AppSecret, &SecretIdentity::address(app))
            .await
    }

    pub async fn push_app_secret(&self, app: &str, value: &str) -> Result<PushResult, SmsError> {
        self.push(
            SecretKind::AppSecret,
            &SecretIdentity::address(app),
            value,
            PushOptions::default(),
        )
        .await
    }

    /// Whether `beneficiary` registered a result-encryption public key
    pub async fn check_beneficiary_key(&self, beneficiary: &str) -> Result<bool, SmsError> {
        self.check_web2_secret(beneficiary, well_known::RESULT_ENCRYPTION_KEY)
            .await
    }

    /// Register the signer's result-encryption public key (PEM)
    pub async fn push_beneficiary_key(
        &self,
        public_key: &str,
        options: PushOptions,
    ) -> Result<PushResult, SmsError> {
        self.push_web2_secret(well_known::RESULT_ENCRYPTION_KEY, public_key, options)
            .await
    }

    /// Whether `owner` registered a token for the result storage `provider`
    pub async fn check_storage_token(
        &self,
        owner: &str,
        provider: StorageProvider,
    ) -> Result<bool, SmsError> {
        self.check_web2_secret(owner, provider.secret_name()).await
    }

    pub async fn push_storage_token(
        &self,
        provider: StorageProvider,
        token: &str,
        options: PushOptions,
    ) -> Result<PushResult, SmsError> {
        self.push_web2_secret(provider.secret_name(), token, options)
            .await
    }

    fn resolve(
        &self,
        namespace: &SecretNamespace,
        identity: &SecretIdentity,
    ) -> Result<ResolvedIdentity, SmsError> {
        namespace.check_name(identity)?;
        let address = self.validator.validate(&identity.address)?;
        Ok(ResolvedIdentity {
            address,
            name: identity.name.clone(),
        })
    }

    async fn probe(
        &self,
        namespace: &SecretNamespace,
        identity: &ResolvedIdentity,
    ) -> Result<bool, SmsError> {
        let kind = namespace.kind;
        let key = identity.cache_key();
        if self.cache.get(self.url.as_str(), kind, &key).is_some() {
            tracing::debug!(%identity, "existence answered from cache");
            return Ok(true);
        }

        let request = SmsRequest::new(namespace.probe.clone(), namespace.url(&self.url, identity)?);
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|source| SmsError::Transport { kind, source })?;

        match response.status {
            status if status.is_success() => {
                self.remember(namespace, identity);
                Ok(true)
            }
            StatusCode::NOT_FOUND => {
                tracing::debug!(%identity, "secret not found");
                Ok(false)
            }
            status => Err(SmsError::UnexpectedStatus {
                kind,
                status,
                body: response.body,
            }),
        }
    }

    fn remember(&self, namespace: &SecretNamespace, identity: &ResolvedIdentity) {
        self.cache
            .set_true(self.url.as_str(), namespace.kind, &identity.cache_key());
    }
}

/// Result storage providers that need a token in the SMS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Ipfs,
    Dropbox,
}

impl StorageProvider {
    pub fn secret_name(&self) -> &'static str {
        match self {
            StorageProvider::Ipfs => well_known::IPFS_TOKEN,
            StorageProvider::Dropbox => well_known::DROPBOX_TOKEN,
        }
    }
}

impl std::str::FromStr for StorageProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ipfs" => Ok(StorageProvider::Ipfs),
            "dropbox" => Ok(StorageProvider::Dropbox),
            other => Err(format!("unknown storage provider `{other}`")),
        }
    }
}
