//! In-memory secret management service for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::address::Address;
use common::challenge::{Challenge, ChallengeBuilder};
use common::crypto::{recover_personal_signer, WalletKey};
use http::header::AUTHORIZATION;
use http::{Method, StatusCode};
use parking_lot::Mutex;
use sms::{
    SecretKind, Signer, SignerError, SmsClient, SmsRequest, SmsResponse, Transport,
    TransportError,
};
use url::Url;

pub const SMS_URL: &str = "https://sms.test/";

// Hardhat development accounts #0 and #1
pub const ALICE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const BOB_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

pub const DATASET: &str = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
pub const APP: &str = "0xCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCC";

pub fn alice() -> WalletKey {
    WalletKey::from_hex(ALICE_KEY).unwrap()
}

pub fn bob() -> WalletKey {
    WalletKey::from_hex(BOB_KEY).unwrap()
}

pub fn address(raw: &str) -> Address {
    Address::parse(raw).unwrap()
}

pub fn sms_url() -> Url {
    Url::parse(SMS_URL).unwrap()
}

/// Client over `fake`, optionally signing with `signer`
pub fn client(fake: &FakeSms, signer: Option<Arc<dyn Signer>>) -> SmsClient {
    let client = SmsClient::new(&sms_url(), Arc::new(fake.clone()));
    match signer {
        Some(signer) => client.with_signer(signer),
        None => client,
    }
}

/// Signer for addresses we hold no key for.
///
/// Its "signature" is `address || challenge`, which a [`FakeSms`] built with
/// [`FakeSms::trusting_stub_signatures`] accepts.
#[derive(Debug, Clone)]
pub struct StubSigner(pub Address);

#[async_trait]
impl Signer for StubSigner {
    fn address(&self) -> Address {
        self.0
    }

    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SignerError> {
        let mut out = self.0.as_bytes().to_vec();
        out.extend_from_slice(payload);
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StoredKey {
    kind: SecretKind,
    address: Address,
    name: Option<String>,
}

#[derive(Default)]
struct FakeState {
    secrets: HashMap<StoredKey, String>,
    resource_owners: HashMap<Address, Address>,
    calls: Vec<Method>,
    failures: HashMap<Method, StatusCode>,
    stub_signatures: bool,
}

/// Behaves like the real service: HEAD probes, signed POST/PUT writes,
/// 409 on duplicate creates and 401 when the signer does not own the identity.
#[derive(Clone, Default)]
pub struct FakeSms {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trusting_stub_signatures() -> Self {
        let fake = Self::default();
        fake.state.lock().stub_signatures = true;
        fake
    }

    /// On-chain owner of a dataset or app
    pub fn set_resource_owner(&self, resource: Address, owner: Address) {
        self.state.lock().resource_owners.insert(resource, owner);
    }

    /// Create a secret behind the client's back
    pub fn insert(&self, kind: SecretKind, address: Address, name: Option<&str>, value: &str) {
        self.state.lock().secrets.insert(
            StoredKey {
                kind,
                address,
                name: name.map(str::to_string),
            },
            value.to_string(),
        );
    }

    pub fn stored(&self, kind: SecretKind, address: Address, name: Option<&str>) -> Option<String> {
        self.state
            .lock()
            .secrets
            .get(&StoredKey {
                kind,
                address,
                name: name.map(str::to_string),
            })
            .cloned()
    }

    /// Answer the next request with `method` with `status`
    pub fn fail_next(&self, method: Method, status: StatusCode) {
        self.state.lock().failures.insert(method, status);
    }

    pub fn calls(&self) -> usize {
        self.state.lock().calls.len()
    }

    pub fn calls_with(&self, method: &Method) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|m| *m == method)
            .count()
    }

    pub fn handle(&self, request: &SmsRequest) -> SmsResponse {
        let mut state = self.state.lock();
        state.calls.push(request.method.clone());

        if let Some(status) = state.failures.remove(&request.method) {
            return SmsResponse::new(status);
        }

        let Some(key) = route(&request.url) else {
            return SmsResponse::new(StatusCode::NOT_FOUND).with_body("no such route");
        };
        let exists = state.secrets.contains_key(&key);

        if request.method == Method::HEAD {
            return if exists {
                SmsResponse::new(StatusCode::NO_CONTENT)
            } else {
                SmsResponse::new(StatusCode::NOT_FOUND)
            };
        }
        let creating = request.method == Method::POST;
        if !creating && request.method != Method::PUT {
            return SmsResponse::new(StatusCode::METHOD_NOT_ALLOWED);
        }

        let value = request.body.clone().unwrap_or_default();
        let Some(challenge) = challenge_for(&key, &value) else {
            return SmsResponse::new(StatusCode::BAD_REQUEST);
        };
        let Some(signer) = recover(&state, request, &challenge) else {
            return SmsResponse::new(StatusCode::UNAUTHORIZED);
        };
        let owner = match key.kind {
            SecretKind::Web3Secret | SecretKind::AppSecret => {
                state.resource_owners.get(&key.address).copied()
            }
            SecretKind::Web2Secret | SecretKind::RequesterSecret => Some(key.address),
        };
        if owner != Some(signer) {
            return SmsResponse::new(StatusCode::UNAUTHORIZED)
                .with_body("signer does not own the identity");
        }

        if creating && exists {
            return SmsResponse::new(StatusCode::CONFLICT);
        }
        if !creating && key.kind != SecretKind::Web2Secret {
            return SmsResponse::new(StatusCode::METHOD_NOT_ALLOWED);
        }
        if !creating && !exists {
            return SmsResponse::new(StatusCode::NOT_FOUND);
        }

        state.secrets.insert(key, value);
        SmsResponse::new(StatusCode::NO_CONTENT)
    }
}

#[async_trait]
impl Transport for FakeSms {
    async fn send(&self, request: SmsRequest) -> Result<SmsResponse, TransportError> {
        Ok(self.handle(&request))
    }
}

fn route(url: &Url) -> Option<StoredKey> {
    let segments: Vec<&str> = url.path_segments()?.collect();
    let query: HashMap<String, String> = url.query_pairs().into_owned().collect();

    let (kind, address, name) = match segments.as_slice() {
        ["secrets", "web3"] => (SecretKind::Web3Secret, query.get("secretAddress")?.clone(), None),
        ["secrets", "web2"] => (
            SecretKind::Web2Secret,
            query.get("ownerAddress")?.clone(),
            Some(query.get("secretName")?.clone()),
        ),
        ["requesters", address, "secrets", name] => (
            SecretKind::RequesterSecret,
            address.to_string(),
            Some(name.to_string()),
        ),
        ["apps", address, "secrets"] => (SecretKind::AppSecret, address.to_string(), None),
        _ => return None,
    };

    Some(StoredKey {
        kind,
        address: Address::parse(&address).ok()?,
        name,
    })
}

fn challenge_for(key: &StoredKey, value: &str) -> Option<Challenge> {
    let builder = ChallengeBuilder::new();
    match key.kind {
        SecretKind::Web3Secret => builder.web3(&key.address, value).ok(),
        SecretKind::AppSecret => builder.app(&key.address, value).ok(),
        SecretKind::Web2Secret | SecretKind::RequesterSecret => builder
            .named(&key.address, key.name.as_deref()?, value)
            .ok(),
    }
}

fn recover(state: &FakeState, request: &SmsRequest, challenge: &Challenge) -> Option<Address> {
    let header = request.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let signature = hex::decode(header.strip_prefix("0x")?).ok()?;

    if state.stub_signatures && signature.len() == 20 + 32 {
        let (address, signed) = signature.split_at(20);
        if signed != challenge.as_bytes() {
            return None;
        }
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(address);
        return Some(Address::from(bytes));
    }

    recover_personal_signer(challenge.as_bytes(), &signature).ok()
}
