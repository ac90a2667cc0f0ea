//! Registry of secret namespaces
//!
//! One row per [`SecretKind`]. Everything kind-specific (endpoint shape,
//! HTTP verbs, naming, mutability, challenge layout) is read from here so
//! the client itself runs a single generic check and push routine.
//!
//! | Kind      | Endpoint                                          | Writes          |
//! |-----------|---------------------------------------------------|-----------------|
//! | web3      | `/secrets/web3?secretAddress=<addr>`              | POST            |
//! | web2      | `/secrets/web2?ownerAddress=<addr>&secretName=<n>`| POST, PUT       |
//! | requester | `/requesters/<addr>/secrets/<name>`               | POST            |
//! | app       | `/apps/<addr>/secrets`                            | POST            |

use common::challenge::{Challenge, ChallengeBuilder, ChallengeError};
use common::crypto::HashFunction;
use http::Method;
use url::Url;

use crate::error::SmsError;
use crate::kind::{ResolvedIdentity, SecretIdentity, SecretKind};

/// Whether an existing secret may be overwritten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Immutable,
    Updatable,
}

/// Who the identity address belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The address is the signer's own account
    Signer,
    /// The address is a resource (dataset, app); the service checks on-chain
    /// that the signer owns it
    Resource,
}

/// How the secret name takes part in addressing and in the challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    /// Unnamed; challenge covers address and value only
    None,
    /// Caller supplies a non-empty name
    Required,
    /// Unnamed on the wire; challenge uses the fixed name
    Legacy(&'static str),
}

/// Where a namespace lives on the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Fixed path, identity carried in query parameters
    Query {
        path: &'static [&'static str],
        address_param: &'static str,
        name_param: Option<&'static str>,
    },
    /// Identity carried in path segments: `/<collection>/<addr>/<secrets>[/<name>]`
    Segments {
        collection: &'static str,
        secrets: &'static str,
    },
}

#[derive(Debug)]
pub struct SecretNamespace {
    pub kind: SecretKind,
    pub endpoint: Endpoint,
    pub probe: Method,
    pub create: Method,
    /// `None` for immutable namespaces
    pub update: Option<Method>,
    pub ownership: Ownership,
    pub mutability: Mutability,
    pub name_rule: NameRule,
}

static NAMESPACES: [SecretNamespace; 4] = [
    SecretNamespace {
        kind: SecretKind::Web3Secret,
        endpoint: Endpoint::Query {
            path: &["secrets", "web3"],
            address_param: "secretAddress",
            name_param: None,
        },
        probe: Method::HEAD,
        create: Method::POST,
        update: None,
        ownership: Ownership::Resource,
        mutability: Mutability::Immutable,
        name_rule: NameRule::None,
    },
    SecretNamespace {
        kind: SecretKind::Web2Secret,
        endpoint: Endpoint::Query {
            path: &["secrets", "web2"],
            address_param: "ownerAddress",
            name_param: Some("secretName"),
        },
        probe: Method::HEAD,
        create: Method::POST,
        update: Some(Method::PUT),
        ownership: Ownership::Signer,
        mutability: Mutability::Updatable,
        name_rule: NameRule::Required,
    },
    SecretNamespace {
        kind: SecretKind::RequesterSecret,
        endpoint: Endpoint::Segments {
            collection: "requesters",
            secrets: "secrets",
        },
        probe: Method::HEAD,
        create: Method::POST,
        update: None,
        ownership: Ownership::Signer,
        mutability: Mutability::Immutable,
        name_rule: NameRule::Required,
    },
    SecretNamespace {
        kind: SecretKind::AppSecret,
        endpoint: Endpoint::Segments {
            collection: "apps",
            secrets: "secrets",
        },
        probe: Method::HEAD,
        create: Method::POST,
        update: None,
        ownership: Ownership::Resource,
        mutability: Mutability::Immutable,
        name_rule: NameRule::Legacy(common::challenge::LEGACY_APP_SECRET_INDEX),
    },
];

pub(crate) fn lookup(kind: SecretKind) -> &'static SecretNamespace {
    match kind {
        SecretKind::Web3Secret => &NAMESPACES[0],
        SecretKind::Web2Secret => &NAMESPACES[1],
        SecretKind::RequesterSecret => &NAMESPACES[2],
        SecretKind::AppSecret => &NAMESPACES[3],
    }
}

/// All registry rows, in [`SecretKind::ALL`] order
pub fn all() -> &'static [SecretNamespace] {
    &NAMESPACES
}

impl SecretNamespace {
    /// Check that the caller's name fits this namespace
    pub fn check_name(&self, identity: &SecretIdentity) -> Result<(), SmsError> {
        // Dot segments would be normalized out of the path
        if let (Endpoint::Segments { .. }, Some("." | "..")) =
            (self.endpoint, identity.name.as_deref())
        {
            return Err(SmsError::InvalidInput(format!(
                "{} secret name can't be a dot segment",
                self.kind
            )));
        }
        match (self.name_rule, identity.name.as_deref()) {
            (NameRule::Required, Some(name)) if !name.is_empty() => Ok(()),
            (NameRule::Required, _) => Err(SmsError::InvalidInput(format!(
                "{} secrets require a non-empty secret name",
                self.kind
            ))),
            (NameRule::None | NameRule::Legacy(_), None) => Ok(()),
            (NameRule::None | NameRule::Legacy(_), Some(_)) => Err(SmsError::InvalidInput(
                format!("{} secrets are not named", self.kind),
            )),
        }
    }

    /// Full URL of the secret on the service at `base`
    pub fn url(&self, base: &Url, identity: &ResolvedIdentity) -> Result<Url, SmsError> {
        let address = identity.address.to_checksum();
        let mut url = base.clone();
        url.set_query(None);
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SmsError::Url(format!("{base} cannot be a base URL")))?;
            segments.pop_if_empty();
            match self.endpoint {
                Endpoint::Query { path, .. } => {
                    segments.extend(path);
                }
                Endpoint::Segments {
                    collection,
                    secrets,
                } => {
                    segments.extend([collection, address.as_str(), secrets]);
                    if let Some(name) = &identity.name {
                        segments.push(name);
                    }
                }
            }
        }

        if let Endpoint::Query {
            address_param,
            name_param,
            ..
        } = self.endpoint
        {
            let mut query = url.query_pairs_mut();
            query.append_pair(address_param, &address);
            if let (Some(param), Some(name)) = (name_param, &identity.name) {
                query.append_pair(param, name);
            }
        }

        Ok(url)
    }

    /// Verb for a write, given whether the secret was found to exist
    pub fn write_method(&self, exists: bool) -> &Method {
        match (&self.update, exists) {
            (Some(update), true) => update,
            _ => &self.create,
        }
    }

    /// Challenge the owner must sign to write `value` under `identity`
    pub fn challenge<H: HashFunction>(
        &self,
        builder: &ChallengeBuilder<H>,
        identity: &ResolvedIdentity,
        value: &str,
    ) -> Result<Challenge, ChallengeError> {
        match self.name_rule {
            NameRule::None => builder.web3(&identity.address, value),
            NameRule::Legacy(name) => builder.named(&identity.address, name, value),
            NameRule::Required => builder.named(
                &identity.address,
                identity.name.as_deref().unwrap_or_default(),
                value,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::address::Address;

    const ADDR: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

    fn identity(name: Option<&str>) -> ResolvedIdentity {
        ResolvedIdentity {
            address: Address::parse(ADDR).unwrap(),
            name: name.map(str::to_string),
        }
    }

    fn base() -> Url {
        Url::parse("https://sms.example.com").unwrap()
    }

    #[test]
    fn test_registry_rows_match_kinds() {
        for (row, kind) in all().iter().zip(SecretKind::ALL) {
            assert_eq!(row.kind, kind);
            assert_eq!(kind.namespace().kind, kind);
            assert_eq!(row.probe, Method::HEAD);
            assert_eq!(row.create, Method::POST);
            assert_eq!(
                row.update.is_some(),
                row.mutability == Mutability::Updatable
            );
        }
    }

    #[test]
    fn test_web3_url() {
        let url = SecretKind::Web3Secret
            .namespace()
            .url(&base(), &identity(None))
            .unwrap();
        assert_eq!(
            url.as_str(),
            format!("https://sms.example.com/secrets/web3?secretAddress={ADDR}")
        );
    }

    #[test]
    fn test_web2_url() {
        let url = SecretKind::Web2Secret
            .namespace()
            .url(&base(), &identity(Some("my token")))
            .unwrap();
        assert_eq!(
            url.as_str(),
            format!(
                "https://sms.example.com/secrets/web2?ownerAddress={ADDR}&secretName=my+token"
            )
        );
    }

    #[test]
    fn test_requester_url_encodes_name_segment() {
        let url = SecretKind::RequesterSecret
            .namespace()
            .url(&base(), &identity(Some("db/password")))
            .unwrap();
        assert_eq!(
            url.as_str(),
            format!("https://sms.example.com/requesters/{ADDR}/secrets/db%2Fpassword")
        );
    }

    #[test]
    fn test_dot_segment_names_rejected_for_path_identities() {
        let requester = SecretKind::RequesterSecret.namespace();
        for name in [".", ".."] {
            let err = requester
                .check_name(&SecretIdentity::named(ADDR, name))
                .unwrap_err();
            assert!(matches!(err, SmsError::InvalidInput(_)), "{name}: {err}");
        }
        assert!(requester
            .check_name(&SecretIdentity::named(ADDR, "..."))
            .is_ok());

        // Query parameters carry dots verbatim
        let web2 = SecretKind::Web2Secret.namespace();
        assert!(web2.check_name(&SecretIdentity::named(ADDR, "..")).is_ok());
        let url = web2.url(&base(), &identity(Some(".."))).unwrap();
        assert!(url.as_str().ends_with("secretName=.."));
    }

    #[test]
    fn test_app_url_keeps_base_path() {
        let base = Url::parse("https://sms.example.com/scone/").unwrap();
        let url = SecretKind::AppSecret
            .namespace()
            .url(&base, &identity(None))
            .unwrap();
        assert_eq!(
            url.as_str(),
            format!("https://sms.example.com/scone/apps/{ADDR}/secrets")
        );
    }

    #[test]
    fn test_write_method() {
        let web2 = SecretKind::Web2Secret.namespace();
        assert_eq!(web2.write_method(false), Method::POST);
        assert_eq!(web2.write_method(true), Method::PUT);

        let web3 = SecretKind::Web3Secret.namespace();
        assert_eq!(web3.write_method(true), Method::POST);
    }

    #[test]
    fn test_name_rules() {
        let named = SecretIdentity::named(ADDR, "token");
        let unnamed = SecretIdentity::address(ADDR);
        let empty = SecretIdentity::named(ADDR, "");

        assert!(SecretKind::Web2Secret.namespace().check_name(&named).is_ok());
        assert!(SecretKind::Web2Secret.namespace().check_name(&unnamed).is_err());
        assert!(SecretKind::RequesterSecret.namespace().check_name(&empty).is_err());
        assert!(SecretKind::Web3Secret.namespace().check_name(&unnamed).is_ok());
        assert!(SecretKind::AppSecret.namespace().check_name(&named).is_err());
    }

    #[test]
    fn test_app_challenge_uses_legacy_name() {
        let builder = ChallengeBuilder::new();
        let id = identity(None);
        assert_eq!(
            SecretKind::AppSecret
                .namespace()
                .challenge(&builder, &id, "v")
                .unwrap(),
            builder.app(&id.address, "v").unwrap()
        );
    }
}
