use std::fmt;
use std::str::FromStr;

use common::address::Address;
use serde::{Deserialize, Serialize};

use crate::namespace::{self, SecretNamespace};

/// The four secret namespaces of the SMS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretKind {
    /// Dataset decryption key, keyed by the dataset address
    Web3Secret,
    /// Named secret of an account (result-encryption key, storage tokens)
    Web2Secret,
    /// Named secret a requester hands to its tasks
    RequesterSecret,
    /// Developer secret of an app, keyed by the app address
    AppSecret,
}

impl SecretKind {
    pub const ALL: [SecretKind; 4] = [
        SecretKind::Web3Secret,
        SecretKind::Web2Secret,
        SecretKind::RequesterSecret,
        SecretKind::AppSecret,
    ];

    /// Registry row describing how this kind is addressed and written
    pub fn namespace(&self) -> &'static SecretNamespace {
        namespace::lookup(*self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SecretKind::Web3Secret => "web3",
            SecretKind::Web2Secret => "web2",
            SecretKind::RequesterSecret => "requester",
            SecretKind::AppSecret => "app",
        }
    }
}

impl fmt::Display for SecretKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecretKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SecretKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown secret kind `{s}` (expected web3, web2, requester or app)"))
    }
}

/// Caller-supplied identity of a secret, not yet validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretIdentity {
    /// Owner address for named secrets, resource address otherwise
    pub address: String,
    pub name: Option<String>,
}

impl SecretIdentity {
    /// Identity of a secret keyed by an address alone (web3 and app secrets)
    pub fn address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: None,
        }
    }

    /// Identity of a named secret (web2 and requester secrets)
    pub fn named(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: Some(name.into()),
        }
    }
}

/// Identity whose address passed validation and whose name fits its namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedIdentity {
    pub address: Address,
    pub name: Option<String>,
}

impl ResolvedIdentity {
    /// Stable key for the existence cache: `address` or `address|name`
    pub fn cache_key(&self) -> String {
        match &self.name {
            Some(name) => format!("{}|{}", self.address, name),
            None => self.address.to_checksum(),
        }
    }
}

impl fmt::Display for ResolvedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} (name `{}`)", self.address, name),
            None => write!(f, "{}", self.address),
        }
    }
}
