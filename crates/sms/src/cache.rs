//! Existence cache for SMS secrets
//!
//! Remembers secrets that a service confirmed to exist. Absences are never
//! stored: another client may push the secret at any moment, so a miss only
//! means "unknown, ask the service". Secrets are never deleted through this
//! client, which makes a positive entry valid for the life of the cache.
//!
//! Entries have no TTL and are never evicted.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::kind::SecretKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    service: String,
    kind: SecretKind,
    identity: String,
}

impl CacheKey {
    fn new(service: &str, kind: SecretKind, identity: &str) -> Self {
        Self {
            service: service.to_string(),
            kind,
            identity: identity.to_string(),
        }
    }
}

/// Append-only set of confirmed `(service, kind, identity)` triples.
///
/// Clones share the same entries, so one cache can back several clients.
#[derive(Debug, Clone, Default)]
pub struct SecretExistenceCache {
    entries: Arc<RwLock<HashSet<CacheKey>>>,
}

impl SecretExistenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Some(true)` if the secret was confirmed, `None` if unknown
    pub fn get(&self, service: &str, kind: SecretKind, identity: &str) -> Option<bool> {
        self.entries
            .read()
            .contains(&CacheKey::new(service, kind, identity))
            .then_some(true)
    }

    /// Record a confirmed secret. Idempotent.
    pub fn set_true(&self, service: &str, kind: SecretKind, identity: &str) {
        let key = CacheKey::new(service, kind, identity);
        if self.entries.read().contains(&key) {
            return;
        }
        self.entries.write().insert(key);
    }

    /// Number of confirmed secrets
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMS: &str = "https://sms.example.com/";
    const OTHER_SMS: &str = "https://sms.other.example.com/";
    const ID: &str = "0x1111111111111111111111111111111111111111";

    #[test]
    fn test_cache_basic() {
        let cache = SecretExistenceCache::new();

        // Initially unknown
        assert_eq!(cache.get(SMS, SecretKind::Web3Secret, ID), None);

        cache.set_true(SMS, SecretKind::Web3Secret, ID);
        assert_eq!(cache.get(SMS, SecretKind::Web3Secret, ID), Some(true));

        // Idempotent
        cache.set_true(SMS, SecretKind::Web3Secret, ID);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_keys_are_scoped() {
        let cache = SecretExistenceCache::new();
        cache.set_true(SMS, SecretKind::Web3Secret, ID);

        assert_eq!(cache.get(OTHER_SMS, SecretKind::Web3Secret, ID), None);
        assert_eq!(cache.get(SMS, SecretKind::AppSecret, ID), None);
        assert_eq!(
            cache.get(SMS, SecretKind::Web3Secret, &format!("{ID}|name")),
            None
        );
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = SecretExistenceCache::new();
        let clone = cache.clone();

        clone.set_true(SMS, SecretKind::Web2Secret, ID);
        assert_eq!(cache.get(SMS, SecretKind::Web2Secret, ID), Some(true));
        assert!(!cache.is_empty());
    }
}
