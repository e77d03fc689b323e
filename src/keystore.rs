//! Trust stores mapping token issuers to verification keys.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use crate::{AuthError, Key};

/// Trust store associating token issuers with keys.
///
/// A store never falls back to a key of another issuer; if no key is associated
/// with the issuer, [`Self::get()`] returns `None` and the token is rejected.
pub trait Keystore: Send + Sync {
    /// Associates `key` with `issuer`.
    fn trust(&self, issuer: &str, key: Key) -> Result<(), AuthError>;

    /// Removes the key associated with `issuer`, if any.
    fn revoke_trust(&self, issuer: &str);

    /// Returns the key associated with `issuer`.
    fn get(&self, issuer: &str) -> Option<Arc<Key>>;
}

impl<K: Keystore + ?Sized> Keystore for Arc<K> {
    fn trust(&self, issuer: &str, key: Key) -> Result<(), AuthError> {
        (**self).trust(issuer, key)
    }

    fn revoke_trust(&self, issuer: &str) {
        (**self).revoke_trust(issuer);
    }

    fn get(&self, issuer: &str) -> Option<Arc<Key>> {
        (**self).get(issuer)
    }
}

impl<K: Keystore + ?Sized> Keystore for &K {
    fn trust(&self, issuer: &str, key: Key) -> Result<(), AuthError> {
        (**self).trust(issuer, key)
    }

    fn revoke_trust(&self, issuer: &str) {
        (**self).revoke_trust(issuer);
    }

    fn get(&self, issuer: &str) -> Option<Arc<Key>> {
        (**self).get(issuer)
    }
}

/// Keystore with a single key trusted for all issuers.
///
/// Useful when every token is issued by the same party. The trusted key cannot be changed.
#[derive(Debug, Clone)]
pub struct SingleKeystore {
    key: Arc<Key>,
}

impl SingleKeystore {
    /// Creates a store trusting `key` for all issuers.
    pub fn new(key: impl Into<Key>) -> Self {
        Self {
            key: Arc::new(key.into()),
        }
    }

    /// Returns the trusted key.
    pub fn key(&self) -> &Key {
        &self.key
    }
}

impl Keystore for SingleKeystore {
    /// Succeeds only if `key` is equal to the already trusted key.
    fn trust(&self, issuer: &str, key: Key) -> Result<(), AuthError> {
        if key == *self.key {
            Ok(())
        } else {
            tracing::warn!(issuer, family = %key.family(), "single keystore refused to trust key");
            Err(AuthError::Unsupported(
                "cannot trust additional keys with a single keystore".to_owned(),
            ))
        }
    }

    /// Does nothing; the single key is trusted forever.
    fn revoke_trust(&self, _issuer: &str) {
        // no-op
    }

    fn get(&self, _issuer: &str) -> Option<Arc<Key>> {
        Some(Arc::clone(&self.key))
    }
}

/// Keystore mapping issuer names to keys. Can be modified at runtime and shared among threads.
///
/// # Examples
///
/// ```
/// # use jwt_gate::{Key, Keystore, NamedKeystore};
/// let store = NamedKeystore::new();
/// store.trust("alice", Key::hmac(b"alice's secret"))?;
/// assert!(store.get("alice").is_some());
/// assert!(store.get("bob").is_none());
/// store.revoke_trust("alice");
/// assert!(store.get("alice").is_none());
/// # Ok::<_, jwt_gate::AuthError>(())
/// ```
#[derive(Debug, Default)]
pub struct NamedKeystore {
    keys: RwLock<HashMap<String, Arc<Key>>>,
}

impl NamedKeystore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of trusted issuers.
    pub fn len(&self) -> usize {
        self.keys.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Checks whether the store trusts no issuers.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the trusted issuers in no particular order.
    pub fn issuers(&self) -> Vec<String> {
        let keys = self.keys.read().unwrap_or_else(PoisonError::into_inner);
        keys.keys().cloned().collect()
    }
}

impl FromIterator<(String, Key)> for NamedKeystore {
    fn from_iter<I: IntoIterator<Item = (String, Key)>>(iter: I) -> Self {
        let keys = iter
            .into_iter()
            .map(|(issuer, key)| (issuer, Arc::new(key)))
            .collect();
        Self {
            keys: RwLock::new(keys),
        }
    }
}

// Each mutation is a single insert or remove, so the map is consistent even if a thread
// panicked while holding the lock; poisoning is ignored.
impl Keystore for NamedKeystore {
    /// Associates `key` with `issuer`, replacing the previous key if any. Never fails.
    fn trust(&self, issuer: &str, key: Key) -> Result<(), AuthError> {
        let family = key.family();
        let mut keys = self.keys.write().unwrap_or_else(PoisonError::into_inner);
        let replaced = keys.insert(issuer.to_owned(), Arc::new(key)).is_some();
        drop(keys);
        tracing::info!(issuer, %family, replaced, "trusted key for issuer");
        Ok(())
    }

    fn revoke_trust(&self, issuer: &str) {
        let mut keys = self.keys.write().unwrap_or_else(PoisonError::into_inner);
        let removed = keys.remove(issuer).is_some();
        drop(keys);
        if removed {
            tracing::info!(issuer, "revoked trust for issuer");
        }
    }

    fn get(&self, issuer: &str) -> Option<Arc<Key>> {
        let keys = self.keys.read().unwrap_or_else(PoisonError::into_inner);
        keys.get(issuer).cloned()
    }
}
