//! Client-local persistence for the signed-in state.
//!
//! The server is the source of truth for whether a session is valid; the
//! store only caches a boolean marker and the last-known user record so
//! route guards can render without a network round trip. A 401 from the
//! server always wins over whatever the store claims.

use crate::AuthUser;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

const AUTHENTICATED_KEY: &str = "sehat.authenticated";
const USER_KEY: &str = "sehat.user";
const SESSION_EXPIRED_KEY: &str = "sehat.session-expired";

/// Somewhere string-keyed values can be persisted between page loads.
///
/// Implementations must never fail loudly; an environment without usable
/// storage simply behaves as if every key were absent.
pub trait AuthStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// An in-process [`AuthStorage`] backed by a hash map.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self { MemoryStorage::default() }
}

impl AuthStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        match self.entries.lock() {
            Ok(entries) => entries.get(key).cloned(),
            Err(_) => None,
        }
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

/// The [`AuthStorage`] for environments without persistent storage, such as
/// a server-rendered pass where no browser storage exists. Every operation
/// is a no-op and every read comes back empty.
#[derive(Debug, Default, Copy, Clone)]
pub struct UnavailableStorage;

impl AuthStorage for UnavailableStorage {
    fn get(&self, _key: &str) -> Option<String> { None }

    fn set(&self, _key: &str, _value: &str) {}

    fn remove(&self, _key: &str) {}
}

/// A cloneable handle to the local auth state.
#[derive(Clone)]
pub struct AuthStore {
    storage: Arc<dyn AuthStorage>,
}

impl AuthStore {
    pub fn new(storage: Arc<dyn AuthStorage>) -> Self {
        AuthStore { storage }
    }

    /// An [`AuthStore`] over a fresh [`MemoryStorage`].
    pub fn in_memory() -> Self {
        AuthStore::new(Arc::new(MemoryStorage::new()))
    }

    /// Record a successful sign-in: the authenticated marker plus the
    /// cached user record.
    pub fn set_auth(&self, user: &AuthUser) {
        match serde_json::to_string(user) {
            Ok(serialized) => {
                self.storage.set(USER_KEY, &serialized);
                self.storage.set(AUTHENTICATED_KEY, "true");
            },
            Err(e) => log::warn!("Unable to serialize the user record: {}", e),
        }
    }

    /// Re-assert the authenticated marker without touching the cached user,
    /// e.g. after a silent session refresh.
    pub fn set_authenticated(&self) {
        self.storage.set(AUTHENTICATED_KEY, "true");
    }

    pub fn is_authenticated(&self) -> bool {
        self.storage.get(AUTHENTICATED_KEY).as_deref() == Some("true")
    }

    /// The cached user record, if one was stored and still parses.
    pub fn auth_user(&self) -> Option<AuthUser> {
        let raw = self.storage.get(USER_KEY)?;

        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                log::warn!("Discarding an unreadable user record: {}", e);
                None
            },
        }
    }

    /// Forget the signed-in state. The marker and the user record are
    /// always cleared together.
    pub fn clear(&self) {
        self.storage.remove(AUTHENTICATED_KEY);
        self.storage.remove(USER_KEY);
    }

    /// Leave a note for the login surface that the session ended
    /// involuntarily.
    pub fn mark_session_expired(&self) {
        self.storage.set(SESSION_EXPIRED_KEY, "true");
    }

    /// One-shot read of the session-expired note. Returns `true` at most
    /// once per expiry so the notice is only shown a single time.
    pub fn take_session_expired(&self) -> bool {
        let expired =
            self.storage.get(SESSION_EXPIRED_KEY).as_deref() == Some("true");
        if expired {
            self.storage.remove(SESSION_EXPIRED_KEY);
        }
        expired
    }
}

impl Default for AuthStore {
    fn default() -> Self { AuthStore::in_memory() }
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
