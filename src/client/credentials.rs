//! Credential store interface.
//!
//! The real store (secure device storage) lives outside this crate; the
//! access layer only needs to read the token and role, and to report a
//! rejected token so the store can drop it.

use std::sync::RwLock;

/// External credential holder: auth token plus the user's role.
pub trait CredentialStore: Send + Sync {
    /// The current auth token, if a session exists.
    fn token(&self) -> Option<String>;

    /// The stored role string ("admin", "business", "customer", ...).
    fn role(&self) -> Option<String>;

    /// Persist a fresh token and optional role after login.
    fn store(&self, token: String, role: Option<String>);

    /// Drop the token. Called when the backend answers 401.
    fn clear_token(&self);
}

#[derive(Debug, Default)]
struct Slot {
    token: Option<String>,
    role: Option<String>,
}

/// In-memory credential store for the CLI and tests.
#[derive(Debug, Default)]
pub struct MemoryCredentials {
    inner: RwLock<Slot>,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a known token and role.
    pub fn with_session(token: impl Into<String>, role: impl Into<String>) -> Self {
        let store = Self::new();
        store.store(token.into(), Some(role.into()));
        store
    }
}

impl CredentialStore for MemoryCredentials {
    fn token(&self) -> Option<String> {
        self.inner.read().ok().and_then(|slot| slot.token.clone())
    }

    fn role(&self) -> Option<String> {
        self.inner.read().ok().and_then(|slot| slot.role.clone())
    }

    fn store(&self, token: String, role: Option<String>) {
        if let Ok(mut slot) = self.inner.write() {
            slot.token = Some(token);
            if role.is_some() {
                slot.role = role;
            }
        }
    }

    fn clear_token(&self) {
        if let Ok(mut slot) = self.inner.write() {
            slot.token = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_clear() {
        let store = MemoryCredentials::new();
        assert!(store.token().is_none());

        store.store("tok-1".into(), Some("business".into()));
        assert_eq!(store.token().as_deref(), Some("tok-1"));
        assert_eq!(store.role().as_deref(), Some("business"));

        store.clear_token();
        assert!(store.token().is_none());
        // Role survives a token clear; only the session is invalidated.
        assert_eq!(store.role().as_deref(), Some("business"));
    }

    #[test]
    fn test_store_without_role_keeps_existing() {
        let store = MemoryCredentials::with_session("tok-1", "admin");
        store.store("tok-2".into(), None);
        assert_eq!(store.token().as_deref(), Some("tok-2"));
        assert_eq!(store.role().as_deref(), Some("admin"));
    }
}
