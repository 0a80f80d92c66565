//! Client-side session state

use std::sync::{Arc, RwLock};

use taskvault_types::PublicUser;

/// Point-in-time copy of the session, as handed to a [`SessionStore`]
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub access_token: Option<String>,
    pub user: Option<PublicUser>,
}

/// Persistence adapter for session state.
///
/// The context writes through on every change; implementations decide
/// where the snapshot lives (a file, a keyring, nothing at all). Tests
/// swap in an in-memory store.
pub trait SessionStore: Send + Sync {
    /// Load any previously saved session
    fn load(&self) -> Option<SessionSnapshot>;

    /// Persist the current session
    fn save(&self, snapshot: &SessionSnapshot);

    /// Forget any persisted session
    fn clear(&self);
}

/// Shared session state: the cached access token and the logged-in user.
///
/// Cheap to clone; all clones observe the same state. The refresh token
/// itself never appears here, it lives only in the HTTP cookie jar.
#[derive(Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<SessionState>>,
    store: Option<Arc<dyn SessionStore>>,
}

#[derive(Default)]
struct SessionState {
    access_token: Option<String>,
    user: Option<PublicUser>,
}

impl SessionContext {
    /// Create an empty session with no persistence
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session backed by a persistence adapter, restoring any
    /// previously saved state.
    pub fn with_store(store: Arc<dyn SessionStore>) -> Self {
        let state = match store.load() {
            Some(snapshot) => SessionState {
                access_token: snapshot.access_token,
                user: snapshot.user,
            },
            None => SessionState::default(),
        };

        Self {
            inner: Arc::new(RwLock::new(state)),
            store: Some(store),
        }
    }

    /// Cached access token, if logged in
    pub fn access_token(&self) -> Option<String> {
        self.inner.read().expect("session lock poisoned").access_token.clone()
    }

    /// The logged-in user, if any
    pub fn user(&self) -> Option<PublicUser> {
        self.inner.read().expect("session lock poisoned").user.clone()
    }

    /// Whether a token is currently cached
    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .expect("session lock poisoned")
            .access_token
            .is_some()
    }

    /// Replace the cached access token
    pub fn set_access_token(&self, token: impl Into<String>) {
        let mut state = self.inner.write().expect("session lock poisoned");
        state.access_token = Some(token.into());
        self.persist(&state);
    }

    /// Record the logged-in user
    pub fn set_user(&self, user: PublicUser) {
        let mut state = self.inner.write().expect("session lock poisoned");
        state.user = Some(user);
        self.persist(&state);
    }

    /// Drop all session state
    pub fn clear(&self) {
        let mut state = self.inner.write().expect("session lock poisoned");
        state.access_token = None;
        state.user = None;
        if let Some(store) = &self.store {
            store.clear();
        }
    }

    fn persist(&self, state: &SessionState) {
        if let Some(store) = &self.store {
            store.save(&SessionSnapshot {
                access_token: state.access_token.clone(),
                user: state.user.clone(),
            });
        }
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.read().expect("session lock poisoned");
        f.debug_struct("SessionContext")
            .field("authenticated", &state.access_token.is_some())
            .field("user", &state.user.as_ref().map(|u| u.email.clone()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Option<SessionSnapshot>>,
    }

    impl SessionStore for MemoryStore {
        fn load(&self) -> Option<SessionSnapshot> {
            self.saved.lock().unwrap().clone()
        }

        fn save(&self, snapshot: &SessionSnapshot) {
            *self.saved.lock().unwrap() = Some(snapshot.clone());
        }

        fn clear(&self) {
            *self.saved.lock().unwrap() = None;
        }
    }

    #[test]
    fn test_clones_share_state() {
        let session = SessionContext::new();
        let other = session.clone();

        session.set_access_token("token-1");
        assert_eq!(other.access_token().as_deref(), Some("token-1"));
        assert!(other.is_authenticated());

        other.clear();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_debug_hides_token() {
        let session = SessionContext::new();
        session.set_access_token("super-secret-token");

        let debug = format!("{session:?}");
        assert!(!debug.contains("super-secret-token"));
    }

    #[test]
    fn test_store_writes_through_and_restores() {
        let store = Arc::new(MemoryStore::default());

        let session = SessionContext::with_store(store.clone());
        session.set_access_token("token-1");

        // A fresh context over the same store picks the session back up
        let restored = SessionContext::with_store(store.clone());
        assert_eq!(restored.access_token().as_deref(), Some("token-1"));

        restored.clear();
        assert!(store.load().is_none());

        let empty = SessionContext::with_store(store);
        assert!(!empty.is_authenticated());
    }
}
