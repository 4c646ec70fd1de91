//! Mock session store for testing.

use crate::binder::SessionToken;
use crate::error::{CoreError, Result};
use crate::providers::SessionStore;
use crate::state::UserId;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Mock session store.
///
/// Uses in-memory storage for testing.
#[derive(Debug, Clone, Default)]
pub struct MockSessionStore {
    sessions: Arc<Mutex<HashMap<SessionToken, UserId>>>,
}

impl MockSessionStore {
    /// Create a new mock session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn session_count(&self) -> Result<usize> {
        Ok(self.sessions.lock().map_err(Self::poisoned)?.len())
    }

    fn poisoned<T>(_: T) -> CoreError {
        CoreError::Store("mutex poisoned".to_string())
    }
}

impl SessionStore for MockSessionStore {
    fn put(
        &self,
        token: &SessionToken,
        user_id: UserId,
    ) -> impl Future<Output = Result<()>> + Send {
        let sessions = Arc::clone(&self.sessions);
        let token = token.clone();

        async move {
            sessions
                .lock()
                .map_err(Self::poisoned)?
                .insert(token, user_id);
            Ok(())
        }
    }

    fn get(&self, token: &SessionToken) -> impl Future<Output = Result<Option<UserId>>> + Send {
        let sessions = Arc::clone(&self.sessions);
        let token = token.clone();

        async move { Ok(sessions.lock().map_err(Self::poisoned)?.get(&token).copied()) }
    }

    fn remove(&self, token: &SessionToken) -> impl Future<Output = Result<()>> + Send {
        let sessions = Arc::clone(&self.sessions);
        let token = token.clone();

        async move {
            sessions.lock().map_err(Self::poisoned)?.remove(&token);
            Ok(())
        }
    }
}
