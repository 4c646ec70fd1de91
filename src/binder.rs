//! Session binder.
//!
//! Maps an authenticated user to an opaque session token and back. The
//! token stores only the user id; `resolve_session` re-reads the user
//! record on every call, so a session whose user vanished by external
//! means resolves to `None` instead of failing.

use crate::error::Result;
use crate::providers::{SessionStore, UserStore};
use crate::state::{AuthAttempt, AuthIntent, User};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Opaque session token handed to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh token from 256 bits of randomness.
    #[must_use]
    pub fn generate() -> Self {
        let bytes: [u8; 32] = rand::random();
        Self(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    /// The token's wire form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionToken {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Binds logical users to session tokens.
///
/// State machine for a single client session:
///
/// ```text
/// Anonymous --login/signup success--> Authenticated --logout--> Anonymous
/// ```
///
/// `Authenticated` sessions may additionally execute link/unlink intents
/// without leaving the state; [`SessionBinder::may_link`] is the guard
/// the transport layer consults before building such an attempt.
#[derive(Debug, Clone)]
pub struct SessionBinder<S> {
    sessions: S,
}

impl<S: SessionStore> SessionBinder<S> {
    /// Create a binder over the given session store.
    pub const fn new(sessions: S) -> Self {
        Self { sessions }
    }

    /// Establish a session for `user` and return its token.
    ///
    /// # Errors
    ///
    /// Returns error if the session store write fails.
    pub async fn bind(&self, user: &User) -> Result<SessionToken> {
        let token = SessionToken::generate();
        self.sessions.put(&token, user.user_id).await?;
        info!(user_id = ?user.user_id, "session bound");
        Ok(token)
    }

    /// Resolve a token back to its user.
    ///
    /// # Returns
    ///
    /// `None` if the token is unknown or the user id no longer resolves
    /// (user deleted by external means).
    ///
    /// # Errors
    ///
    /// Returns error if a store query fails.
    pub async fn resolve_session(
        &self,
        token: &SessionToken,
        users: &impl UserStore,
    ) -> Result<Option<User>> {
        let Some(user_id) = self.sessions.get(token).await? else {
            return Ok(None);
        };
        users.find_by_id(user_id).await
    }

    /// Invalidate a session (logout). Idempotent.
    ///
    /// # Errors
    ///
    /// Returns error if the session store write fails.
    pub async fn unbind(&self, token: &SessionToken) -> Result<()> {
        self.sessions.remove(token).await?;
        info!("session unbound");
        Ok(())
    }

    /// Whether the attempt's intent is allowed in its session state.
    ///
    /// Link (and unlink) intents require an authenticated session; plain
    /// authentication is always allowed. The transport layer consults
    /// this before handing the attempt to the resolver.
    #[must_use]
    pub const fn may_link(&self, attempt: &AuthAttempt) -> bool {
        match attempt.intent {
            AuthIntent::Authenticate => true,
            AuthIntent::Link => attempt.acting_session.is_some(),
        }
    }
}
