//! Session store trait.

use crate::binder::SessionToken;
use crate::error::Result;
use crate::state::UserId;

/// Session persistence.
///
/// This trait abstracts over the opaque-token-to-user mapping behind the
/// [`SessionBinder`](crate::binder::SessionBinder). Only the user id is
/// stored; the binder re-reads the user record on every
/// `resolve_session` so a stale session never resurrects deleted or
/// outdated user data.
pub trait SessionStore: Send + Sync {
    /// Bind `token` to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns error if the store write fails.
    fn put(
        &self,
        token: &SessionToken,
        user_id: UserId,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Look up the user id bound to `token`.
    ///
    /// # Returns
    ///
    /// `None` if the token is unknown (never issued, or unbound).
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    fn get(
        &self,
        token: &SessionToken,
    ) -> impl std::future::Future<Output = Result<Option<UserId>>> + Send;

    /// Remove the binding for `token`. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns error if the store write fails.
    fn remove(
        &self,
        token: &SessionToken,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
