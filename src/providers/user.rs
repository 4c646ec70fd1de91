//! User store trait.

use crate::error::Result;
use crate::state::{Provider, User, UserId};

/// User persistence.
///
/// This trait abstracts over user storage, keyed by user id and by the
/// credential lookup keys (`local.email`, `(provider, provider_user_id)`).
/// The store must provide at-least read-your-writes consistency per
/// record.
///
/// # Implementation Notes
///
/// Lookups take already-normalized (lowercased) emails; the core
/// normalizes before every call. `save` is the single write entry point
/// and carries the uniqueness re-check that closes the read-then-write
/// race between the resolver's lookup and the merger's write.
pub trait UserStore: Send + Sync {
    /// Find a user by id.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    fn find_by_id(
        &self,
        user_id: UserId,
    ) -> impl std::future::Future<Output = Result<Option<User>>> + Send;

    /// Find the user owning `email` as a local credential.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    fn find_by_local_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>>> + Send;

    /// Find the user owning `(provider, provider_user_id)`.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    fn find_by_provider_id(
        &self,
        provider: Provider,
        provider_user_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>>> + Send;

    /// Persist `user`, inserting or overwriting its record.
    ///
    /// When the write introduces a new unique key value (a local email or
    /// a provider user id not previously owned by this user), the store
    /// must re-check uniqueness atomically with the write, via a unique
    /// index, conditional write, or equivalent compare-and-swap.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The write fails → `CoreError::Store`
    /// - A unique key is owned by another user → `CoreError::Conflict`
    fn save(&self, user: &User) -> impl std::future::Future<Output = Result<User>> + Send;
}
