//! Error types for the account-resolution core.
//!
//! The taxonomy is split in two. [`RejectionReason`] covers expected,
//! user-facing outcomes of an authentication attempt (wrong password,
//! taken email). These are ordinary values carried inside
//! [`ResolutionResult::Rejected`](crate::state::ResolutionResult) and are
//! never propagated as errors. [`CoreError`] covers infrastructural
//! failures (store errors, write conflicts, invariant guards) and travels
//! through `Result`.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Expected, user-facing reason an authentication attempt was not honored.
///
/// Rejections are returned as ordinary values, not errors: the caller
/// surfaces them as a retryable-by-the-user message.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// The email is already claimed by another account.
    #[error("that email is already taken")]
    EmailTaken,

    /// No account exists for the given email.
    #[error("no user found")]
    NoSuchUser,

    /// The password did not match the stored digest.
    #[error("invalid password")]
    InvalidPassword,

    /// The email is structurally invalid (or empty).
    #[error("invalid email address")]
    InvalidEmail,

    /// The credential is already linked to the acting account.
    ///
    /// This is a no-op outcome, not an error condition.
    #[error("credential is already linked to this account")]
    AlreadyLinked,

    /// The provider identity is already linked to a different account.
    #[error("identity is already linked to another account")]
    AlreadyLinkedToAnotherAccount,
}

/// Infrastructural failure in the core or its backing store.
///
/// Unlike [`RejectionReason`], these are surfaced to the transport layer
/// as a generic failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The underlying store failed.
    #[error("store error: {0}")]
    Store(String),

    /// A store operation exceeded its deadline.
    ///
    /// Single-record writes are atomic at the store boundary, so a timed
    /// out operation is never half-applied and is safe to retry.
    #[error("store operation timed out")]
    StoreTimeout,

    /// A write-time uniqueness re-check failed.
    ///
    /// A concurrent request claimed the same unique key between the
    /// resolver's lookup and this write. The caller must re-resolve from
    /// scratch rather than retry the write.
    #[error("unique key conflict: {0}")]
    Conflict(String),

    /// Detaching the credential would leave the user with no way to
    /// authenticate.
    #[error("cannot remove the last remaining credential")]
    LastCredential,
}

impl CoreError {
    /// Returns `true` if the caller may safely retry the failed operation
    /// as-is.
    ///
    /// Only [`CoreError::StoreTimeout`] qualifies: writes are keyed and
    /// atomic, so an idempotent retry cannot double-apply. A
    /// [`CoreError::Conflict`] requires re-resolution and a
    /// [`CoreError::LastCredential`] is a logic error in the caller.
    ///
    /// # Examples
    ///
    /// ```
    /// # use identity_link::CoreError;
    /// assert!(CoreError::StoreTimeout.is_retryable());
    /// assert!(!CoreError::Conflict("local.email".into()).is_retryable());
    /// ```
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreTimeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_timeout_is_retryable() {
        assert!(CoreError::StoreTimeout.is_retryable());
        assert!(!CoreError::Store("boom".to_string()).is_retryable());
        assert!(!CoreError::Conflict("facebook:123".to_string()).is_retryable());
        assert!(!CoreError::LastCredential.is_retryable());
    }

    #[test]
    fn test_rejection_messages_are_user_facing() {
        assert_eq!(
            RejectionReason::EmailTaken.to_string(),
            "that email is already taken"
        );
        assert_eq!(RejectionReason::NoSuchUser.to_string(), "no user found");
        assert_eq!(
            RejectionReason::InvalidPassword.to_string(),
            "invalid password"
        );
    }
}
