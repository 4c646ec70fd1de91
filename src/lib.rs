//! # Identity Link
//!
//! Account-resolution and credential-linking core for systems that
//! authenticate users through a local email/password credential or
//! third-party identity providers, reconciling every credential onto a
//! single logical user account.
//!
//! ## Features
//!
//! - **Two-phase**: a pure, read-only resolver decides; a merger applies
//! - **Conflict-safe**: write-time uniqueness re-checks close lookup races
//! - **Type-safe**: verdicts and rejections as tagged variants, not flags
//! - **Testable**: the whole decision core runs at memory speed on mocks
//!
//! ## Architecture
//!
//! ```text
//! AuthAttempt → IdentityResolver::resolve → ResolutionResult
//!                                              │
//!                                              ▼
//!                              AccountMerger::apply → AuthOutcome
//!                                              │
//!                                              ▼
//!                                   SessionBinder::bind
//! ```
//!
//! ## Example: local signup
//!
//! ```rust
//! use identity_link::{
//!     AccountMerger, AttemptKind, AuthAttempt, AuthIntent, AuthOutcome, IdentityResolver,
//!     mocks::{MockHasher, MockUserStore},
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> identity_link::Result<()> {
//! let store = MockUserStore::new();
//! let resolver = IdentityResolver::new(MockHasher::new());
//! let merger = AccountMerger::new();
//!
//! let attempt = AuthAttempt {
//!     kind: AttemptKind::LocalSignup {
//!         email: "Bob@Example.com".to_string(),
//!         password: "secret".to_string(),
//!     },
//!     acting_session: None,
//!     intent: AuthIntent::Authenticate,
//! };
//!
//! let resolution = resolver.resolve(&attempt, &store).await?;
//! let outcome = merger.apply(resolution, &store).await?;
//!
//! let AuthOutcome::Authenticated(user) = outcome else {
//!     panic!("signup should authenticate");
//! };
//! assert_eq!(user.local.as_ref().map(|l| l.email.as_str()), Some("bob@example.com"));
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]

// Public modules
pub mod binder;
pub mod error;
pub mod merger;
pub mod providers;
pub mod resolver;
pub mod state;
pub mod utils;

#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types for convenience
pub use binder::{SessionBinder, SessionToken};
pub use error::{CoreError, RejectionReason, Result};
pub use merger::{AccountMerger, AuthOutcome};
pub use providers::{CredentialHasher, SessionStore, UserStore};
pub use resolver::IdentityResolver;
pub use state::{
    AttemptKind, AuthAttempt, AuthIntent, CredentialMutation, Identity, LocalCredential,
    NewUserSeed, Provider, ProviderProfile, ResolutionResult, User, UserId,
};
