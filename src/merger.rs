//! Account merger.
//!
//! Applies the side effects decided by the
//! [`IdentityResolver`](crate::resolver::IdentityResolver): creating a
//! user, attaching or overwriting a credential sub-record, or detaching
//! one. Every write goes through a single deadline-wrapped `save` so a
//! slow store surfaces as [`CoreError::StoreTimeout`] instead of an
//! unbounded stall, and the store's write-time uniqueness re-check closes
//! the read-then-write race left open by the resolver's lookups.

use crate::error::{CoreError, RejectionReason, Result};
use crate::providers::UserStore;
use crate::state::{
    CredentialMutation, Identity, LocalCredential, NewUserSeed, Provider, ResolutionResult, User,
    UserId,
};
use crate::utils::normalize_email;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

/// Default deadline for a single store write.
const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Terminal outcome of a resolve/apply round trip.
///
/// Rejections stay ordinary values all the way through: `apply` maps
/// [`ResolutionResult::Rejected`] here rather than into an error.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// The attempt succeeded; bind the session to this user.
    Authenticated(User),

    /// The attempt was not honored; surface the reason to the user.
    Rejected(RejectionReason),
}

/// Applies resolver verdicts and credential mutations to the store.
#[derive(Debug, Clone)]
pub struct AccountMerger {
    store_timeout: Duration,
}

impl Default for AccountMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountMerger {
    /// Create a merger with the default store write deadline.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Create a merger with a caller-supplied store write deadline.
    #[must_use]
    pub const fn with_timeout(store_timeout: Duration) -> Self {
        Self { store_timeout }
    }

    /// Execute the side effects of a resolver verdict.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - A store write fails → `CoreError::Store`
    /// - The write deadline elapses → `CoreError::StoreTimeout`
    /// - A concurrent request claimed a unique key → `CoreError::Conflict`
    pub async fn apply(
        &self,
        resolution: ResolutionResult,
        store: &impl UserStore,
    ) -> Result<AuthOutcome> {
        match resolution {
            ResolutionResult::Authenticated(user) => Ok(AuthOutcome::Authenticated(user)),

            ResolutionResult::Rejected(reason) => Ok(AuthOutcome::Rejected(reason)),

            ResolutionResult::CreateAndAuthenticate(seed) => {
                let user = self.create_user(seed, store).await?;
                Ok(AuthOutcome::Authenticated(user))
            }

            ResolutionResult::LinkToSession { user, mutation } => {
                let user = match mutation {
                    CredentialMutation::AttachLocal {
                        email,
                        password_digest,
                    } => {
                        self.attach_local(user, &email, &password_digest, store)
                            .await?
                    }
                    CredentialMutation::AttachIdentity { provider, identity } => {
                        self.attach_identity(user, provider, identity, store).await?
                    }
                };
                Ok(AuthOutcome::Authenticated(user))
            }

            ResolutionResult::ReauthenticateAndRefresh {
                user,
                provider,
                identity,
            } => {
                let user = self.attach_identity(user, provider, identity, store).await?;
                Ok(AuthOutcome::Authenticated(user))
            }
        }
    }

    /// Allocate and persist a new user from a single-credential seed.
    ///
    /// The store re-checks the uniqueness invariants at write time; a
    /// concurrent request that claimed the same email or provider id
    /// since the resolver's lookup surfaces as `CoreError::Conflict`.
    ///
    /// # Errors
    ///
    /// Returns error if the store write fails, times out, or conflicts.
    pub async fn create_user(
        &self,
        seed: NewUserSeed,
        store: &impl UserStore,
    ) -> Result<User> {
        let now = Utc::now();
        let mut user = User {
            user_id: UserId::new(),
            local: None,
            identities: HashMap::new(),
            created_at: now,
            updated_at: now,
        };

        match seed {
            NewUserSeed::Local {
                email,
                password_digest,
            } => {
                user.local = Some(LocalCredential {
                    email: normalize_email(&email),
                    password_digest,
                });
            }
            NewUserSeed::Identity { provider, identity } => {
                user.identities.insert(provider, identity);
            }
        }

        let user = self.save(store, user).await?;
        info!(user_id = ?user.user_id, "created user");
        Ok(user)
    }

    /// Attach (or overwrite) the local credential and persist.
    ///
    /// Last write wins for a sub-record already owned by the same user.
    ///
    /// # Errors
    ///
    /// Returns error if the store write fails, times out, or the email is
    /// owned by another user (`CoreError::Conflict`).
    pub async fn attach_local(
        &self,
        mut user: User,
        email: &str,
        password_digest: &str,
        store: &impl UserStore,
    ) -> Result<User> {
        user.local = Some(LocalCredential {
            email: normalize_email(email),
            password_digest: password_digest.to_string(),
        });
        user.updated_at = Utc::now();

        let user = self.save(store, user).await?;
        info!(user_id = ?user.user_id, "attached local credential");
        Ok(user)
    }

    /// Attach (or overwrite) a provider identity and persist.
    ///
    /// Last write wins for a sub-record already owned by the same user.
    ///
    /// # Errors
    ///
    /// Returns error if the store write fails, times out, or the provider
    /// id is owned by another user (`CoreError::Conflict`).
    pub async fn attach_identity(
        &self,
        mut user: User,
        provider: Provider,
        identity: Identity,
        store: &impl UserStore,
    ) -> Result<User> {
        user.identities.insert(provider, identity);
        user.updated_at = Utc::now();

        let user = self.save(store, user).await?;
        info!(user_id = ?user.user_id, provider = provider.as_str(), "attached identity");
        Ok(user)
    }

    /// Detach the local credential and persist.
    ///
    /// Detaching when no local credential exists is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::LastCredential` if removal would leave the
    /// user with zero credentials, or a store error on write failure.
    pub async fn detach_local(&self, mut user: User, store: &impl UserStore) -> Result<User> {
        if user.local.is_none() {
            return Ok(user);
        }

        if user.credential_count() <= 1 {
            warn!(user_id = ?user.user_id, "refused to detach last credential (local)");
            return Err(CoreError::LastCredential);
        }

        user.local = None;
        user.updated_at = Utc::now();

        let user = self.save(store, user).await?;
        info!(user_id = ?user.user_id, "detached local credential");
        Ok(user)
    }

    /// Detach a provider identity and persist.
    ///
    /// Detaching a provider that is not linked is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::LastCredential` if removal would leave the
    /// user with zero credentials, or a store error on write failure.
    pub async fn detach_identity(
        &self,
        mut user: User,
        provider: Provider,
        store: &impl UserStore,
    ) -> Result<User> {
        if !user.identities.contains_key(&provider) {
            return Ok(user);
        }

        if user.credential_count() <= 1 {
            warn!(user_id = ?user.user_id, provider = provider.as_str(),
                  "refused to detach last credential");
            return Err(CoreError::LastCredential);
        }

        user.identities.remove(&provider);
        user.updated_at = Utc::now();

        let user = self.save(store, user).await?;
        info!(user_id = ?user.user_id, provider = provider.as_str(), "detached identity");
        Ok(user)
    }

    /// Persist under the configured deadline.
    ///
    /// Single-record writes are atomic at the store boundary, so an
    /// elapsed deadline never leaves a half-applied write.
    async fn save(&self, store: &impl UserStore, user: User) -> Result<User> {
        match tokio::time::timeout(self.store_timeout, store.save(&user)).await {
            Ok(result) => {
                if let Err(CoreError::Conflict(key)) = &result {
                    warn!(user_id = ?user.user_id, key = %key, "write-time uniqueness conflict");
                }
                result
            }
            Err(_) => Err(CoreError::StoreTimeout),
        }
    }
}
