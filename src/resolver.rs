//! Identity resolver.
//!
//! This module implements the pure decision logic for account resolution:
//! given a normalized [`AuthAttempt`] and the current session's user (if
//! any), decide whether to create a new account, attach a credential to
//! the acting account, re-authenticate an existing account, or reject.
//!
//! # Flow
//!
//! ```text
//! AuthAttempt → IdentityResolver::resolve → ResolutionResult
//!                                              │
//!                                              ▼
//!                                   AccountMerger::apply (writes)
//! ```
//!
//! The resolver performs only read lookups against the [`UserStore`];
//! every store mutation is decided here but executed by the merger. The
//! two-phase split keeps the branch tables synchronously testable.

use crate::error::{RejectionReason, Result};
use crate::providers::{CredentialHasher, UserStore};
use crate::state::{
    AttemptKind, AuthAttempt, CredentialMutation, NewUserSeed, Provider, ProviderProfile,
    ResolutionResult, User,
};
use crate::utils::{is_valid_email, normalize_email};
use tracing::debug;

/// Account-resolution decision engine.
///
/// Holds the external [`CredentialHasher`] so signup attempts can carry a
/// ready-to-store digest in their verdict and login attempts can verify
/// without touching the store twice.
#[derive(Debug, Clone)]
pub struct IdentityResolver<H> {
    hasher: H,
}

impl<H: CredentialHasher> IdentityResolver<H> {
    /// Create a resolver around the given hasher.
    pub const fn new(hasher: H) -> Self {
        Self { hasher }
    }

    /// Resolve an authentication attempt into a verdict.
    ///
    /// Read-only with respect to the store; the returned
    /// [`ResolutionResult`] tells the merger which (if any) mutation to
    /// apply.
    ///
    /// # Errors
    ///
    /// Returns error if a store lookup fails. Expected outcomes such as a
    /// taken email or a wrong password are rejections inside the verdict,
    /// not errors.
    pub async fn resolve(
        &self,
        attempt: &AuthAttempt,
        store: &impl UserStore,
    ) -> Result<ResolutionResult> {
        match &attempt.kind {
            AttemptKind::LocalSignup { email, password } => {
                self.resolve_local_signup(email, password, attempt.acting_session.as_ref(), store)
                    .await
            }
            AttemptKind::LocalLogin { email, password } => {
                self.resolve_local_login(email, password, store).await
            }
            AttemptKind::ProviderCallback { provider, profile } => {
                Self::resolve_provider_callback(
                    *provider,
                    profile,
                    attempt.acting_session.as_ref(),
                    store,
                )
                .await
            }
        }
    }

    async fn resolve_local_signup(
        &self,
        email: &str,
        password: &str,
        acting_session: Option<&User>,
        store: &impl UserStore,
    ) -> Result<ResolutionResult> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            debug!(email = %email, "signup rejected: invalid email");
            return Ok(ResolutionResult::Rejected(RejectionReason::InvalidEmail));
        }

        match acting_session {
            None => {
                if store.find_by_local_email(&email).await?.is_some() {
                    debug!(email = %email, "signup rejected: email taken");
                    return Ok(ResolutionResult::Rejected(RejectionReason::EmailTaken));
                }

                debug!(email = %email, "signup resolved: create new local user");
                Ok(ResolutionResult::CreateAndAuthenticate(NewUserSeed::Local {
                    email,
                    password_digest: self.hasher.hash(password),
                }))
            }

            // Signing up while already holding a local credential is a
            // no-op, not an error: re-authenticate the acting user.
            Some(user) if user.local.is_some() => {
                debug!(user_id = ?user.user_id, "signup resolved: already has local credential");
                Ok(ResolutionResult::Authenticated(user.clone()))
            }

            // Logged in without a local credential: connect one, unless
            // the email belongs to someone else.
            Some(user) => {
                if store.find_by_local_email(&email).await?.is_some() {
                    debug!(email = %email, user_id = ?user.user_id, "connect-local rejected: email taken");
                    return Ok(ResolutionResult::Rejected(RejectionReason::EmailTaken));
                }

                debug!(email = %email, user_id = ?user.user_id, "signup resolved: attach local credential");
                Ok(ResolutionResult::LinkToSession {
                    user: user.clone(),
                    mutation: CredentialMutation::AttachLocal {
                        email,
                        password_digest: self.hasher.hash(password),
                    },
                })
            }
        }
    }

    async fn resolve_local_login(
        &self,
        email: &str,
        password: &str,
        store: &impl UserStore,
    ) -> Result<ResolutionResult> {
        let email = normalize_email(email);

        let Some(user) = store.find_by_local_email(&email).await? else {
            debug!(email = %email, "login rejected: no user found");
            return Ok(ResolutionResult::Rejected(RejectionReason::NoSuchUser));
        };

        let Some(local) = &user.local else {
            // A user surfaced by email lookup always carries a local
            // credential; a store returning otherwise is treated as no
            // match rather than a panic path.
            return Ok(ResolutionResult::Rejected(RejectionReason::NoSuchUser));
        };

        if !self.hasher.verify(password, &local.password_digest) {
            debug!(email = %email, "login rejected: invalid password");
            return Ok(ResolutionResult::Rejected(RejectionReason::InvalidPassword));
        }

        debug!(user_id = ?user.user_id, "login resolved: authenticated");
        Ok(ResolutionResult::Authenticated(user))
    }

    async fn resolve_provider_callback(
        provider: Provider,
        profile: &ProviderProfile,
        acting_session: Option<&User>,
        store: &impl UserStore,
    ) -> Result<ResolutionResult> {
        let identity = profile.to_identity();
        let owner = store
            .find_by_provider_id(provider, &profile.provider_user_id)
            .await?;

        match acting_session {
            None => match owner {
                Some(user) => {
                    let token_present = user
                        .identity(provider)
                        .is_some_and(|i| i.token.as_deref().is_some_and(|t| !t.is_empty()));

                    if token_present {
                        debug!(user_id = ?user.user_id, provider = provider.as_str(),
                               "callback resolved: authenticated");
                        Ok(ResolutionResult::Authenticated(user))
                    } else {
                        // The identity was linked at one point and then
                        // removed: refresh token, name, and email on the
                        // way back in.
                        debug!(user_id = ?user.user_id, provider = provider.as_str(),
                               "callback resolved: re-authenticate and refresh identity");
                        Ok(ResolutionResult::ReauthenticateAndRefresh {
                            user,
                            provider,
                            identity,
                        })
                    }
                }
                None => {
                    debug!(provider = provider.as_str(),
                           provider_user_id = %profile.provider_user_id,
                           "callback resolved: create new user");
                    Ok(ResolutionResult::CreateAndAuthenticate(
                        NewUserSeed::Identity { provider, identity },
                    ))
                }
            },

            Some(session_user) => {
                // The identity must not be stolen from another account.
                if let Some(other) = &owner {
                    if other.user_id != session_user.user_id {
                        debug!(provider = provider.as_str(),
                               provider_user_id = %profile.provider_user_id,
                               owner = ?other.user_id, acting = ?session_user.user_id,
                               "link rejected: identity owned by another account");
                        return Ok(ResolutionResult::Rejected(
                            RejectionReason::AlreadyLinkedToAnotherAccount,
                        ));
                    }
                }

                // Re-linking the exact credential already attached needs
                // no write at all.
                if session_user.identity(provider) == Some(&identity) {
                    debug!(user_id = ?session_user.user_id, provider = provider.as_str(),
                           "link resolved: already linked, no-op");
                    return Ok(ResolutionResult::Rejected(RejectionReason::AlreadyLinked));
                }

                debug!(user_id = ?session_user.user_id, provider = provider.as_str(),
                       "link resolved: attach identity to session user");
                Ok(ResolutionResult::LinkToSession {
                    user: session_user.clone(),
                    mutation: CredentialMutation::AttachIdentity { provider, identity },
                })
            }
        }
    }
}
