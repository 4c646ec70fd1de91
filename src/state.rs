//! Core state types for account resolution and credential linking.
//!
//! All types are `Clone` so the resolver can stay pure: it reads, decides,
//! and hands the merger a self-contained verdict.

use crate::error::RejectionReason;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for a user.
///
/// Assigned at creation, immutable for the lifetime of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub uuid::Uuid);

impl UserId {
    /// Generate a new random `UserId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Providers & Credentials
// ═══════════════════════════════════════════════════════════════════════

/// Third-party identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    /// Facebook OAuth2.
    Facebook,
    /// Twitter OAuth1.
    Twitter,
    /// Google OAuth2.
    Google,
    /// LinkedIn OAuth2.
    LinkedIn,
}

impl Provider {
    /// Get the provider name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::Google => "google",
            Self::LinkedIn => "linkedin",
        }
    }

    /// Parse provider from string.
    ///
    /// # Errors
    ///
    /// Returns error if the provider string is not recognized.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "facebook" => Ok(Self::Facebook),
            "twitter" => Ok(Self::Twitter),
            "google" => Ok(Self::Google),
            "linkedin" => Ok(Self::LinkedIn),
            _ => Err(format!("Unknown provider: {s}")),
        }
    }
}

/// Local email/password credential.
///
/// The email is stored lowercased; the digest comes from the external
/// [`CredentialHasher`](crate::providers::CredentialHasher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCredential {
    /// Email address (lowercased, unique across all users).
    pub email: String,

    /// One-way password digest.
    pub password_digest: String,
}

/// Provider-specific credential sub-record attached to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-side user id (unique per provider across all users).
    pub provider_user_id: String,

    /// Provider access token.
    ///
    /// `None` models an identity that was linked at one point and then
    /// removed; a returning callback for it refreshes the record instead
    /// of creating a duplicate account.
    pub token: Option<String>,

    /// Display name from the provider profile.
    pub display_name: Option<String>,

    /// Email from the provider profile (lowercased).
    pub email: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// User Aggregate
// ═══════════════════════════════════════════════════════════════════════

/// The central user aggregate.
///
/// A user holds at least one non-empty credential (local or at least one
/// identity) at all times except during the transient creation step; the
/// [`AccountMerger`](crate::merger::AccountMerger) enforces this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier.
    pub user_id: UserId,

    /// Local credential, if the user has one.
    pub local: Option<LocalCredential>,

    /// Provider identities keyed by provider.
    pub identities: HashMap<Provider, Identity>,

    /// Account created timestamp.
    pub created_at: DateTime<Utc>,

    /// Last updated timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Number of credentials currently attached.
    #[must_use]
    pub fn credential_count(&self) -> usize {
        usize::from(self.local.is_some()) + self.identities.len()
    }

    /// The identity linked for `provider`, if any.
    #[must_use]
    pub fn identity(&self, provider: Provider) -> Option<&Identity> {
        self.identities.get(&provider)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Authentication Attempts
// ═══════════════════════════════════════════════════════════════════════

/// Which endpoint category produced the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthIntent {
    /// Normal login, signup, or provider login.
    Authenticate,

    /// Explicit "connect this credential to my current account".
    Link,
}

/// Already-verified profile data from a provider callback.
///
/// Token exchange and signature/state verification happen upstream; the
/// core only consumes the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderProfile {
    /// Provider-side user id.
    pub provider_user_id: String,

    /// Access token from the completed handshake.
    pub token: String,

    /// Display name from the profile.
    pub display_name: Option<String>,

    /// Profile email, if the provider shared one.
    pub email: Option<String>,
}

impl ProviderProfile {
    /// Build the identity sub-record this profile attaches.
    ///
    /// Profile emails are lowercased here so no raw-cased email ever
    /// reaches a comparison or the store.
    #[must_use]
    pub fn to_identity(&self) -> Identity {
        Identity {
            provider_user_id: self.provider_user_id.clone(),
            token: Some(self.token.clone()),
            display_name: self.display_name.clone(),
            email: self
                .email
                .as_deref()
                .map(crate::utils::normalize_email)
                .filter(|e| !e.is_empty()),
        }
    }
}

/// The kind of authentication attempt being resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptKind {
    /// Local email/password signup.
    LocalSignup {
        /// Email address.
        email: String,
        /// Plaintext password (hashed by the resolver, never stored).
        password: String,
    },

    /// Local email/password login.
    LocalLogin {
        /// Email address.
        email: String,
        /// Plaintext password.
        password: String,
    },

    /// Completed, verified callback from a provider.
    ProviderCallback {
        /// Provider the callback came from.
        provider: Provider,
        /// Verified profile data.
        profile: ProviderProfile,
    },
}

/// A normalized inbound authentication attempt.
///
/// The transport layer builds one of these per request; the session user
/// is an explicit input so the resolver stays pure and testable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthAttempt {
    /// What is being attempted.
    pub kind: AttemptKind,

    /// The user bound to the request's session, or `None` if anonymous.
    pub acting_session: Option<User>,

    /// Which endpoint category invoked the attempt.
    pub intent: AuthIntent,
}

// ═══════════════════════════════════════════════════════════════════════
// Resolution
// ═══════════════════════════════════════════════════════════════════════

/// Seed for a brand new user record carrying its single initial credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewUserSeed {
    /// Seed with a local credential.
    Local {
        /// Email address (lowercased).
        email: String,
        /// Password digest.
        password_digest: String,
    },

    /// Seed with a provider identity.
    Identity {
        /// Provider owning the identity.
        provider: Provider,
        /// The identity sub-record.
        identity: Identity,
    },
}

/// Credential mutation to apply to an existing user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialMutation {
    /// Attach (or overwrite) the local credential.
    AttachLocal {
        /// Email address (lowercased).
        email: String,
        /// Password digest.
        password_digest: String,
    },

    /// Attach (or overwrite) a provider identity.
    AttachIdentity {
        /// Provider owning the identity.
        provider: Provider,
        /// The identity sub-record.
        identity: Identity,
    },
}

/// The resolver's verdict on an [`AuthAttempt`].
///
/// Produced by [`IdentityResolver::resolve`](crate::resolver::IdentityResolver::resolve)
/// and consumed by [`AccountMerger::apply`](crate::merger::AccountMerger::apply);
/// only the latter performs writes.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionResult {
    /// Bind the session to `user`; no store mutation needed.
    Authenticated(User),

    /// Create a new user from the seed, then authenticate it.
    CreateAndAuthenticate(NewUserSeed),

    /// Mutate the acting session's user and re-save it.
    LinkToSession {
        /// The acting session's user.
        user: User,
        /// The credential to attach.
        mutation: CredentialMutation,
    },

    /// Authenticate as `user` and persist a refreshed identity sub-record.
    ///
    /// Taken when an anonymous callback finds a user whose identity was
    /// previously unlinked (token cleared) and needs its token, name, and
    /// email refreshed.
    ReauthenticateAndRefresh {
        /// The user found by provider id.
        user: User,
        /// Provider being refreshed.
        provider: Provider,
        /// The refreshed identity sub-record.
        identity: Identity,
    },

    /// No mutation; surface the reason to the user.
    Rejected(RejectionReason),
}
