//! Integration tests for provider callbacks, linking, and unlinking.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use identity_link::{
    AccountMerger, AttemptKind, AuthAttempt, AuthIntent, AuthOutcome, CoreError, IdentityResolver,
    Provider, ProviderProfile, RejectionReason, User, UserStore,
    mocks::{MockHasher, MockUserStore},
};

fn resolver() -> IdentityResolver<MockHasher> {
    IdentityResolver::new(MockHasher::new())
}

fn callback(provider: Provider, id: &str, acting_session: Option<User>) -> AuthAttempt {
    let intent = if acting_session.is_some() {
        AuthIntent::Link
    } else {
        AuthIntent::Authenticate
    };
    AuthAttempt {
        kind: AttemptKind::ProviderCallback {
            provider,
            profile: ProviderProfile {
                provider_user_id: id.to_string(),
                token: "tok".to_string(),
                display_name: Some("Bob".to_string()),
                email: Some("bob@provider.com".to_string()),
            },
        },
        acting_session,
        intent,
    }
}

async fn run(store: &MockUserStore, attempt: AuthAttempt) -> AuthOutcome {
    let resolution = resolver().resolve(&attempt, store).await.unwrap();
    AccountMerger::new().apply(resolution, store).await.unwrap()
}

fn authenticated(outcome: AuthOutcome) -> User {
    match outcome {
        AuthOutcome::Authenticated(user) => user,
        AuthOutcome::Rejected(reason) => panic!("expected authentication, rejected: {reason}"),
    }
}

#[tokio::test]
async fn test_unseen_provider_id_creates_exactly_one_user() {
    let store = MockUserStore::new();

    let first = authenticated(run(&store, callback(Provider::Google, "g-1", None)).await);
    assert_eq!(store.user_count().unwrap(), 1);
    assert!(first.identity(Provider::Google).is_some());

    // Repeating the identical callback re-authenticates, never duplicates.
    let second = authenticated(run(&store, callback(Provider::Google, "g-1", None)).await);
    assert_eq!(second.user_id, first.user_id);
    assert_eq!(store.user_count().unwrap(), 1);
}

#[tokio::test]
async fn test_link_provider_to_authenticated_local_user() {
    let store = MockUserStore::new();
    let merger = AccountMerger::new();

    let local_user = authenticated(
        run(
            &store,
            AuthAttempt {
                kind: AttemptKind::LocalSignup {
                    email: "bob@x.com".to_string(),
                    password: "secret".to_string(),
                },
                acting_session: None,
                intent: AuthIntent::Authenticate,
            },
        )
        .await,
    );

    let linked = authenticated(
        run(&store, callback(Provider::Facebook, "123", Some(local_user.clone()))).await,
    );

    assert_eq!(linked.user_id, local_user.user_id);
    assert!(linked.local.is_some());
    let identity = linked.identity(Provider::Facebook).unwrap();
    assert_eq!(identity.provider_user_id, "123");
    assert_eq!(identity.token.as_deref(), Some("tok"));
    assert_eq!(identity.email.as_deref(), Some("bob@provider.com"));

    // Round trip: detaching restores the pre-link credential set.
    let detached = merger
        .detach_identity(linked, Provider::Facebook, &store)
        .await
        .unwrap();
    assert!(detached.identity(Provider::Facebook).is_none());
    assert_eq!(detached.local, local_user.local);
    assert_eq!(detached.credential_count(), 1);
}

#[tokio::test]
async fn test_linking_identity_owned_by_another_account_is_rejected() {
    let store = MockUserStore::new();

    // Account A owns facebook:123.
    let owner = authenticated(run(&store, callback(Provider::Facebook, "123", None)).await);

    // Account B, locally authenticated, tries to link the same identity.
    let thief = authenticated(
        run(
            &store,
            AuthAttempt {
                kind: AttemptKind::LocalSignup {
                    email: "mallory@x.com".to_string(),
                    password: "pw".to_string(),
                },
                acting_session: None,
                intent: AuthIntent::Authenticate,
            },
        )
        .await,
    );

    let outcome = run(&store, callback(Provider::Facebook, "123", Some(thief))).await;
    assert_eq!(
        outcome,
        AuthOutcome::Rejected(RejectionReason::AlreadyLinkedToAnotherAccount)
    );

    // The identity still belongs to its original owner.
    let still_owner = store
        .find_by_provider_id(Provider::Facebook, "123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(still_owner.user_id, owner.user_id);
}

#[tokio::test]
async fn test_detach_local_without_local_credential_is_a_noop() {
    let store = MockUserStore::new();
    let merger = AccountMerger::new();

    let fb_only = authenticated(run(&store, callback(Provider::Facebook, "123", None)).await);
    assert!(fb_only.local.is_none());

    let unchanged = merger.detach_local(fb_only.clone(), &store).await.unwrap();
    assert_eq!(unchanged, fb_only);
}

#[tokio::test]
async fn test_detaching_only_credential_fails_with_guard() {
    let store = MockUserStore::new();
    let merger = AccountMerger::new();

    let fb_only = authenticated(run(&store, callback(Provider::Facebook, "123", None)).await);
    assert_eq!(fb_only.credential_count(), 1);

    let result = merger.detach_identity(fb_only, Provider::Facebook, &store).await;
    assert_eq!(result, Err(CoreError::LastCredential));

    // The account is still reachable.
    let user = store
        .find_by_provider_id(Provider::Facebook, "123")
        .await
        .unwrap();
    assert!(user.is_some());
}

#[tokio::test]
async fn test_same_provider_id_on_two_providers_is_independent() {
    let store = MockUserStore::new();

    let a = authenticated(run(&store, callback(Provider::Google, "42", None)).await);
    let b = authenticated(run(&store, callback(Provider::Twitter, "42", None)).await);

    assert_ne!(a.user_id, b.user_id);
    assert_eq!(store.user_count().unwrap(), 2);
}

#[tokio::test]
async fn test_relinking_own_identity_refreshes_token() {
    let store = MockUserStore::new();

    let user = authenticated(run(&store, callback(Provider::LinkedIn, "li-1", None)).await);

    // Same identity, new token: overwrite on the same user is allowed.
    let refreshed = authenticated(
        run(
            &store,
            AuthAttempt {
                kind: AttemptKind::ProviderCallback {
                    provider: Provider::LinkedIn,
                    profile: ProviderProfile {
                        provider_user_id: "li-1".to_string(),
                        token: "rotated".to_string(),
                        display_name: Some("Bob".to_string()),
                        email: Some("bob@provider.com".to_string()),
                    },
                },
                acting_session: Some(user.clone()),
                intent: AuthIntent::Link,
            },
        )
        .await,
    );

    assert_eq!(refreshed.user_id, user.user_id);
    assert_eq!(
        refreshed.identity(Provider::LinkedIn).unwrap().token.as_deref(),
        Some("rotated")
    );
    assert_eq!(store.user_count().unwrap(), 1);
}
