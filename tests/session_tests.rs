//! Integration tests for session binding and the session state machine.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use identity_link::{
    AccountMerger, AttemptKind, AuthAttempt, AuthIntent, NewUserSeed, SessionBinder, SessionToken,
    User, UserStore,
    mocks::{MockSessionStore, MockUserStore},
};

async fn seeded_user(store: &MockUserStore) -> User {
    AccountMerger::new()
        .create_user(
            NewUserSeed::Local {
                email: "bob@x.com".to_string(),
                password_digest: "digest".to_string(),
            },
            store,
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_bind_resolve_unbind_round_trip() {
    let users = MockUserStore::new();
    let binder = SessionBinder::new(MockSessionStore::new());
    let user = seeded_user(&users).await;

    // Anonymous → Authenticated.
    let token = binder.bind(&user).await.unwrap();
    let resolved = binder.resolve_session(&token, &users).await.unwrap();
    assert_eq!(resolved.map(|u| u.user_id), Some(user.user_id));

    // Authenticated → Anonymous.
    binder.unbind(&token).await.unwrap();
    let resolved = binder.resolve_session(&token, &users).await.unwrap();
    assert!(resolved.is_none());
}

#[tokio::test]
async fn test_unbind_is_idempotent() {
    let binder = SessionBinder::new(MockSessionStore::new());
    let users = MockUserStore::new();
    let user = seeded_user(&users).await;

    let token = binder.bind(&user).await.unwrap();
    binder.unbind(&token).await.unwrap();
    binder.unbind(&token).await.unwrap();
}

#[tokio::test]
async fn test_unknown_token_resolves_to_none() {
    let binder = SessionBinder::new(MockSessionStore::new());
    let users = MockUserStore::new();

    let token = SessionToken::from("forged-token".to_string());
    let resolved = binder.resolve_session(&token, &users).await.unwrap();
    assert!(resolved.is_none());
}

#[tokio::test]
async fn test_stale_session_for_vanished_user_resolves_to_none() {
    // The session store remembers the token, but the user store has no
    // matching record (deleted by external means). Resolution degrades to
    // anonymous rather than failing.
    let binder = SessionBinder::new(MockSessionStore::new());
    let seeded = MockUserStore::new();
    let user = seeded_user(&seeded).await;

    let token = binder.bind(&user).await.unwrap();

    let empty_users = MockUserStore::new();
    let resolved = binder.resolve_session(&token, &empty_users).await.unwrap();
    assert!(resolved.is_none());
}

#[tokio::test]
async fn test_resolved_session_reads_fresh_user_state() {
    let users = MockUserStore::new();
    let binder = SessionBinder::new(MockSessionStore::new());
    let mut user = seeded_user(&users).await;

    let token = binder.bind(&user).await.unwrap();

    // The record changes after the session was bound.
    user.local = None;
    user.identities.insert(
        identity_link::Provider::Google,
        identity_link::Identity {
            provider_user_id: "g-1".to_string(),
            token: Some("t".to_string()),
            display_name: None,
            email: None,
        },
    );
    users.save(&user).await.unwrap();

    let resolved = binder.resolve_session(&token, &users).await.unwrap().unwrap();
    assert!(resolved.local.is_none());
    assert!(resolved.identity(identity_link::Provider::Google).is_some());
}

#[tokio::test]
async fn test_link_intent_requires_authenticated_session() {
    let binder = SessionBinder::new(MockSessionStore::new());
    let users = MockUserStore::new();
    let user = seeded_user(&users).await;

    let kind = AttemptKind::LocalSignup {
        email: "bob@x.com".to_string(),
        password: "secret".to_string(),
    };

    let anonymous_link = AuthAttempt {
        kind: kind.clone(),
        acting_session: None,
        intent: AuthIntent::Link,
    };
    assert!(!binder.may_link(&anonymous_link));

    let authenticated_link = AuthAttempt {
        kind: kind.clone(),
        acting_session: Some(user),
        intent: AuthIntent::Link,
    };
    assert!(binder.may_link(&authenticated_link));

    let anonymous_auth = AuthAttempt {
        kind,
        acting_session: None,
        intent: AuthIntent::Authenticate,
    };
    assert!(binder.may_link(&anonymous_auth));
}
