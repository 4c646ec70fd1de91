//! Mock user store for testing.

use crate::error::{CoreError, Result};
use crate::providers::UserStore;
use crate::state::{Provider, User, UserId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock user store.
///
/// Uses in-memory storage. All reads and writes run under one mutex, so
/// `save` performs its uniqueness re-check atomically with the write,
/// giving the same per-key exclusivity a unique index provides.
#[derive(Debug, Clone, Default)]
pub struct MockUserStore {
    users: Arc<Mutex<HashMap<UserId, User>>>,
    fail_next_save: Arc<Mutex<Option<CoreError>>>,
    save_delay: Arc<Mutex<Option<Duration>>>,
}

impl MockUserStore {
    /// Create a new mock user store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn user_count(&self) -> Result<usize> {
        Ok(self.users.lock().map_err(Self::poisoned)?.len())
    }

    /// Make the next `save` fail with `error`.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn fail_next_save(&self, error: CoreError) -> Result<()> {
        *self.fail_next_save.lock().map_err(Self::poisoned)? = Some(error);
        Ok(())
    }

    /// Delay every `save` by `delay` (for deadline tests).
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn set_save_delay(&self, delay: Duration) -> Result<()> {
        *self.save_delay.lock().map_err(Self::poisoned)? = Some(delay);
        Ok(())
    }

    fn poisoned<T>(_: T) -> CoreError {
        CoreError::Store("mutex poisoned".to_string())
    }

    /// Check the uniqueness invariants of `user` against every other
    /// stored record. Must be called with the `users` lock held.
    fn check_unique(users: &HashMap<UserId, User>, user: &User) -> Result<()> {
        for other in users.values() {
            if other.user_id == user.user_id {
                continue;
            }

            if let (Some(local), Some(other_local)) = (&user.local, &other.local) {
                if local.email == other_local.email {
                    return Err(CoreError::Conflict(format!("local.email={}", local.email)));
                }
            }

            for (provider, identity) in &user.identities {
                if other
                    .identity(*provider)
                    .is_some_and(|i| i.provider_user_id == identity.provider_user_id)
                {
                    return Err(CoreError::Conflict(format!(
                        "{}:{}",
                        provider.as_str(),
                        identity.provider_user_id
                    )));
                }
            }
        }

        Ok(())
    }
}

impl UserStore for MockUserStore {
    fn find_by_id(&self, user_id: UserId) -> impl Future<Output = Result<Option<User>>> + Send {
        let users = Arc::clone(&self.users);

        async move {
            Ok(users
                .lock()
                .map_err(Self::poisoned)?
                .get(&user_id)
                .cloned())
        }
    }

    fn find_by_local_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>>> + Send {
        let users = Arc::clone(&self.users);
        let email = email.to_string();

        async move {
            Ok(users
                .lock()
                .map_err(Self::poisoned)?
                .values()
                .find(|u| u.local.as_ref().is_some_and(|l| l.email == email))
                .cloned())
        }
    }

    fn find_by_provider_id(
        &self,
        provider: Provider,
        provider_user_id: &str,
    ) -> impl Future<Output = Result<Option<User>>> + Send {
        let users = Arc::clone(&self.users);
        let provider_user_id = provider_user_id.to_string();

        async move {
            Ok(users
                .lock()
                .map_err(Self::poisoned)?
                .values()
                .find(|u| {
                    u.identity(provider)
                        .is_some_and(|i| i.provider_user_id == provider_user_id)
                })
                .cloned())
        }
    }

    fn save(&self, user: &User) -> impl Future<Output = Result<User>> + Send {
        let users = Arc::clone(&self.users);
        let fail_next_save = Arc::clone(&self.fail_next_save);
        let save_delay = Arc::clone(&self.save_delay);
        let user = user.clone();

        async move {
            let delay = *save_delay.lock().map_err(Self::poisoned)?;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if let Some(error) = fail_next_save.lock().map_err(Self::poisoned)?.take() {
                return Err(error);
            }

            let mut users_guard = users.lock().map_err(Self::poisoned)?;
            Self::check_unique(&users_guard, &user)?;
            users_guard.insert(user.user_id, user.clone());

            Ok(user)
        }
    }
}
