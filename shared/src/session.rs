//! The signed-in user, mirrored to the `user` storage key.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use crate::capabilities::{load_json, save_json, KeyValueStore, KvError, StorageKey};
use crate::config::GuideConfig;
use crate::model::User;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("session storage failed: {0}")]
    Storage(#[from] KvError),
}

/// Owns the current session. The in-memory user is authoritative; storage
/// follows it and a failed write can be retried with [`SessionStore::persist`].
pub struct SessionStore<S: KeyValueStore> {
    storage: Arc<S>,
    min_password_length: usize,
    current: RwLock<Option<User>>,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(storage: Arc<S>, config: &GuideConfig) -> Self {
        Self {
            storage,
            min_password_length: config.min_password_length,
            current: RwLock::new(None),
        }
    }

    /// Reactivates a persisted session. A missing or unreadable record leaves
    /// the session inactive.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<Option<User>, SessionError> {
        let mut current = self.current.write().await;
        match load_json::<S, User>(self.storage.as_ref(), &StorageKey::USER).await {
            Ok(Some(user)) => {
                info!(user_id = %user.id, "session restored");
                *current = Some(user.clone());
                Ok(Some(user))
            }
            Ok(None) => {
                info!("no persisted session");
                *current = None;
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "failed to restore session");
                *current = None;
                Err(e.into())
            }
        }
    }

    /// Any non-empty email/password pair is accepted.
    #[instrument(skip_all)]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let email = required("email", email)?;
        required("password", password)?;

        let name = email.split('@').next().unwrap_or(email);
        let user = User::new(name, email);
        self.activate(user).await
    }

    #[instrument(skip_all)]
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, SessionError> {
        let name = required("name", name)?;
        let email = required("email", email)?;
        if password.chars().count() < self.min_password_length {
            return Err(SessionError::PasswordTooShort {
                min: self.min_password_length,
            });
        }

        self.activate(User::new(name, email)).await
    }

    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let mut current = self.current.write().await;
        let previous = current.take();

        if let Err(e) = self.storage.delete(&StorageKey::USER).await {
            error!(error = %e, "failed to remove persisted session");
            return Err(e.into());
        }

        if let Some(user) = previous {
            info!(user_id = %user.id, "signed out");
        }
        Ok(())
    }

    pub async fn current_user(&self) -> Option<User> {
        self.current.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Writes the in-memory session to storage, or removes it when signed out.
    #[instrument(skip(self))]
    pub async fn persist(&self) -> Result<(), SessionError> {
        let current = self.current.read().await;
        match current.as_ref() {
            Some(user) => save_json(self.storage.as_ref(), &StorageKey::USER, user).await?,
            None => {
                self.storage.delete(&StorageKey::USER).await?;
            }
        }
        Ok(())
    }

    async fn activate(&self, user: User) -> Result<User, SessionError> {
        let mut current = self.current.write().await;
        *current = Some(user.clone());

        if let Err(e) = save_json(self.storage.as_ref(), &StorageKey::USER, &user).await {
            error!(user_id = %user.id, error = %e, "session active but not persisted");
            return Err(e.into());
        }

        info!(user_id = %user.id, "signed in");
        Ok(user)
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, SessionError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SessionError::MissingField(field));
    }
    Ok(value)
}
