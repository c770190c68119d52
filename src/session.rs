//! Persistence of the signed-in staff session.
//!
//! The session lives in a small string key-value store (the
//! [`KeyValueStore`] trait) so it survives restarts. [`SessionRepository`]
//! owns the encoding: entries that fail to decode, or decode to an
//! incomplete user, are treated as absent and removed on load.

#[cfg(feature = "storage-file")]
mod file;
mod memory;

#[cfg(feature = "storage-file")]
pub use file::FileStore;
pub use memory::InMemoryStore;

use secrecy::{ExposeSecret as _, SecretString};

use crate::error::{Result, YooPayError};
use crate::models::StaffUser;

/// Key under which the staff user is stored.
pub const SESSION_KEY: &str = "yoopay_user";

/// Key under which the auth access token is stored.
pub const ACCESS_TOKEN_KEY: &str = "yoopay_access_token";

/// String key-value store backing the session.
pub trait KeyValueStore: core::fmt::Debug + Send + Sync {
    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to write.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to delete.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Loads, saves and clears the staff session in a [`KeyValueStore`].
#[derive(Debug)]
pub struct SessionRepository<S: KeyValueStore> {
    /// Backing store.
    store: S,
}

impl<S: KeyValueStore> SessionRepository<S> {
    /// Creates a repository over `store`.
    #[inline]
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the backing store.
    #[inline]
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the stored user.
    ///
    /// A corrupt or incomplete entry is logged, removed, and reported as
    /// no session.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself fails.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub fn load(&self) -> Result<Option<StaffUser>> {
        let Some(raw) = self.store.get(SESSION_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<StaffUser>(&raw) {
            Ok(user) if user.is_complete() => Ok(Some(user)),
            Ok(_incomplete) => {
                tracing::warn!("stored session is incomplete, clearing it");
                self.clear()?;
                Ok(None)
            }
            Err(err) => {
                tracing::warn!(error = %err, "stored session is corrupt, clearing it");
                self.clear()?;
                Ok(None)
            }
        }
    }

    /// Stores `user` as the current session.
    ///
    /// # Errors
    ///
    /// Returns [`YooPayError::Validation`] if the user is incomplete, or an
    /// error if the store fails.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub fn save(&self, user: &StaffUser) -> Result<()> {
        if !user.is_complete() {
            return Err(YooPayError::Validation(
                "Sessão inválida: e-mail e nome são obrigatórios.".to_owned(),
            ));
        }
        let json = serde_json::to_string(user)?;
        self.store.set(SESSION_KEY, &json)?;
        tracing::debug!(role = user.role.as_str(), "session saved");
        Ok(())
    }

    /// Applies `change` to the stored user and saves the result.
    ///
    /// Returns the updated user, or `None` if there is no session.
    ///
    /// # Errors
    ///
    /// Returns an error if the changed user is incomplete or the store
    /// fails.
    #[inline]
    pub fn update<F: FnOnce(&mut StaffUser)>(&self, change: F) -> Result<Option<StaffUser>> {
        let Some(mut user) = self.load()? else {
            return Ok(None);
        };
        change(&mut user);
        self.save(&user)?;
        Ok(Some(user))
    }

    /// Stores the access token of the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    #[inline]
    pub fn save_access_token(&self, token: &SecretString) -> Result<()> {
        self.store.set(ACCESS_TOKEN_KEY, token.expose_secret())
    }

    /// Returns the stored access token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    #[inline]
    pub fn access_token(&self) -> Result<Option<SecretString>> {
        Ok(self.store.get(ACCESS_TOKEN_KEY)?.map(SecretString::from))
    }

    /// Removes the session and its access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    #[inline]
    pub fn clear(&self) -> Result<()> {
        self.store.remove(SESSION_KEY)?;
        self.store.remove(ACCESS_TOKEN_KEY)
    }
}
