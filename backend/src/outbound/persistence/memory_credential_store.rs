//! Process-local [`CredentialStore`] for development and tests.
//!
//! Check and insert happen under one lock, which gives the same guarantee
//! as the unique indexes of the PostgreSQL adapter.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{CredentialStore, CredentialStoreError};
use crate::domain::{EmailAddress, NewUser, PasswordHash, User, UserId, UserName};

/// In-memory credential store. Data is lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: Mutex<Vec<User>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.lock().map(|users| users.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<User>>, CredentialStoreError> {
        self.users
            .lock()
            .map_err(|_| CredentialStoreError::query("in-memory store lock poisoned"))
    }

    fn find(
        &self,
        matches: impl Fn(&User) -> bool,
    ) -> Result<Option<User>, CredentialStoreError> {
        Ok(self.lock()?.iter().find(|&user| matches(user)).cloned())
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, CredentialStoreError> {
        self.find(|user| user.email().as_str() == email)
    }

    async fn get_by_user_name(
        &self,
        user_name: &str,
    ) -> Result<Option<User>, CredentialStoreError> {
        self.find(|user| user.user_name().as_str() == user_name)
    }

    async fn exists_by_email_or_user_name(
        &self,
        email: &EmailAddress,
        user_name: &UserName,
    ) -> Result<bool, CredentialStoreError> {
        Ok(self
            .lock()?
            .iter()
            .any(|user| user.email() == email || user.user_name() == user_name))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, CredentialStoreError> {
        let mut users = self.lock()?;
        if let Some(clash) = users.iter().find(|user| {
            user.email() == &new_user.email || user.user_name() == &new_user.user_name
        }) {
            let column = if clash.email() == &new_user.email {
                "email"
            } else {
                "user_name"
            };
            return Err(CredentialStoreError::duplicate(format!("users_{column}_key")));
        }
        let user = User::from_new(UserId::random(), new_user);
        users.push(user.clone());
        Ok(user)
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &PasswordHash,
    ) -> Result<(), CredentialStoreError> {
        let mut users = self.lock()?;
        let Some(slot) = users.iter_mut().find(|user| user.id() == id) else {
            return Err(CredentialStoreError::query(format!("user {id} not found")));
        };
        *slot = slot.clone().with_password_hash(password_hash.clone());
        Ok(())
    }
}
