use std::sync::Arc;

use super::models::{AuthUser, User};
use crate::storage::local_store::{read_json, write_json};
use crate::storage::{KeyValueStore, StoreError};

pub const USERS_KEY: &str = "users";
pub const SESSION_KEY: &str = "current_user";
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("User already exists")]
    UserExists,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("No user is logged in")]
    NotLoggedIn,
    #[error("Name and Email cannot be empty")]
    EmptyProfile,
    #[error("Password must be at least 6 characters")]
    WeakPassword,
    #[error("Cannot delete the logged-in user")]
    CannotDeleteSelf,
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Local, simulated user directory kept as plain JSON in the key-value
/// store. There is no server-side verification.
pub struct UserDirectory {
    store: Arc<dyn KeyValueStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn users(&self) -> Result<Vec<User>, AuthError> {
        Ok(read_json(self.store.as_ref(), USERS_KEY)?.unwrap_or_default())
    }

    fn save_users(&self, users: &[User]) -> Result<(), AuthError> {
        write_json(self.store.as_ref(), USERS_KEY, users)?;
        Ok(())
    }

    fn start_session(&self, user: &User) -> Result<AuthUser, AuthError> {
        let session = AuthUser::from(user);
        write_json(self.store.as_ref(), SESSION_KEY, &session)?;
        log::info!("User logged in: {}", session.email);
        Ok(session)
    }

    pub fn current_user(&self) -> Result<Option<AuthUser>, AuthError> {
        Ok(read_json(self.store.as_ref(), SESSION_KEY)?)
    }

    pub fn signup(&self, name: &str, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        if name.trim().is_empty() || email.trim().is_empty() {
            return Err(AuthError::EmptyProfile);
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        let mut users = self.users()?;
        if users.iter().any(|u| u.email == email) {
            return Err(AuthError::UserExists);
        }

        let user = User::new(name.to_string(), email.to_string(), password);
        users.push(user.clone());
        self.save_users(&users)?;
        self.start_session(&user)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let users = self.users()?;
        let user = users
            .iter()
            .find(|u| u.email == email && u.password_matches(password))
            .ok_or(AuthError::InvalidCredentials)?;
        self.start_session(user)
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.remove(SESSION_KEY)?;
        Ok(())
    }

    pub fn update_profile(&self, name: &str, email: &str) -> Result<AuthUser, AuthError> {
        if name.trim().is_empty() || email.trim().is_empty() {
            return Err(AuthError::EmptyProfile);
        }
        let current = self.current_user()?.ok_or(AuthError::NotLoggedIn)?;

        let mut users = self.users()?;
        if let Some(user) = users.iter_mut().find(|u| u.email == current.email) {
            user.name = name.to_string();
            user.email = email.to_string();
        }
        self.save_users(&users)?;

        let session = AuthUser {
            name: name.to_string(),
            email: email.to_string(),
        };
        write_json(self.store.as_ref(), SESSION_KEY, &session)?;
        Ok(session)
    }

    pub fn update_password(&self, new_password: &str) -> Result<(), AuthError> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }
        let current = self.current_user()?.ok_or(AuthError::NotLoggedIn)?;

        let mut users = self.users()?;
        let user = users
            .iter_mut()
            .find(|u| u.email == current.email)
            .ok_or(AuthError::NotLoggedIn)?;
        *user = User::new(user.name.clone(), user.email.clone(), new_password);
        self.save_users(&users)
    }

    pub fn list_users(&self) -> Result<Vec<AuthUser>, AuthError> {
        Ok(self.users()?.iter().map(AuthUser::from).collect())
    }

    /// Case-insensitive substring match on name or email. An empty query
    /// matches everyone.
    pub fn search_users(&self, query: &str) -> Result<Vec<AuthUser>, AuthError> {
        let needle = query.to_lowercase();
        Ok(self
            .list_users()?
            .into_iter()
            .filter(|u| {
                u.name.to_lowercase().contains(&needle) || u.email.to_lowercase().contains(&needle)
            })
            .collect())
    }

    /// Returns whether a user was removed. The session's own account is
    /// never deleted.
    pub fn delete_user(&self, email: &str) -> Result<bool, AuthError> {
        if let Some(current) = self.current_user()? {
            if current.email == email {
                return Err(AuthError::CannotDeleteSelf);
            }
        }

        let mut users = self.users()?;
        let before = users.len();
        users.retain(|u| u.email != email);
        if users.len() == before {
            return Ok(false);
        }
        self.save_users(&users)?;
        log::info!("Deleted user {}", email);
        Ok(true)
    }
}
