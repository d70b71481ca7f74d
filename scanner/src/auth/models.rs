use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Directory entry. Only the password digest is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub password_digest: String,
}

/// Identity of the logged-in user, as kept in the session key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub name: String,
    pub email: String,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

impl User {
    pub fn new(name: String, email: String, password: &str) -> Self {
        Self {
            name,
            email,
            password_digest: digest_password(password),
        }
    }

    pub fn password_matches(&self, password: &str) -> bool {
        self.password_digest == digest_password(password)
    }
}

pub fn digest_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
