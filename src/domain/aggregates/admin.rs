//! Admin Aggregate

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store operator account. The password survives only as an argon2 PHC
/// string; the plaintext is dropped as soon as it is hashed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Admin {
    pub id: String,
    pub username: String,
    pub password_hash: String,
}

impl Admin {
    pub fn create(username: impl Into<String>, password: &str) -> Result<Self, CredentialError> {
        Ok(Self {
            id: Uuid::new_v4().simple().to_string(),
            username: username.into(),
            password_hash: hash_password(password)?,
        })
    }

    /// Rotates both username and password in one step, matching the admin
    /// panel's edit form.
    pub fn set_credentials(
        &mut self,
        username: impl Into<String>,
        password: &str,
    ) -> Result<(), CredentialError> {
        self.username = username.into();
        self.password_hash = hash_password(password)?;
        Ok(())
    }

    pub fn verify_password(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
            return false;
        };
        Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
    }
}

fn hash_password(password: &str) -> Result<String, CredentialError> {
    if password.is_empty() {
        return Err(CredentialError::EmptyPassword);
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| CredentialError::Hash)
}

#[derive(Debug, Clone)] pub enum CredentialError { EmptyPassword, Hash }
impl std::error::Error for CredentialError {}
impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::Hash => write!(f, "failed to hash password"),
        }
    }
}
