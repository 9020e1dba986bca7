use argon2::{
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use rand_core::OsRng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed")]
    HashFailed,
    #[error("stored password hash is malformed")]
    VerifyFailed,
    #[error("hashing task failed")]
    TaskFailed,
}

/// Argon2id hashing, run on the blocking pool.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Cheap parameters for tests.
    #[cfg(test)]
    pub fn fast() -> Self {
        Self {
            params: Params::new(1024, 1, 1, None).expect("valid argon2 params"),
        }
    }

    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let password = password.to_string();
        let params = self.params.clone();

        tokio::task::spawn_blocking(move || {
            let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|_| PasswordError::HashFailed)
        })
        .await
        .map_err(|_| PasswordError::TaskFailed)?
    }

    /// `Ok(false)` on a wrong password; `Err` only when the stored hash is
    /// unusable.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let password = password.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&hash).map_err(|_| PasswordError::VerifyFailed)?;

            // Parameters are read from the PHC string.
            match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
                Ok(_) => Ok(true),
                Err(PasswordHashError::Password) => Ok(false),
                Err(_) => Err(PasswordError::VerifyFailed),
            }
        })
        .await
        .map_err(|_| PasswordError::TaskFailed)?
    }

    /// Login check for an account that does not exist. Spends the same Argon2
    /// work as `verify` so response timing does not reveal registered e-mails.
    /// Always `Ok(false)`.
    pub async fn verify_unknown(&self, password: &str) -> Result<bool, PasswordError> {
        self.hash(password).await.map(|_| false)
    }
}
