//! Password hashing capability. The rest of the system treats this as
//! opaque: it stores and compares strings it cannot interpret.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{Error, Result};

pub trait Hasher: Send + Sync {
    fn hash(&self, secret: &str) -> Result<String>;
    fn verify(&self, secret: &str, hash: &str) -> Result<bool>;
}

/// Argon2id with default parameters.
#[derive(Debug, Default)]
pub struct ArgonHasher;

impl Hasher for ArgonHasher {
    fn hash(&self, secret: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| Error::Internal("failed to hash credential".to_string()))
    }

    fn verify(&self, secret: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|_| Error::Internal("stored credential hash is malformed".to_string()))?;
        match Argon2::default().verify_password(secret.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(_) => Err(Error::Internal("credential verification failed".to_string())),
        }
    }
}
