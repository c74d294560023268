//! Password encoding using Argon2

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::fmt::Debug;
use std::sync::Arc;

use crate::domain::DomainError;

/// One-way password encoding and comparison
pub trait PasswordEncoder: Send + Sync + Debug + 'static {
    /// Hash a plaintext password
    fn encode(&self, password: &str) -> Result<String, DomainError>;

    /// Check a plaintext password against a stored hash
    fn matches(&self, password: &str, hash: &str) -> bool;
}

/// Argon2-based password encoder
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordEncoder;

impl Argon2PasswordEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordEncoder for Argon2PasswordEncoder {
    fn encode(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn matches(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// Hash a password on the blocking thread pool
pub async fn encode_blocking<E: PasswordEncoder>(
    encoder: &Arc<E>,
    password: &str,
) -> Result<String, DomainError> {
    let encoder = Arc::clone(encoder);
    let password = password.to_owned();

    tokio::task::spawn_blocking(move || encoder.encode(&password))
        .await
        .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
}

/// Compare a password with a stored hash on the blocking thread pool
pub async fn matches_blocking<E: PasswordEncoder>(
    encoder: &Arc<E>,
    password: &str,
    hash: &str,
) -> Result<bool, DomainError> {
    let encoder = Arc::clone(encoder);
    let password = password.to_owned();
    let hash = hash.to_owned();

    tokio::task::spawn_blocking(move || encoder.matches(&password, &hash))
        .await
        .map_err(|e| DomainError::internal(format!("Password check task failed: {}", e)))
}
