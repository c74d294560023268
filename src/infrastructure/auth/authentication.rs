//! Credential authentication against the member store

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::domain::member::{Member, MemberRepository};
use crate::domain::DomainError;
use crate::infrastructure::member::{matches_blocking, PasswordEncoder};

#[cfg(test)]
use mockall::automock;

/// Why an authentication attempt was refused
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// The account exists but may not log in
    #[error("account is disabled")]
    Disabled,

    /// Unknown email or wrong password
    #[error("bad credentials")]
    BadCredentials,

    #[error(transparent)]
    Storage(#[from] DomainError),
}

/// Verifies an email/password pair
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthenticationManager: Send + Sync {
    /// Returns the authenticated member on success
    async fn authenticate(&self, email: &str, password: &str)
        -> Result<Member, AuthenticationError>;
}

/// Authentication backed by the member repository and a password encoder
#[derive(Debug)]
pub struct MemberAuthenticationManager<R: MemberRepository, E: PasswordEncoder> {
    repository: Arc<R>,
    encoder: Arc<E>,
}

impl<R: MemberRepository, E: PasswordEncoder> MemberAuthenticationManager<R, E> {
    pub fn new(repository: Arc<R>, encoder: Arc<E>) -> Self {
        Self {
            repository,
            encoder,
        }
    }
}

#[async_trait]
impl<R: MemberRepository, E: PasswordEncoder> AuthenticationManager
    for MemberAuthenticationManager<R, E>
{
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Member, AuthenticationError> {
        // Unknown emails are reported like wrong passwords.
        let Some(member) = self.repository.find_by_email(email).await? else {
            debug!("Authentication failed: unknown email");
            return Err(AuthenticationError::BadCredentials);
        };

        if !member.role().is_active() {
            debug!(member_id = %member.id(), "Authentication failed: account disabled");
            return Err(AuthenticationError::Disabled);
        }

        if !matches_blocking(&self.encoder, password, member.password_hash()).await? {
            debug!(member_id = %member.id(), "Authentication failed: password mismatch");
            return Err(AuthenticationError::BadCredentials);
        }

        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::{parse_birth, NewMember};
    use crate::infrastructure::member::{Argon2PasswordEncoder, InMemoryMemberRepository};

    async fn setup(
        password: &str,
    ) -> (
        MemberAuthenticationManager<InMemoryMemberRepository, Argon2PasswordEncoder>,
        Arc<InMemoryMemberRepository>,
    ) {
        let repository = Arc::new(InMemoryMemberRepository::new());
        let encoder = Arc::new(Argon2PasswordEncoder::new());
        let hash = encoder.encode(password).unwrap();

        repository
            .create(&NewMember::new(
                "a@x.com",
                hash,
                "alice",
                parse_birth("20000101").unwrap(),
            ))
            .await
            .unwrap();

        (
            MemberAuthenticationManager::new(repository.clone(), encoder),
            repository,
        )
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let (manager, _) = setup("p1").await;

        let member = manager.authenticate("a@x.com", "p1").await.unwrap();
        assert_eq!(member.email(), "a@x.com");
    }

    #[tokio::test]
    async fn test_wrong_password_is_bad_credentials() {
        let (manager, _) = setup("p1").await;

        let result = manager.authenticate("a@x.com", "wrong").await;
        assert!(matches!(result, Err(AuthenticationError::BadCredentials)));
    }

    #[tokio::test]
    async fn test_unknown_email_is_bad_credentials() {
        let (manager, _) = setup("p1").await;

        let result = manager.authenticate("nobody@x.com", "p1").await;
        assert!(matches!(result, Err(AuthenticationError::BadCredentials)));
    }

    #[tokio::test]
    async fn test_withdrawn_member_is_disabled() {
        let (manager, repository) = setup("p1").await;

        let mut member = repository.find_by_email("a@x.com").await.unwrap().unwrap();
        member.withdraw();
        repository.update(&member).await.unwrap();

        let result = manager.authenticate("a@x.com", "p1").await;
        assert!(matches!(result, Err(AuthenticationError::Disabled)));
    }
}
