//! Member service: join, login, update and withdraw flows

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::domain::member::{
    parse_birth, validate_email, Member, MemberError, MemberId, MemberRepository, NewMember,
};
use crate::infrastructure::auth::{
    AuthenticationError, AuthenticationManager, TokenIssuer, TokenKind,
};

use super::password::{encode_blocking, matches_blocking, PasswordEncoder};

/// Request for registering a new member
#[derive(Debug, Clone, Deserialize)]
pub struct JoinRequest {
    pub email: String,
    pub password: String,
    /// Must repeat `password`
    pub check_password: String,
    pub nickname: String,
    /// Birth date as `yyyyMMdd`
    pub birth: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinResponse {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub email: String,
}

/// Partial update of a member; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateMemberRequest {
    pub nickname: Option<String>,
    pub password: Option<String>,
    pub birth: Option<NaiveDateTime>,
}

impl UpdateMemberRequest {
    pub fn is_empty(&self) -> bool {
        self.nickname.is_none() && self.password.is_none() && self.birth.is_none()
    }
}

/// Member account lifecycle service
pub struct MemberService<R: MemberRepository, E: PasswordEncoder> {
    repository: Arc<R>,
    encoder: Arc<E>,
    authentication: Arc<dyn AuthenticationManager>,
    tokens: Arc<dyn TokenIssuer>,
}

impl<R: MemberRepository, E: PasswordEncoder> MemberService<R, E> {
    pub fn new(
        repository: Arc<R>,
        encoder: Arc<E>,
        authentication: Arc<dyn AuthenticationManager>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            repository,
            encoder,
            authentication,
            tokens,
        }
    }

    /// Fail with `DuplicateEmail` if the email is already registered
    pub async fn check_email_duplicate(&self, email: &str) -> Result<(), MemberError> {
        if self.repository.exists_by_email(email).await? {
            return Err(MemberError::DuplicateEmail);
        }
        Ok(())
    }

    /// Register a new member and authenticate the fresh credentials.
    ///
    /// Nothing is persisted unless the birth date, email, uniqueness and
    /// password confirmation checks all pass. If authenticating the new
    /// credentials fails, the inserted member is removed again.
    pub async fn join(&self, request: JoinRequest) -> Result<JoinResponse, MemberError> {
        let birth = parse_birth(&request.birth).map_err(MemberError::InvalidDate)?;
        validate_email(&request.email).map_err(MemberError::InvalidEmail)?;

        self.check_email_duplicate(&request.email).await?;

        if request.password != request.check_password {
            return Err(MemberError::PasswordMismatch);
        }

        let password_hash = encode_blocking(&self.encoder, &request.password).await?;
        let new_member = NewMember::new(&request.email, password_hash, &request.nickname, birth);

        let id = match self.repository.create(&new_member).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                return Err(MemberError::Persistence(
                    "store returned no generated id".to_string(),
                ))
            }
            // Lost a race with a concurrent join for the same email.
            Err(e) if e.is_conflict() => return Err(MemberError::DuplicateEmail),
            Err(e) => return Err(e.into()),
        };

        if let Err(err) = self.authenticate(&request.email, &request.password).await {
            warn!(member_id = %id, error = %err, "Authentication after join failed, rolling back");
            self.rollback_join(id).await;
            return Err(err);
        }

        info!(member_id = %id, "Member joined");

        Ok(JoinResponse {
            email: request.email,
        })
    }

    /// Authenticate and issue an access/refresh token pair.
    ///
    /// Withdrawn members are refused before their credentials are checked.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, MemberError> {
        if let Some(member) = self.repository.find_by_email(&request.email).await? {
            if member.is_withdrawn() {
                return Err(MemberError::AccountWithdrawn);
            }
        }

        let member = self.authenticate(&request.email, &request.password).await?;

        let access_token = self.tokens.generate_access_token(member.email())?;
        let refresh_token = self.tokens.generate_refresh_token(member.email())?;

        info!(member_id = %member.id(), "Member logged in");

        Ok(LoginResponse {
            access_token,
            refresh_token,
            expires_in: self.tokens.access_token_ttl_secs()?,
            email: request.email,
        })
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, MemberError> {
        let claims = self
            .tokens
            .validate(refresh_token, TokenKind::Refresh)
            .map_err(|e| MemberError::InvalidToken(e.to_string()))?;

        let member = self
            .repository
            .find_by_email(claims.email())
            .await?
            .ok_or(MemberError::AccountNotFound)?;

        if member.is_withdrawn() {
            return Err(MemberError::AccountWithdrawn);
        }

        let access_token = self.tokens.generate_access_token(member.email())?;

        Ok(RefreshResponse {
            access_token,
            expires_in: self.tokens.access_token_ttl_secs()?,
            email: member.email().to_string(),
        })
    }

    /// Check a plaintext password against the stored hash of a member
    pub async fn check_password(&self, id: MemberId, password: &str) -> Result<bool, MemberError> {
        let member = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(MemberError::AccountNotFound)?;

        Ok(matches_blocking(&self.encoder, password, member.password_hash()).await?)
    }

    /// Apply a partial update. Returns `false` if the member does not exist.
    pub async fn update_member(
        &self,
        id: MemberId,
        request: UpdateMemberRequest,
    ) -> Result<bool, MemberError> {
        if !self.repository.exists_by_id(id).await? {
            return Ok(false);
        }

        let Some(mut member) = self.repository.find_by_id(id).await? else {
            return Ok(false);
        };

        if request.is_empty() {
            return Ok(true);
        }

        if let Some(nickname) = request.nickname {
            member.set_nickname(nickname);
        }

        if let Some(password) = request.password {
            member.set_password_hash(encode_blocking(&self.encoder, &password).await?);
        }

        if let Some(birth) = request.birth {
            member.set_birth(birth);
        }

        self.repository.update(&member).await?;
        info!(member_id = %id, "Member updated");

        Ok(true)
    }

    /// Soft-delete a member. Returns `false` if no member has this email.
    pub async fn withdraw_member(&self, email: &str) -> Result<bool, MemberError> {
        let Some(mut member) = self.repository.find_by_email(email).await? else {
            return Ok(false);
        };

        if !member.is_withdrawn() {
            member.withdraw();
            self.repository.update(&member).await?;
            info!(member_id = %member.id(), "Member withdrew");
        }

        Ok(true)
    }

    /// Look up a member by the email carried in an access token
    pub async fn get_by_email(&self, email: &str) -> Result<Option<Member>, MemberError> {
        Ok(self.repository.find_by_email(email).await?)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Member, MemberError> {
        self.authentication
            .authenticate(email, password)
            .await
            .map_err(|e| match e {
                AuthenticationError::Disabled => MemberError::AccountDisabled,
                AuthenticationError::BadCredentials => MemberError::InvalidCredentials,
                AuthenticationError::Storage(e) => MemberError::Storage(e),
            })
    }

    async fn rollback_join(&self, id: MemberId) {
        if let Err(e) = self.repository.discard(id).await {
            error!(member_id = %id, error = %e, "Failed to roll back member insert");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::{MockMemberRepository, Role};
    use crate::domain::DomainError;
    use crate::infrastructure::auth::{
        JwtConfig, JwtService, MemberAuthenticationManager, MockAuthenticationManager,
    };
    use crate::infrastructure::member::{Argon2PasswordEncoder, InMemoryMemberRepository};

    type TestService = MemberService<InMemoryMemberRepository, Argon2PasswordEncoder>;

    fn token_issuer() -> Arc<JwtService> {
        Arc::new(JwtService::new(JwtConfig::new("test-secret", 30, 14)))
    }

    fn create_service() -> (TestService, Arc<InMemoryMemberRepository>) {
        let repository = Arc::new(InMemoryMemberRepository::new());
        let encoder = Arc::new(Argon2PasswordEncoder::new());
        let authentication = Arc::new(MemberAuthenticationManager::new(
            repository.clone(),
            encoder.clone(),
        ));

        let service = MemberService::new(repository.clone(), encoder, authentication, token_issuer());
        (service, repository)
    }

    fn service_with(
        repository: Arc<MockMemberRepository>,
        authentication: MockAuthenticationManager,
    ) -> MemberService<MockMemberRepository, Argon2PasswordEncoder> {
        MemberService::new(
            repository,
            Arc::new(Argon2PasswordEncoder::new()),
            Arc::new(authentication),
            token_issuer(),
        )
    }

    fn join_request(email: &str, password: &str, check: &str, birth: &str) -> JoinRequest {
        JoinRequest {
            email: email.to_string(),
            password: password.to_string(),
            check_password: check.to_string(),
            nickname: "nick".to_string(),
            birth: birth.to_string(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    async fn joined(service: &TestService, email: &str) -> Member {
        service
            .join(join_request(email, "p1", "p1", "20000101"))
            .await
            .unwrap();
        service.get_by_email(email).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_join_then_login_scenario() {
        let (service, _) = create_service();

        let joined = service
            .join(join_request("a@x.com", "p1", "p1", "20000101"))
            .await
            .unwrap();
        assert_eq!(joined.email, "a@x.com");

        let login = service.login(login_request("a@x.com", "p1")).await.unwrap();
        assert_eq!(login.email, "a@x.com");
        assert!(!login.access_token.is_empty());
        assert!(!login.refresh_token.is_empty());
        assert_ne!(login.access_token, login.refresh_token);
        assert_eq!(login.expires_in, 30 * 60);

        let wrong = service.login(login_request("a@x.com", "wrong")).await;
        assert!(matches!(wrong, Err(MemberError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_join_stores_hashed_password_and_midnight_birth() {
        let (service, _) = create_service();
        let member = joined(&service, "a@x.com").await;

        assert_ne!(member.password_hash(), "p1");
        assert_eq!(member.role(), Role::User);
        assert_eq!(member.birth().to_string(), "2000-01-01 00:00:00");
    }

    #[tokio::test]
    async fn test_join_duplicate_email() {
        let (service, _) = create_service();
        joined(&service, "a@x.com").await;

        let result = service
            .join(join_request("a@x.com", "p2", "p2", "19990101"))
            .await;
        assert!(matches!(result, Err(MemberError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_join_conflict_on_insert_is_duplicate_email() {
        let repository = Arc::new(MockMemberRepository::new());
        let birth = parse_birth("20000101").unwrap();
        repository
            .create(&NewMember::new("a@x.com", "hash", "nick", birth))
            .await
            .unwrap();

        // The uniqueness check passes, then the insert hits the constraint.
        repository.set_stale_email_lookups(true).await;
        let service = service_with(repository.clone(), MockAuthenticationManager::new());

        let result = service
            .join(join_request("a@x.com", "p2", "p2", "19990101"))
            .await;

        assert!(matches!(result, Err(MemberError::DuplicateEmail)));
        assert_eq!(repository.len().await, 1);
    }

    #[tokio::test]
    async fn test_join_password_mismatch_persists_nothing() {
        let repository = Arc::new(MockMemberRepository::new());
        let service = service_with(repository.clone(), MockAuthenticationManager::new());

        let result = service
            .join(join_request("a@x.com", "p1", "p2", "20000101"))
            .await;

        assert!(matches!(result, Err(MemberError::PasswordMismatch)));
        assert_eq!(repository.write_count().await, 0);
    }

    #[tokio::test]
    async fn test_join_malformed_birth_persists_nothing() {
        let repository = Arc::new(MockMemberRepository::new());
        let service = service_with(repository.clone(), MockAuthenticationManager::new());

        for birth in ["2000011", "2000-01-01", "abcdefgh", "20001301"] {
            let result = service
                .join(join_request("a@x.com", "p1", "p1", birth))
                .await;
            assert!(
                matches!(result, Err(MemberError::InvalidDate(_))),
                "{birth} should fail with InvalidDate"
            );
        }

        assert_eq!(repository.write_count().await, 0);
    }

    #[tokio::test]
    async fn test_join_invalid_email() {
        let (service, _) = create_service();

        let result = service
            .join(join_request("not-an-email", "p1", "p1", "20000101"))
            .await;
        assert!(matches!(result, Err(MemberError::InvalidEmail(_))));
    }

    #[tokio::test]
    async fn test_join_without_generated_id_is_persistence_error() {
        let repository = Arc::new(MockMemberRepository::new());
        repository.set_withhold_ids(true).await;
        let service = service_with(repository.clone(), MockAuthenticationManager::new());

        let result = service
            .join(join_request("a@x.com", "p1", "p1", "20000101"))
            .await;

        assert!(matches!(result, Err(MemberError::Persistence(_))));
        assert_eq!(repository.len().await, 0);
    }

    #[tokio::test]
    async fn test_join_rolls_back_when_authentication_fails() {
        let repository = Arc::new(MockMemberRepository::new());
        let mut authentication = MockAuthenticationManager::new();
        authentication
            .expect_authenticate()
            .times(1)
            .returning(|_, _| Err(AuthenticationError::Disabled));

        let service = service_with(repository.clone(), authentication);

        let result = service
            .join(join_request("a@x.com", "p1", "p1", "20000101"))
            .await;

        assert!(matches!(result, Err(MemberError::AccountDisabled)));
        assert_eq!(repository.len().await, 0);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let repository = Arc::new(MockMemberRepository::new());
        repository.set_should_fail(true).await;
        let service = service_with(repository, MockAuthenticationManager::new());

        let result = service.login(login_request("a@x.com", "p1")).await;
        assert!(matches!(result, Err(MemberError::Storage(DomainError::Storage { .. }))));
    }

    #[tokio::test]
    async fn test_login_translates_authentication_failures() {
        let mut authentication = MockAuthenticationManager::new();
        authentication
            .expect_authenticate()
            .returning(|_, password| match password {
                "disabled" => Err(AuthenticationError::Disabled),
                _ => Err(AuthenticationError::BadCredentials),
            });

        let service = service_with(Arc::new(MockMemberRepository::new()), authentication);

        let disabled = service.login(login_request("a@x.com", "disabled")).await;
        assert!(matches!(disabled, Err(MemberError::AccountDisabled)));

        let bad = service.login(login_request("a@x.com", "bad")).await;
        assert!(matches!(bad, Err(MemberError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let (service, _) = create_service();

        let result = service.login(login_request("nobody@x.com", "p1")).await;
        assert!(matches!(result, Err(MemberError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_withdrawn_member_regardless_of_password() {
        let (service, _) = create_service();
        joined(&service, "a@x.com").await;
        assert!(service.withdraw_member("a@x.com").await.unwrap());

        for password in ["p1", "wrong"] {
            let result = service.login(login_request("a@x.com", password)).await;
            assert!(matches!(result, Err(MemberError::AccountWithdrawn)));
        }
    }

    #[tokio::test]
    async fn test_withdraw_is_idempotent() {
        let (service, _) = create_service();
        joined(&service, "a@x.com").await;

        assert!(service.withdraw_member("a@x.com").await.unwrap());
        assert!(service.withdraw_member("a@x.com").await.unwrap());

        let member = service.get_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(member.role(), Role::Unregister);
    }

    #[tokio::test]
    async fn test_withdraw_unknown_email() {
        let (service, _) = create_service();
        assert!(!service.withdraw_member("nobody@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_check_password() {
        let (service, _) = create_service();
        let member = joined(&service, "a@x.com").await;

        assert!(service.check_password(member.id(), "p1").await.unwrap());
        assert!(!service.check_password(member.id(), "wrong").await.unwrap());

        let missing = service.check_password(MemberId::new(999), "p1").await;
        assert!(matches!(missing, Err(MemberError::AccountNotFound)));
    }

    #[tokio::test]
    async fn test_empty_update_is_noop() {
        let (service, repository) = create_service();
        let before = joined(&service, "a@x.com").await;

        let updated = service
            .update_member(before.id(), UpdateMemberRequest::default())
            .await
            .unwrap();
        assert!(updated);

        let after = repository.find_by_id(before.id()).await.unwrap().unwrap();
        assert_eq!(after.nickname(), before.nickname());
        assert_eq!(after.password_hash(), before.password_hash());
        assert_eq!(after.birth(), before.birth());
        assert_eq!(after.updated_at(), before.updated_at());
    }

    #[tokio::test]
    async fn test_update_unknown_member() {
        let (service, _) = create_service();

        let updated = service
            .update_member(MemberId::new(42), UpdateMemberRequest::default())
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let (service, _) = create_service();
        let before = joined(&service, "a@x.com").await;

        let request = UpdateMemberRequest {
            nickname: Some("renamed".to_string()),
            password: Some("p2".to_string()),
            birth: None,
        };
        assert!(service.update_member(before.id(), request).await.unwrap());

        let after = service.get_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(after.nickname(), "renamed");
        assert_eq!(after.birth(), before.birth());
        assert!(service.check_password(before.id(), "p2").await.unwrap());

        let login = service.login(login_request("a@x.com", "p2")).await;
        tokio_test::assert_ok!(login);
    }

    #[tokio::test]
    async fn test_refresh_issues_new_access_token() {
        let (service, _) = create_service();
        joined(&service, "a@x.com").await;
        let login = service.login(login_request("a@x.com", "p1")).await.unwrap();

        let refreshed = service.refresh(&login.refresh_token).await.unwrap();
        assert_eq!(refreshed.email, "a@x.com");
        assert_eq!(refreshed.expires_in, 30 * 60);
        assert!(!refreshed.access_token.is_empty());

        let wrong_kind = service.refresh(&login.access_token).await;
        assert!(matches!(wrong_kind, Err(MemberError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_refresh_refused_after_withdrawal() {
        let (service, _) = create_service();
        joined(&service, "a@x.com").await;
        let login = service.login(login_request("a@x.com", "p1")).await.unwrap();

        service.withdraw_member("a@x.com").await.unwrap();

        let result = service.refresh(&login.refresh_token).await;
        assert!(matches!(result, Err(MemberError::AccountWithdrawn)));
    }

    #[tokio::test]
    async fn test_check_email_duplicate() {
        let (service, _) = create_service();
        tokio_test::assert_ok!(service.check_email_duplicate("a@x.com").await);

        joined(&service, "a@x.com").await;
        let result = service.check_email_duplicate("a@x.com").await;
        assert!(matches!(result, Err(MemberError::DuplicateEmail)));
    }
}
