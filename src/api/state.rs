//! Application state for shared services

use std::sync::Arc;

use sqlx::PgPool;

use crate::domain::cart::{CartEntry, CartRepository};
use crate::domain::member::{Member, MemberError, MemberId, MemberRepository};
use crate::domain::DomainError;
use crate::infrastructure::auth::TokenIssuer;
use crate::infrastructure::cart::CartService;
use crate::infrastructure::member::{
    JoinRequest, JoinResponse, LoginRequest, LoginResponse, MemberService, PasswordEncoder,
    RefreshResponse, UpdateMemberRequest,
};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub member_service: Arc<dyn MemberServiceTrait>,
    pub cart_service: Arc<dyn CartServiceTrait>,
    pub token_issuer: Arc<dyn TokenIssuer>,
    /// Present when running against PostgreSQL; probed by `/ready`
    pub database: Option<PgPool>,
}

impl AppState {
    pub fn new(
        member_service: Arc<dyn MemberServiceTrait>,
        cart_service: Arc<dyn CartServiceTrait>,
        token_issuer: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            member_service,
            cart_service,
            token_issuer,
            database: None,
        }
    }

    pub fn with_database(mut self, pool: PgPool) -> Self {
        self.database = Some(pool);
        self
    }
}

/// Trait for member service operations
#[async_trait::async_trait]
pub trait MemberServiceTrait: Send + Sync {
    async fn check_email_duplicate(&self, email: &str) -> Result<(), MemberError>;
    async fn join(&self, request: JoinRequest) -> Result<JoinResponse, MemberError>;
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, MemberError>;
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, MemberError>;
    async fn check_password(&self, id: MemberId, password: &str) -> Result<bool, MemberError>;
    async fn update_member(
        &self,
        id: MemberId,
        request: UpdateMemberRequest,
    ) -> Result<bool, MemberError>;
    async fn withdraw_member(&self, email: &str) -> Result<bool, MemberError>;
    async fn get_by_email(&self, email: &str) -> Result<Option<Member>, MemberError>;
}

/// Trait for cart lookups
#[async_trait::async_trait]
pub trait CartServiceTrait: Send + Sync {
    async fn find_by_owner(&self, owner: &str) -> Result<Vec<CartEntry>, DomainError>;
    async fn find_by_owner_and_item(
        &self,
        owner: &str,
        item_id: i64,
    ) -> Result<Option<CartEntry>, DomainError>;
}

#[async_trait::async_trait]
impl<R, E> MemberServiceTrait for MemberService<R, E>
where
    R: MemberRepository + 'static,
    E: PasswordEncoder + 'static,
{
    async fn check_email_duplicate(&self, email: &str) -> Result<(), MemberError> {
        MemberService::check_email_duplicate(self, email).await
    }

    async fn join(&self, request: JoinRequest) -> Result<JoinResponse, MemberError> {
        MemberService::join(self, request).await
    }

    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, MemberError> {
        MemberService::login(self, request).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, MemberError> {
        MemberService::refresh(self, refresh_token).await
    }

    async fn check_password(&self, id: MemberId, password: &str) -> Result<bool, MemberError> {
        MemberService::check_password(self, id, password).await
    }

    async fn update_member(
        &self,
        id: MemberId,
        request: UpdateMemberRequest,
    ) -> Result<bool, MemberError> {
        MemberService::update_member(self, id, request).await
    }

    async fn withdraw_member(&self, email: &str) -> Result<bool, MemberError> {
        MemberService::withdraw_member(self, email).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Member>, MemberError> {
        MemberService::get_by_email(self, email).await
    }
}

#[async_trait::async_trait]
impl<R: CartRepository + 'static> CartServiceTrait for CartService<R> {
    async fn find_by_owner(&self, owner: &str) -> Result<Vec<CartEntry>, DomainError> {
        CartService::find_by_owner(self, owner).await
    }

    async fn find_by_owner_and_item(
        &self,
        owner: &str,
        item_id: i64,
    ) -> Result<Option<CartEntry>, DomainError> {
        CartService::find_by_owner_and_item(self, owner, item_id).await
    }
}
