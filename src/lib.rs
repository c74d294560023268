//! Shop backend
//!
//! Member accounts and cart lookups for an e-commerce service:
//! - Registration with Argon2 password hashing and duplicate-email checks
//! - Login issuing JWT access and refresh tokens
//! - Partial profile updates and soft withdrawal
//! - Read-only cart queries scoped to the authenticated member

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use crate::config::{AuthConfig, DatabaseBackend};
use domain::{CartRepository, MemberRepository};
use infrastructure::{
    auth::{JwtService, MemberAuthenticationManager, TokenIssuer},
    cart::{CartService, InMemoryCartRepository, PostgresCartRepository},
    member::{
        Argon2PasswordEncoder, InMemoryMemberRepository, MemberService, PostgresMemberRepository,
    },
    storage,
};
use tracing::{info, warn};

/// Create the application state for the configured storage backend
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    if config.auth.uses_default_secret() {
        warn!("Using the built-in JWT secret; set APP__AUTH__JWT_SECRET outside development");
    }

    info!(backend = ?config.database.backend, "Storage backend");

    match config.database.backend {
        DatabaseBackend::Memory => Ok(memory_state(
            &config.auth,
            InMemoryCartRepository::new(),
        )),
        DatabaseBackend::Postgres => {
            let pool = config.database.postgres().connect().await?;

            if config.database.run_migrations {
                let applied = storage::run_migrations(&pool).await?;
                info!(applied, "Database migrations complete");
            }

            let state = build_state(
                Arc::new(PostgresMemberRepository::new(pool.clone())),
                Arc::new(PostgresCartRepository::new(pool.clone())),
                &config.auth,
            );

            Ok(state.with_database(pool))
        }
    }
}

/// State backed entirely by process-local storage
pub fn memory_state(auth: &AuthConfig, carts: InMemoryCartRepository) -> AppState {
    build_state(
        Arc::new(InMemoryMemberRepository::new()),
        Arc::new(carts),
        auth,
    )
}

fn build_state<M, C>(members: Arc<M>, carts: Arc<C>, auth: &AuthConfig) -> AppState
where
    M: MemberRepository + 'static,
    C: CartRepository + 'static,
{
    let encoder = Arc::new(Argon2PasswordEncoder::new());
    let tokens: Arc<dyn TokenIssuer> = Arc::new(JwtService::new(auth.jwt()));
    let authentication = Arc::new(MemberAuthenticationManager::new(
        members.clone(),
        encoder.clone(),
    ));

    let member_service = Arc::new(MemberService::new(
        members,
        encoder,
        authentication,
        tokens.clone(),
    ));
    let cart_service = Arc::new(CartService::new(carts));

    AppState::new(member_service, cart_service, tokens)
}
