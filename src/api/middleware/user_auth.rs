//! Member authentication extractor using JWT access tokens

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::member::Member;
use crate::infrastructure::auth::TokenKind;

/// Extractor that requires a valid access token of an active member
///
/// Reads `Authorization: Bearer <access_token>`. Refresh tokens are refused.
#[derive(Debug, Clone)]
pub struct RequireMember(pub Member);

impl FromRequestParts<AppState> for RequireMember {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;

        let claims = state
            .token_issuer
            .validate(&token, TokenKind::Access)
            .map_err(|e| {
                debug!(error = %e, "Rejected access token");
                ApiError::unauthorized("Invalid or expired access token")
                    .with_code("invalid_token")
            })?;

        let member = state
            .member_service
            .get_by_email(claims.email())
            .await?
            .ok_or_else(|| ApiError::unauthorized("Member not found"))?;

        if member.is_withdrawn() {
            return Err(ApiError::forbidden("Member has withdrawn").with_code("account_withdrawn"));
        }

        Ok(RequireMember(member))
    }
}

/// Extract the bearer token from the Authorization header
pub fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Result<String, ApiError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            let token = token.trim();

            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }
    }

    Err(ApiError::unauthorized(
        "Authentication required. Provide an access token via 'Authorization: Bearer <token>' header",
    ))
}
