//! Member account endpoints
//!
//! Registration, login, token refresh and the authenticated account operations.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireMember;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::member::{parse_birth, Member, MemberError, MemberId};
use crate::infrastructure::member::{
    JoinRequest, JoinResponse, LoginRequest, LoginResponse, RefreshResponse, UpdateMemberRequest,
};

pub fn create_member_router() -> Router<AppState> {
    Router::new()
        .route("/check-email", get(check_email))
        .route("/join", post(join))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/me", delete(withdraw))
        .route("/{id}", patch(update_member))
        .route("/{id}/check-password", post(check_password))
}

#[derive(Debug, Deserialize)]
pub struct CheckEmailQuery {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CheckEmailResponse {
    pub available: bool,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckPasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct CheckPasswordResponse {
    pub matches: bool,
}

/// Body of `PATCH /members/{id}`; birth uses `yyyyMMdd`
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMemberBody {
    pub nickname: Option<String>,
    pub password: Option<String>,
    pub birth: Option<String>,
}

impl UpdateMemberBody {
    fn into_request(self) -> Result<UpdateMemberRequest, MemberError> {
        let birth = self
            .birth
            .as_deref()
            .map(parse_birth)
            .transpose()
            .map_err(MemberError::InvalidDate)?;

        Ok(UpdateMemberRequest {
            nickname: self.nickname,
            password: self.password,
            birth,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateMemberResponse {
    pub updated: bool,
}

#[derive(Debug, Serialize)]
pub struct WithdrawResponse {
    pub withdrawn: bool,
}

/// GET /members/check-email?email=
pub async fn check_email(
    State(state): State<AppState>,
    Query(query): Query<CheckEmailQuery>,
) -> Result<Json<CheckEmailResponse>, ApiError> {
    state
        .member_service
        .check_email_duplicate(&query.email)
        .await?;

    Ok(Json(CheckEmailResponse { available: true }))
}

/// POST /members/join
pub async fn join(
    State(state): State<AppState>,
    Json(request): Json<JoinRequest>,
) -> Result<(StatusCode, Json<JoinResponse>), ApiError> {
    let response = state.member_service.join(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /members/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    Ok(Json(state.member_service.login(request).await?))
}

/// POST /members/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    Ok(Json(
        state.member_service.refresh(&request.refresh_token).await?,
    ))
}

/// POST /members/{id}/check-password
pub async fn check_password(
    State(state): State<AppState>,
    RequireMember(member): RequireMember,
    Path(id): Path<i64>,
    Json(request): Json<CheckPasswordRequest>,
) -> Result<Json<CheckPasswordResponse>, ApiError> {
    let id = ensure_self(&member, id)?;
    let matches = state
        .member_service
        .check_password(id, &request.password)
        .await?;

    Ok(Json(CheckPasswordResponse { matches }))
}

/// PATCH /members/{id}
pub async fn update_member(
    State(state): State<AppState>,
    RequireMember(member): RequireMember,
    Path(id): Path<i64>,
    Json(body): Json<UpdateMemberBody>,
) -> Result<Json<UpdateMemberResponse>, ApiError> {
    let id = ensure_self(&member, id)?;
    let request = body.into_request()?;
    let updated = state.member_service.update_member(id, request).await?;

    Ok(Json(UpdateMemberResponse { updated }))
}

/// DELETE /members/me
pub async fn withdraw(
    State(state): State<AppState>,
    RequireMember(member): RequireMember,
) -> Result<Json<WithdrawResponse>, ApiError> {
    let withdrawn = state.member_service.withdraw_member(member.email()).await?;
    Ok(Json(WithdrawResponse { withdrawn }))
}

fn ensure_self(member: &Member, id: i64) -> Result<MemberId, ApiError> {
    let id = MemberId::new(id);

    if member.id() != id {
        return Err(ApiError::forbidden("Members may only act on their own account"));
    }

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router::create_router_with_state;
    use crate::config::AuthConfig;
    use crate::infrastructure::cart::InMemoryCartRepository;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        create_router_with_state(crate::memory_state(
            &AuthConfig::default(),
            InMemoryCartRepository::new(),
        ))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }

    async fn join_and_login(app: &Router, email: &str) -> Value {
        let (status, _) = send(
            app,
            Method::POST,
            "/members/join",
            None,
            Some(json!({
                "email": email,
                "password": "p1",
                "check_password": "p1",
                "nickname": "nick",
                "birth": "20000101"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            app,
            Method::POST,
            "/members/login",
            None,
            Some(json!({ "email": email, "password": "p1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn test_join_login_and_duplicate() {
        let app = app();
        let login = join_and_login(&app, "a@x.com").await;

        assert_eq!(login["email"], "a@x.com");
        assert!(login["access_token"].as_str().is_some());
        assert!(login["refresh_token"].as_str().is_some());
        assert_eq!(login["expires_in"], 1800);

        let (status, body) = send(
            &app,
            Method::GET,
            "/members/check-email?email=a@x.com",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "duplicate_email");

        let (status, body) = send(
            &app,
            Method::GET,
            "/members/check-email?email=b@x.com",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["available"], true);
    }

    #[tokio::test]
    async fn test_join_rejects_bad_input() {
        let app = app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/members/join",
            None,
            Some(json!({
                "email": "a@x.com",
                "password": "p1",
                "check_password": "p2",
                "nickname": "nick",
                "birth": "20000101"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "password_mismatch");

        let (status, body) = send(
            &app,
            Method::POST,
            "/members/join",
            None,
            Some(json!({ "email": "a@x.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "json_parse_error");
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let app = app();
        join_and_login(&app, "a@x.com").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/members/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "wrong" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_credentials");
    }

    #[tokio::test]
    async fn test_update_and_check_password() {
        let app = app();
        let login = join_and_login(&app, "a@x.com").await;
        let token = login["access_token"].as_str().unwrap();

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/members/1",
            Some(token),
            Some(json!({ "nickname": "renamed", "password": "p2", "birth": "19991231" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["updated"], true);

        let (status, body) = send(
            &app,
            Method::POST,
            "/members/1/check-password",
            Some(token),
            Some(json!({ "password": "p2" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matches"], true);

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/members/1",
            Some(token),
            Some(json!({ "birth": "1999-12-31" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_date");
    }

    #[tokio::test]
    async fn test_cannot_touch_other_members() {
        let app = app();
        join_and_login(&app, "a@x.com").await;
        let login = join_and_login(&app, "b@x.com").await;
        let token = login["access_token"].as_str().unwrap();

        let (status, _) = send(
            &app,
            Method::PATCH,
            "/members/1",
            Some(token),
            Some(json!({ "nickname": "hijacked" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_authenticated_routes_require_token() {
        let app = app();

        let (status, _) = send(&app, Method::DELETE, "/members/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, Method::DELETE, "/members/me", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_an_access_token() {
        let app = app();
        let login = join_and_login(&app, "a@x.com").await;
        let refresh_token = login["refresh_token"].as_str().unwrap();

        let (status, _) = send(&app, Method::DELETE, "/members/me", Some(refresh_token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            Method::POST,
            "/members/refresh",
            None,
            Some(json!({ "refresh_token": refresh_token })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "a@x.com");
        assert!(body["access_token"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_withdraw_blocks_further_access() {
        let app = app();
        let login = join_and_login(&app, "a@x.com").await;
        let token = login["access_token"].as_str().unwrap();

        let (status, body) = send(&app, Method::DELETE, "/members/me", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["withdrawn"], true);

        let (status, body) = send(&app, Method::DELETE, "/members/me", Some(token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "account_withdrawn");

        let (status, body) = send(
            &app,
            Method::POST,
            "/members/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "p1" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "account_withdrawn");
    }
}
