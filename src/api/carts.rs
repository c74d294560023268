//! Cart lookup endpoints for the authenticated member

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::middleware::RequireMember;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::cart::CartEntry;

pub fn create_cart_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(list_my_cart))
        .route("/me/items/{item_id}", get(get_my_cart_item))
}

#[derive(Debug, Serialize)]
pub struct CartEntryResponse {
    pub id: i64,
    pub item_id: i64,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&CartEntry> for CartEntryResponse {
    fn from(entry: &CartEntry) -> Self {
        Self {
            id: entry.id(),
            item_id: entry.item_id(),
            quantity: entry.quantity(),
            created_at: entry.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartEntryResponse>,
}

/// GET /carts/me
pub async fn list_my_cart(
    State(state): State<AppState>,
    RequireMember(member): RequireMember,
) -> Result<Json<CartResponse>, ApiError> {
    let entries = state.cart_service.find_by_owner(member.email()).await?;

    Ok(Json(CartResponse {
        items: entries.iter().map(CartEntryResponse::from).collect(),
    }))
}

/// GET /carts/me/items/{item_id}
pub async fn get_my_cart_item(
    State(state): State<AppState>,
    RequireMember(member): RequireMember,
    Path(item_id): Path<i64>,
) -> Result<Json<CartEntryResponse>, ApiError> {
    let entry = state
        .cart_service
        .find_by_owner_and_item(member.email(), item_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Item {} is not in the cart", item_id)))?;

    Ok(Json(CartEntryResponse::from(&entry)))
}
