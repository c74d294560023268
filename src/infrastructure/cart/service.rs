//! Cart lookup service

use std::sync::Arc;

use tracing::debug;

use crate::domain::cart::{CartEntry, CartRepository};
use crate::domain::DomainError;

/// Read-only cart queries for a member
#[derive(Debug)]
pub struct CartService<R: CartRepository> {
    repository: Arc<R>,
}

impl<R: CartRepository> CartService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// All cart entries owned by a member
    pub async fn find_by_owner(&self, owner: &str) -> Result<Vec<CartEntry>, DomainError> {
        let entries = self.repository.find_by_member_id(owner).await?;
        debug!(count = entries.len(), "Loaded cart entries");
        Ok(entries)
    }

    /// One item in a member's cart; `None` when the item is not in the cart
    pub async fn find_by_owner_and_item(
        &self,
        owner: &str,
        item_id: i64,
    ) -> Result<Option<CartEntry>, DomainError> {
        self.repository
            .find_by_member_id_and_item_id(owner, item_id)
            .await
    }
}
