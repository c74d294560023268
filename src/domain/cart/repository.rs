//! Cart repository trait

use async_trait::async_trait;

use super::entity::CartEntry;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Read-only lookups against the cart store
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// All cart entries owned by a member, in no particular order
    async fn find_by_member_id(&self, member_id: &str) -> Result<Vec<CartEntry>, DomainError>;

    /// The entry for one item in a member's cart, if any
    async fn find_by_member_id_and_item_id(
        &self,
        member_id: &str,
        item_id: i64,
    ) -> Result<Option<CartEntry>, DomainError>;
}
