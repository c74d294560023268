//! In-memory cart repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::cart::{CartEntry, CartRepository};
use crate::domain::DomainError;

/// In-memory implementation of CartRepository, keyed by owner
#[derive(Debug, Default, Clone)]
pub struct InMemoryCartRepository {
    entries: Arc<RwLock<HashMap<String, Vec<CartEntry>>>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository seeded with entries.
    ///
    /// Entries are keyed by (owner, item); a later entry replaces an earlier
    /// one with the same key.
    pub fn with_entries(entries: Vec<CartEntry>) -> Self {
        let mut by_owner: HashMap<String, Vec<CartEntry>> = HashMap::new();

        for entry in entries {
            let owned = by_owner.entry(entry.member_id().to_string()).or_default();

            match owned
                .iter_mut()
                .find(|e| e.matches(entry.member_id(), entry.item_id()))
            {
                Some(existing) => *existing = entry,
                None => owned.push(entry),
            }
        }

        Self {
            entries: Arc::new(RwLock::new(by_owner)),
        }
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn find_by_member_id(&self, member_id: &str) -> Result<Vec<CartEntry>, DomainError> {
        let entries = self.entries.read().await;
        Ok(entries.get(member_id).cloned().unwrap_or_default())
    }

    async fn find_by_member_id_and_item_id(
        &self,
        member_id: &str,
        item_id: i64,
    ) -> Result<Option<CartEntry>, DomainError> {
        let entries = self.entries.read().await;

        Ok(entries
            .get(member_id)
            .and_then(|owned| owned.iter().find(|e| e.matches(member_id, item_id)))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> InMemoryCartRepository {
        InMemoryCartRepository::with_entries(vec![
            CartEntry::new(1, "a@x.com", 10, 1),
            CartEntry::new(2, "a@x.com", 11, 3),
            CartEntry::new(3, "b@x.com", 10, 2),
        ])
    }

    #[tokio::test]
    async fn test_find_by_member_id() {
        let repo = seeded();

        let mut items: Vec<i64> = repo
            .find_by_member_id("a@x.com")
            .await
            .unwrap()
            .iter()
            .map(CartEntry::item_id)
            .collect();
        items.sort_unstable();

        assert_eq!(items, vec![10, 11]);
    }

    #[tokio::test]
    async fn test_find_by_unknown_member_is_empty() {
        let repo = seeded();
        assert!(repo.find_by_member_id("c@x.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_member_and_item() {
        let repo = seeded();

        let entry = repo
            .find_by_member_id_and_item_id("b@x.com", 10)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.id(), 3);
        assert_eq!(entry.quantity(), 2);

        let missing = repo
            .find_by_member_id_and_item_id("b@x.com", 11)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_key_keeps_last_entry() {
        let repo = InMemoryCartRepository::with_entries(vec![
            CartEntry::new(1, "a@x.com", 10, 1),
            CartEntry::new(2, "a@x.com", 10, 4),
        ]);

        let owned = repo.find_by_member_id("a@x.com").await.unwrap();
        assert_eq!(owned.len(), 1);

        let entry = repo
            .find_by_member_id_and_item_id("a@x.com", 10)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.id(), 2);
        assert_eq!(entry.quantity(), 4);
    }
}
