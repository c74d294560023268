//! PostgreSQL cart repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::cart::{CartEntry, CartRepository};
use crate::domain::DomainError;

/// PostgreSQL implementation of CartRepository
#[derive(Debug, Clone)]
pub struct PostgresCartRepository {
    pool: PgPool,
}

impl PostgresCartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartRepository for PostgresCartRepository {
    async fn find_by_member_id(&self, member_id: &str) -> Result<Vec<CartEntry>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, member_id, item_id, quantity, created_at
            FROM carts
            WHERE member_id = $1
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list cart entries: {}", e)))?;

        Ok(rows.iter().map(row_to_entry).collect())
    }

    async fn find_by_member_id_and_item_id(
        &self,
        member_id: &str,
        item_id: i64,
    ) -> Result<Option<CartEntry>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, member_id, item_id, quantity, created_at
            FROM carts
            WHERE member_id = $1 AND item_id = $2
            "#,
        )
        .bind(member_id)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get cart entry: {}", e)))?;

        Ok(row.as_ref().map(row_to_entry))
    }
}

fn row_to_entry(row: &sqlx::postgres::PgRow) -> CartEntry {
    let member_id: String = row.get("member_id");

    CartEntry::new(row.get("id"), member_id, row.get("item_id"), row.get("quantity"))
        .with_created_at(row.get("created_at"))
}
