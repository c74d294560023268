//! Cart entry entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One item line in a member's cart
///
/// The owner is the member's email, the same identity carried in tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    id: i64,
    member_id: String,
    item_id: i64,
    quantity: i32,
    created_at: DateTime<Utc>,
}

impl CartEntry {
    pub fn new(id: i64, member_id: impl Into<String>, item_id: i64, quantity: i32) -> Self {
        Self {
            id,
            member_id: member_id.into(),
            item_id,
            quantity,
            created_at: Utc::now(),
        }
    }

    /// Override the creation timestamp (used when loading from storage)
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn member_id(&self) -> &str {
        &self.member_id
    }

    pub fn item_id(&self) -> i64 {
        self.item_id
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Check whether this entry belongs to the owner and item
    pub fn matches(&self, member_id: &str, item_id: i64) -> bool {
        self.member_id == member_id && self.item_id == item_id
    }
}
