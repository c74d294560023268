//! In-memory member repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::member::{Member, MemberId, MemberRepository, NewMember};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct MemberTable {
    rows: HashMap<MemberId, Member>,
    /// Unique index email -> member id
    email_index: HashMap<String, MemberId>,
    last_id: i64,
}

/// In-memory implementation of MemberRepository
///
/// Rows and the email index live behind one lock so the uniqueness check and
/// the insert happen atomically.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMemberRepository {
    table: Arc<RwLock<MemberTable>>,
}

impl InMemoryMemberRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberRepository for InMemoryMemberRepository {
    async fn create(&self, member: &NewMember) -> Result<Option<MemberId>, DomainError> {
        let mut table = self.table.write().await;

        if table.email_index.contains_key(&member.email) {
            return Err(DomainError::conflict(format!(
                "Email '{}' already exists",
                member.email
            )));
        }

        table.last_id += 1;
        let id = MemberId::new(table.last_id);

        table.email_index.insert(member.email.clone(), id);
        table.rows.insert(id, Member::from_new(id, member.clone()));

        Ok(Some(id))
    }

    async fn find_by_id(&self, id: MemberId) -> Result<Option<Member>, DomainError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Member>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .email_index
            .get(email)
            .and_then(|id| table.rows.get(id))
            .cloned())
    }

    async fn update(&self, member: &Member) -> Result<Member, DomainError> {
        let mut table = self.table.write().await;

        let Some(old_email) = table.rows.get(&member.id()).map(|m| m.email().to_string()) else {
            return Err(DomainError::not_found(format!(
                "Member '{}' not found",
                member.id()
            )));
        };

        if old_email != member.email() {
            if table.email_index.contains_key(member.email()) {
                return Err(DomainError::conflict(format!(
                    "Email '{}' already exists",
                    member.email()
                )));
            }

            table.email_index.remove(&old_email);
            table
                .email_index
                .insert(member.email().to_string(), member.id());
        }

        table.rows.insert(member.id(), member.clone());

        Ok(member.clone())
    }

    async fn discard(&self, id: MemberId) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;

        match table.rows.remove(&id) {
            Some(member) => {
                table.email_index.remove(member.email());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
