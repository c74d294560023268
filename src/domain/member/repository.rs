//! Member repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Member, MemberId, NewMember};
use crate::domain::DomainError;

/// Repository trait for member storage
#[async_trait]
pub trait MemberRepository: Send + Sync + Debug {
    /// Insert a new member and return the id the store generated for it.
    ///
    /// `Ok(None)` means the store handed back no id and nothing was stored.
    /// Fails with `DomainError::Conflict` when the email is already taken.
    async fn create(&self, member: &NewMember) -> Result<Option<MemberId>, DomainError>;

    /// Get a member by id
    async fn find_by_id(&self, id: MemberId) -> Result<Option<Member>, DomainError>;

    /// Get a member by email (for login)
    async fn find_by_email(&self, email: &str) -> Result<Option<Member>, DomainError>;

    /// Persist changes to an existing member
    async fn update(&self, member: &Member) -> Result<Member, DomainError>;

    /// Remove a member inserted by a join that did not complete.
    ///
    /// Lifecycle operations never call this; withdrawal is a role change.
    async fn discard(&self, id: MemberId) -> Result<bool, DomainError>;

    /// Check if a member id exists
    async fn exists_by_id(&self, id: MemberId) -> Result<bool, DomainError> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    /// Check if an email is already registered
    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.find_by_email(email).await?.is_some())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Mock member repository for testing
    #[derive(Debug, Default)]
    pub struct MockMemberRepository {
        members: Arc<RwLock<HashMap<i64, Member>>>,
        next_id: Arc<RwLock<i64>>,
        should_fail: Arc<RwLock<bool>>,
        withhold_ids: Arc<RwLock<bool>>,
        stale_email_lookups: Arc<RwLock<bool>>,
        writes: Arc<RwLock<usize>>,
    }

    impl MockMemberRepository {
        /// Create a new mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Set whether operations should fail
        pub async fn set_should_fail(&self, fail: bool) {
            *self.should_fail.write().await = fail;
        }

        /// Make `create` return no generated id (and store nothing)
        pub async fn set_withhold_ids(&self, withhold: bool) {
            *self.withhold_ids.write().await = withhold;
        }

        /// Make `find_by_email` miss every member, like a check that ran
        /// before a concurrent insert committed
        pub async fn set_stale_email_lookups(&self, stale: bool) {
            *self.stale_email_lookups.write().await = stale;
        }

        /// Number of write calls (create/update/discard) seen so far
        pub async fn write_count(&self) -> usize {
            *self.writes.read().await
        }

        /// Number of members currently stored
        pub async fn len(&self) -> usize {
            self.members.read().await.len()
        }

        async fn check_should_fail(&self) -> Result<(), DomainError> {
            if *self.should_fail.read().await {
                return Err(DomainError::storage("Mock repository configured to fail"));
            }
            Ok(())
        }

        async fn record_write(&self) {
            *self.writes.write().await += 1;
        }
    }

    #[async_trait]
    impl MemberRepository for MockMemberRepository {
        async fn create(&self, member: &NewMember) -> Result<Option<MemberId>, DomainError> {
            self.check_should_fail().await?;
            self.record_write().await;

            let mut members = self.members.write().await;

            if members.values().any(|m| m.email() == member.email) {
                return Err(DomainError::conflict(format!(
                    "Email '{}' already exists",
                    member.email
                )));
            }

            if *self.withhold_ids.read().await {
                return Ok(None);
            }

            let mut next_id = self.next_id.write().await;
            *next_id += 1;
            let id = MemberId::new(*next_id);
            members.insert(id.value(), Member::from_new(id, member.clone()));

            Ok(Some(id))
        }

        async fn find_by_id(&self, id: MemberId) -> Result<Option<Member>, DomainError> {
            self.check_should_fail().await?;
            Ok(self.members.read().await.get(&id.value()).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<Member>, DomainError> {
            self.check_should_fail().await?;

            if *self.stale_email_lookups.read().await {
                return Ok(None);
            }

            let members = self.members.read().await;
            Ok(members.values().find(|m| m.email() == email).cloned())
        }

        async fn update(&self, member: &Member) -> Result<Member, DomainError> {
            self.check_should_fail().await?;
            self.record_write().await;

            let mut members = self.members.write().await;

            if !members.contains_key(&member.id().value()) {
                return Err(DomainError::not_found(format!(
                    "Member '{}' not found",
                    member.id()
                )));
            }

            members.insert(member.id().value(), member.clone());
            Ok(member.clone())
        }

        async fn discard(&self, id: MemberId) -> Result<bool, DomainError> {
            self.check_should_fail().await?;
            self.record_write().await;
            Ok(self.members.write().await.remove(&id.value()).is_some())
        }
    }
}
