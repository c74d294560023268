//! PostgreSQL member repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::member::{Member, MemberId, MemberRepository, NewMember, Role};
use crate::domain::DomainError;

const MEMBER_COLUMNS: &str =
    "id, email, password_hash, nickname, birth, role, created_at, updated_at";

/// PostgreSQL implementation of MemberRepository
#[derive(Debug, Clone)]
pub struct PostgresMemberRepository {
    pool: PgPool,
}

impl PostgresMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn create(&self, member: &NewMember) -> Result<Option<MemberId>, DomainError> {
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO members (email, password_hash, nickname, birth, role,
                                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING id
            "#,
        )
        .bind(&member.email)
        .bind(&member.password_hash)
        .bind(&member.nickname)
        .bind(member.birth)
        .bind(member.role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict(format!("Email '{}' already exists", member.email))
            } else {
                DomainError::storage(format!("Failed to create member: {}", e))
            }
        })?;

        Ok(id.map(MemberId::new))
    }

    async fn find_by_id(&self, id: MemberId) -> Result<Option<Member>, DomainError> {
        let row = sqlx::query(&format!("SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1"))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get member: {}", e)))?;

        row.as_ref().map(row_to_member).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Member>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get member by email: {}", e)))?;

        row.as_ref().map(row_to_member).transpose()
    }

    async fn update(&self, member: &Member) -> Result<Member, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET email = $2, password_hash = $3, nickname = $4, birth = $5,
                role = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(member.id().value())
        .bind(member.email())
        .bind(member.password_hash())
        .bind(member.nickname())
        .bind(member.birth())
        .bind(member.role().as_str())
        .bind(member.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict(format!("Email '{}' already exists", member.email()))
            } else {
                DomainError::storage(format!("Failed to update member: {}", e))
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Member '{}' not found",
                member.id()
            )));
        }

        Ok(member.clone())
    }

    async fn discard(&self, id: MemberId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to discard member: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists_by_id(&self, id: MemberId) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE id = $1)")
            .bind(id.value())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check member id: {}", e)))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check member email: {}", e)))
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

fn row_to_member(row: &sqlx::postgres::PgRow) -> Result<Member, DomainError> {
    let role: String = row.get("role");
    let role = str_to_role(&role)?;

    Ok(Member::restore(
        MemberId::new(row.get("id")),
        row.get("email"),
        row.get("password_hash"),
        row.get("nickname"),
        row.get("birth"),
        role,
        row.get("created_at"),
        row.get("updated_at"),
    ))
}

fn str_to_role(s: &str) -> Result<Role, DomainError> {
    Role::parse(s).ok_or_else(|| DomainError::storage(format!("Unknown member role in database: '{}'", s)))
}
