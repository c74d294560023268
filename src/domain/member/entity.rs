//! Member entity and related types

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-generated member identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(i64);

impl MemberId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for MemberId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle role of a member account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular shopper
    #[default]
    User,
    /// Shop administrator
    Admin,
    /// Withdrawn account (soft-deleted)
    Unregister,
}

impl Role {
    /// Check if an account with this role may authenticate
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Unregister)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Unregister => "unregister",
        }
    }

    /// Parse a stored role name, `None` for anything unknown
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            "unregister" => Some(Self::Unregister),
            _ => None,
        }
    }
}

/// A member that has not been persisted yet and therefore has no id
#[derive(Debug, Clone)]
pub struct NewMember {
    pub email: String,
    pub password_hash: String,
    pub nickname: String,
    pub birth: NaiveDateTime,
    pub role: Role,
}

impl NewMember {
    /// Build a new member with the default active role
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        nickname: impl Into<String>,
        birth: NaiveDateTime,
    ) -> Self {
        Self {
            email: email.into(),
            password_hash: password_hash.into(),
            nickname: nickname.into(),
            birth,
            role: Role::default(),
        }
    }
}

/// Persisted member account
#[derive(Debug, Clone, Serialize)]
pub struct Member {
    id: MemberId,
    /// Login identity, unique across all members
    email: String,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing)]
    password_hash: String,
    nickname: String,
    birth: NaiveDateTime,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Member {
    /// Attach a store-generated id to a new member
    pub fn from_new(id: MemberId, new_member: NewMember) -> Self {
        let now = Utc::now();

        Self {
            id,
            email: new_member.email,
            password_hash: new_member.password_hash,
            nickname: new_member.nickname,
            birth: new_member.birth,
            role: new_member.role,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a member from a stored row
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: MemberId,
        email: String,
        password_hash: String,
        nickname: String,
        birth: NaiveDateTime,
        role: Role,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            password_hash,
            nickname,
            birth,
            role,
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn birth(&self) -> NaiveDateTime {
        self.birth
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_withdrawn(&self) -> bool {
        self.role == Role::Unregister
    }

    // Mutators

    pub fn set_nickname(&mut self, nickname: impl Into<String>) {
        self.nickname = nickname.into();
        self.touch();
    }

    pub fn set_password_hash(&mut self, password_hash: impl Into<String>) {
        self.password_hash = password_hash.into();
        self.touch();
    }

    pub fn set_birth(&mut self, birth: NaiveDateTime) {
        self.birth = birth;
        self.touch();
    }

    /// Soft-delete the account. The transition is one-way; withdrawing an
    /// already withdrawn member leaves it unchanged.
    pub fn withdraw(&mut self) {
        if self.role != Role::Unregister {
            self.role = Role::Unregister;
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
