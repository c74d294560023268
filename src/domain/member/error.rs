//! Member lifecycle failures

use thiserror::Error;

use super::validation::MemberValidationError;
use crate::domain::DomainError;

/// How a failure should be reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The request itself is wrong
    ClientError,
    /// The caller presented no usable credentials
    Unauthorized,
    /// The caller is not allowed to do this
    Forbidden,
    /// The addressed resource does not exist
    NotFound,
    /// Something went wrong on our side
    ServerError,
}

/// Typed failures of the member lifecycle operations
#[derive(Debug, Error)]
pub enum MemberError {
    #[error("Email is already in use")]
    DuplicateEmail,

    #[error("Password and confirmation do not match")]
    PasswordMismatch,

    #[error("Invalid birth date: {0}")]
    InvalidDate(MemberValidationError),

    #[error("Invalid email: {0}")]
    InvalidEmail(MemberValidationError),

    #[error("Member has withdrawn")]
    AccountWithdrawn,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Email or password is incorrect")]
    InvalidCredentials,

    #[error("Member not found")]
    AccountNotFound,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Failed to register member: {0}")]
    Persistence(String),

    #[error(transparent)]
    Storage(#[from] DomainError),
}

impl MemberError {
    pub fn severity(&self) -> Severity {
        match self {
            Self::DuplicateEmail
            | Self::PasswordMismatch
            | Self::InvalidDate(_)
            | Self::InvalidEmail(_)
            | Self::AccountDisabled
            | Self::InvalidCredentials => Severity::ClientError,
            Self::InvalidToken(_) => Severity::Unauthorized,
            Self::AccountWithdrawn => Severity::Forbidden,
            Self::AccountNotFound => Severity::NotFound,
            Self::Persistence(_) | Self::Storage(_) => Severity::ServerError,
        }
    }

    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateEmail => "duplicate_email",
            Self::PasswordMismatch => "password_mismatch",
            Self::InvalidDate(_) => "invalid_date",
            Self::InvalidEmail(_) => "invalid_email",
            Self::AccountWithdrawn => "account_withdrawn",
            Self::AccountDisabled => "account_disabled",
            Self::InvalidCredentials => "invalid_credentials",
            Self::AccountNotFound => "account_not_found",
            Self::InvalidToken(_) => "invalid_token",
            Self::Persistence(_) => "persistence_error",
            Self::Storage(_) => "storage_error",
        }
    }
}
