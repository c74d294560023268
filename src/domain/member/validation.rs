//! Member input validation utilities

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Errors that can occur during member input validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MemberValidationError {
    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Email exceeds maximum length of {0} characters")]
    EmailTooLong(usize),

    #[error("Email must contain a single '@' with a local part and a domain")]
    MalformedEmail,

    #[error("Email contains invalid character: '{0}'")]
    InvalidEmailCharacter(char),

    #[error("Birth date must be exactly 8 digits in yyyyMMdd format, got '{0}'")]
    MalformedBirth(String),

    #[error("Birth date '{0}' is not a valid calendar date")]
    InvalidBirth(String),
}

const MAX_EMAIL_LENGTH: usize = 254;
const BIRTH_FORMAT_LENGTH: usize = 8;

/// Validate an email address
///
/// Rules:
/// - Cannot be empty
/// - Maximum 254 characters
/// - Exactly one '@' with non-empty local part and domain
/// - Domain labels separated by '.' are non-empty; single-label hosts such
///   as `localhost` are accepted
/// - No whitespace or control characters
pub fn validate_email(email: &str) -> Result<(), MemberValidationError> {
    if email.is_empty() {
        return Err(MemberValidationError::EmptyEmail);
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(MemberValidationError::EmailTooLong(MAX_EMAIL_LENGTH));
    }

    if let Some(c) = email.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(MemberValidationError::InvalidEmailCharacter(c));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or(MemberValidationError::MalformedEmail)?;

    if local.is_empty() || domain.contains('@') {
        return Err(MemberValidationError::MalformedEmail);
    }

    if domain.split('.').any(|label| label.is_empty()) {
        return Err(MemberValidationError::MalformedEmail);
    }

    Ok(())
}

/// Parse a `yyyyMMdd` birth string into a date-time at midnight
pub fn parse_birth(birth: &str) -> Result<NaiveDateTime, MemberValidationError> {
    if birth.len() != BIRTH_FORMAT_LENGTH || !birth.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MemberValidationError::MalformedBirth(birth.to_string()));
    }

    let invalid = || MemberValidationError::InvalidBirth(birth.to_string());

    // All bytes are ASCII digits, so these slices fall on char boundaries.
    let year: i32 = birth[0..4].parse().map_err(|_| invalid())?;
    let month: u32 = birth[4..6].parse().map_err(|_| invalid())?;
    let day: u32 = birth[6..8].parse().map_err(|_| invalid())?;

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;

    Ok(date.and_time(NaiveTime::MIN))
}
