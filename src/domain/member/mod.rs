//! Member domain
//!
//! Member accounts, their lifecycle role, input validation, the typed
//! lifecycle errors and the repository trait.

mod entity;
mod error;
mod repository;
mod validation;

pub use entity::{Member, MemberId, NewMember, Role};
pub use error::{MemberError, Severity};
pub use repository::MemberRepository;
pub use validation::{parse_birth, validate_email, MemberValidationError};

#[cfg(test)]
pub use repository::mock::MockMemberRepository;
