//! Domain layer - Core business entities, errors and repository traits

pub mod cart;
pub mod error;
pub mod member;

pub use cart::{CartEntry, CartRepository};
pub use error::DomainError;
pub use member::{
    Member, MemberError, MemberId, MemberRepository, NewMember, Role, Severity,
};
