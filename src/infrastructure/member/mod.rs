//! Member infrastructure module
//!
//! Password hashing, member storage backends and the member lifecycle service.

mod password;
mod postgres_repository;
mod repository;
mod service;

pub use password::{encode_blocking, matches_blocking, Argon2PasswordEncoder, PasswordEncoder};
pub use postgres_repository::PostgresMemberRepository;
pub use repository::InMemoryMemberRepository;
pub use service::{
    JoinRequest, JoinResponse, LoginRequest, LoginResponse, MemberService, RefreshResponse,
    UpdateMemberRequest,
};
