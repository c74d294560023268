//! Authentication infrastructure module
//!
//! Credential verification and JWT access/refresh token management.

mod authentication;
mod jwt;

pub use authentication::{AuthenticationError, AuthenticationManager, MemberAuthenticationManager};
pub use jwt::{JwtClaims, JwtConfig, JwtService, TokenIssuer, TokenKind};

#[cfg(test)]
pub use authentication::MockAuthenticationManager;
