//! JWT access and refresh token issuing and validation

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::DomainError;

/// Which of the two token flavours a JWT is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (member email)
    pub sub: String,
    /// Token flavour, so a refresh token cannot be used as an access token
    pub kind: TokenKind,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl JwtClaims {
    /// Claims issued now and expiring after `lifetime`.
    ///
    /// Returns `None` if the expiry is not representable.
    pub fn new(subject: impl Into<String>, kind: TokenKind, lifetime: Duration) -> Option<Self> {
        let now = Utc::now();
        let exp = now.checked_add_signed(lifetime)?;

        Some(Self {
            sub: subject.into(),
            kind,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// The identity the token is bound to
    pub fn email(&self) -> &str {
        &self.sub
    }
}

/// Configuration for the token issuer
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for HS256 signing
    pub secret: String,
    pub access_token_minutes: u64,
    pub refresh_token_days: u64,
}

impl JwtConfig {
    pub fn new(
        secret: impl Into<String>,
        access_token_minutes: u64,
        refresh_token_days: u64,
    ) -> Self {
        Self {
            secret: secret.into(),
            access_token_minutes,
            refresh_token_days,
        }
    }

    /// Reject lifetimes that are zero or too large to put in a token
    pub fn validate(&self) -> Result<(), DomainError> {
        for kind in [TokenKind::Access, TokenKind::Refresh] {
            let lifetime = self.lifetime(kind)?;

            if lifetime <= Duration::zero() {
                return Err(DomainError::configuration(format!(
                    "{:?} token lifetime must be positive",
                    kind
                )));
            }

            if Utc::now().checked_add_signed(lifetime).is_none() {
                return Err(DomainError::configuration(format!(
                    "{:?} token lifetime is too large",
                    kind
                )));
            }
        }

        Ok(())
    }

    fn lifetime(&self, kind: TokenKind) -> Result<Duration, DomainError> {
        let lifetime = match kind {
            TokenKind::Access => i64::try_from(self.access_token_minutes)
                .ok()
                .and_then(Duration::try_minutes),
            TokenKind::Refresh => i64::try_from(self.refresh_token_days)
                .ok()
                .and_then(Duration::try_days),
        };

        lifetime.ok_or_else(|| {
            DomainError::configuration(format!("{:?} token lifetime is out of range", kind))
        })
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            access_token_minutes: 30,
            refresh_token_days: 14,
        }
    }
}

/// Stateless issuer of tokens bound to a member email
pub trait TokenIssuer: Send + Sync + Debug {
    fn generate_access_token(&self, email: &str) -> Result<String, DomainError>;

    fn generate_refresh_token(&self, email: &str) -> Result<String, DomainError>;

    /// Validate signature, expiry and flavour of a token
    fn validate(&self, token: &str, expected: TokenKind) -> Result<JwtClaims, DomainError>;

    /// Access token lifetime in seconds
    fn access_token_ttl_secs(&self) -> Result<i64, DomainError>;
}

/// HS256 token issuer
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_token_minutes", &self.config.access_token_minutes)
            .field("refresh_token_days", &self.config.refresh_token_days)
            .field("secret", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    fn generate(&self, email: &str, kind: TokenKind) -> Result<String, DomainError> {
        let claims = JwtClaims::new(email, kind, self.config.lifetime(kind)?).ok_or_else(|| {
            DomainError::configuration(format!("{:?} token expiry is out of range", kind))
        })?;

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to generate JWT: {}", e)))
    }
}

impl TokenIssuer for JwtService {
    fn generate_access_token(&self, email: &str) -> Result<String, DomainError> {
        self.generate(email, TokenKind::Access)
    }

    fn generate_refresh_token(&self, email: &str) -> Result<String, DomainError> {
        self.generate(email, TokenKind::Refresh)
    }

    fn validate(&self, token: &str, expected: TokenKind) -> Result<JwtClaims, DomainError> {
        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| DomainError::validation(format!("Invalid JWT: {}", e)))?;

        if token_data.claims.kind != expected {
            return Err(DomainError::validation(format!(
                "Expected a {:?} token",
                expected
            )));
        }

        Ok(token_data.claims)
    }

    fn access_token_ttl_secs(&self) -> Result<i64, DomainError> {
        Ok(self.config.lifetime(TokenKind::Access)?.num_seconds())
    }
}
