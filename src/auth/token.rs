use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

lazy_static! {
    // Same shape check the registration path applies to incoming emails.
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Access-token lifetime, in seconds. Surfaced to clients as `expires_in`.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
/// Refresh-token lifetime, in seconds.
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// The two token flavors the service can mint.
///
/// Access tokens carry the account email and authorize API calls; refresh
/// tokens carry only the subject and are rejected by [`TokenService::verify`]
/// (there is no refresh-exchange endpoint in this core).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims encoded in a signed token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the account identifier.
    pub sub: Uuid,
    /// Account email; present on access tokens only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Failures the token service distinguishes. The auth gate maps `Expired`
/// and `Malformed` to 401 and `Configuration` to 500.
#[derive(Debug, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Malformed,
    Configuration,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TokenError::Expired => write!(f, "token expired"),
            TokenError::Malformed => write!(f, "invalid token"),
            TokenError::Configuration => write!(f, "signing secret not configured"),
        }
    }
}

impl From<TokenError> for crate::error::AppError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::Configuration => {
                crate::error::AppError::Configuration(error.to_string())
            }
            _ => crate::error::AppError::Unauthorized(error.to_string()),
        }
    }
}

/// The identity an access token resolves to. Inserted into request
/// extensions by the auth middleware and extracted by handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
}

/// Issues and verifies signed bearer tokens.
///
/// Constructed once at startup with the secret from [`crate::config::Config`]
/// so tests can run against a fixture secret without touching the
/// environment.
pub struct TokenService {
    secret: Option<String>,
}

impl TokenService {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }

    fn secret(&self) -> Result<&str, TokenError> {
        self.secret.as_deref().ok_or(TokenError::Configuration)
    }

    /// Produces a signed token for the given account.
    ///
    /// Access tokens expire in 15 minutes and carry `{sub, email}`; refresh
    /// tokens expire in 7 days and carry `{sub}` only.
    pub fn issue(
        &self,
        account_id: Uuid,
        email: &str,
        kind: TokenKind,
    ) -> Result<String, TokenError> {
        let secret = self.secret()?;
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => Duration::seconds(ACCESS_TOKEN_TTL_SECS),
            TokenKind::Refresh => Duration::seconds(REFRESH_TOKEN_TTL_SECS),
        };

        let claims = Claims {
            sub: account_id,
            email: match kind {
                TokenKind::Access => Some(email.to_string()),
                TokenKind::Refresh => None,
            },
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|_| TokenError::Malformed)
    }

    /// Verifies an access token and resolves the caller's identity.
    ///
    /// Beyond signature and expiry, the decoded payload must carry a UUID
    /// subject and an email-shaped `email` claim; anything else (including a
    /// refresh token presented as an access token) is `Malformed`.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, TokenError> {
        let secret = self.secret()?;
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        })?;

        let email = data.claims.email.ok_or(TokenError::Malformed)?;
        if !EMAIL_REGEX.is_match(&email) {
            return Err(TokenError::Malformed);
        }

        Ok(AuthenticatedUser {
            id: data.claims.sub,
            email,
        })
    }
}
