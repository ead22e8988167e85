/// Token Service for the blog API
///
/// Issues and verifies signed, self-contained identity tokens carrying a user id
/// and email. Tokens are HS256-signed with a process-wide secret that is injected
/// once at startup and never mutated afterwards.
///
/// ## Usage
///
/// ```rust
/// use crypto_core::jwt::TokenService;
///
/// let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "x".repeat(32));
/// let tokens = TokenService::new(&secret, 3600).unwrap();
///
/// let token = tokens.issue("user-1", "user@example.com").unwrap();
/// let claims = tokens.verify(&token).unwrap();
/// assert_eq!(claims.user_id(), "user-1");
/// ```
///
/// Verification is stateless: there is no revocation list, and a token is only
/// valid while its signature checks out AND the current time is strictly before
/// the embedded expiry.
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Default token lifetime: one hour
pub const DEFAULT_EXPIRY_SECONDS: i64 = 3600;

/// Minimum secret length accepted for HMAC signing
pub const MIN_SECRET_LENGTH: usize = 32;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

// ============================================================================
// Data Structures
// ============================================================================

/// Claims embedded in every token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Identity of the token subject
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Email address at issuance time
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("JWT secret too short: need at least {MIN_SECRET_LENGTH} bytes")]
    WeakSecret,

    #[error("Token expiry must be positive")]
    InvalidExpiry,

    #[error("Token signature does not match")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

// ============================================================================
// Token Service
// ============================================================================

/// Signs and verifies identity tokens with a fixed secret
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("expiry_seconds", &self.expiry.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Build a token service from a secret loaded at startup
    ///
    /// ## Errors
    ///
    /// - `WeakSecret` if the secret is shorter than 32 bytes
    /// - `InvalidExpiry` if `expiry_seconds` is not positive
    pub fn new(secret: &str, expiry_seconds: i64) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(TokenError::WeakSecret);
        }
        if expiry_seconds <= 0 {
            return Err(TokenError::InvalidExpiry);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry: Duration::seconds(expiry_seconds),
        })
    }

    pub fn expiry_seconds(&self) -> i64 {
        self.expiry.num_seconds()
    }

    /// Issue a token for `user_id` that expires one lifetime from now
    pub fn issue(&self, user_id: &str, email: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, email, Utc::now())
    }

    /// Issue a token with an explicit issuance instant
    pub fn issue_at(
        &self,
        user_id: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.expiry).timestamp(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token against the current clock
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token against an explicit clock
    ///
    /// Expiry is strict: a token is rejected once `now >= exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        // Expiry is decided only by the comparison below, against the supplied
        // clock and without leeway.
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

// ============================================================================
// Tests
// ============================================================================
