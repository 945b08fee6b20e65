//! Signed access credential generation and validation.
//!
//! This module provides JWT support for the StayForge session system.
//! Access credentials are compact three-segment tokens (header, claims,
//! signature) signed with a symmetric key using HMAC-SHA-256. The algorithm
//! identifier embedded in the header is re-checked on verification so a
//! token signed under a different algorithm is rejected outright.
//!
//! ## Example
//!
//! ```ignore
//! use stayforge_auth::token::jwt::{AccessTokenClaims, JwtService};
//!
//! let service = JwtService::new(secret.as_bytes(), issuer, audience);
//!
//! let token = service.encode(&claims)?;
//! let claims = service.decode(&token)?;
//! ```

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during JWT operations.
///
/// Each verification failure mode is a distinct kind so callers can log and
/// alert on them separately.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token header carries an algorithm other than the configured one.
    #[error("Algorithm mismatch")]
    AlgorithmMismatch,

    /// The token is not a parseable three-segment JWT.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of why the token could not be parsed.
        message: String,
    },

    /// The token claims are invalid (wrong issuer/audience, missing claim).
    #[error("Invalid claims: {message}")]
    InvalidClaims {
        /// Description of why the claims are invalid.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `EncodingError`.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClaims` error.
    #[must_use]
    pub fn invalid_claims(message: impl Into<String>) -> Self {
        Self::InvalidClaims {
            message: message.into(),
        }
    }

    /// Returns `true` if this failure means the token can never verify
    /// (as opposed to having merely expired).
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignature
                | Self::AlgorithmMismatch
                | Self::Malformed { .. }
                | Self::InvalidClaims { .. }
        )
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => Self::AlgorithmMismatch,
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidSubject
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_) => Self::invalid_claims(err.to_string()),
            _ => Self::malformed(err.to_string()),
        }
    }
}

// ============================================================================
// Token Claims
// ============================================================================

/// Claim set carried by a StayForge access credential.
///
/// The credential is reconstructed from the wire form on every request and
/// never persisted; the signature proves authenticity and `exp` proves
/// freshness.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenClaims {
    /// Issuer (auth service URL).
    pub iss: String,

    /// Audience (API surface this credential is valid for).
    pub aud: String,

    /// Subject (user id).
    pub sub: String,

    /// Email address of the subject.
    pub email: String,

    /// Display name of the subject.
    pub name: String,

    /// Whether the subject holds the administrator flag.
    pub is_admin: bool,

    /// Role names granted to the subject; opaque strings to this crate.
    pub roles: Vec<String>,

    /// Unique token identifier, pairing this credential with its refresh
    /// record.
    pub jti: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl AccessTokenClaims {
    /// Parses the subject back into a user id.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::InvalidClaims` if `sub` is not a UUID.
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| JwtError::invalid_claims(format!("sub is not a user id: {}", self.sub)))
    }

    /// Returns the expiry as a timestamp type.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::InvalidClaims` if `exp` is out of range.
    pub fn expires_at(&self) -> Result<OffsetDateTime, JwtError> {
        OffsetDateTime::from_unix_timestamp(self.exp)
            .map_err(|_| JwtError::invalid_claims(format!("exp out of range: {}", self.exp)))
    }
}

// ============================================================================
// JWT Service
// ============================================================================

/// Service for signing and verifying access credentials.
///
/// Holds the symmetric key for the process lifetime. Thread-safe
/// (`Send + Sync`) and shared across tasks behind an `Arc`.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
}

/// The one MAC algorithm this service signs and accepts.
const ALGORITHM: Algorithm = Algorithm::HS256;

impl JwtService {
    /// Creates a new JWT service around a symmetric signing key.
    ///
    /// # Arguments
    /// * `secret` - HMAC key material (validated for length by `AuthConfig`)
    /// * `issuer` - The `iss` claim value
    /// * `audience` - The `aud` claim value
    #[must_use]
    pub fn new(secret: &[u8], issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// Encodes claims into a signed JWT string.
    ///
    /// # Errors
    /// Returns an error if encoding fails.
    pub fn encode(&self, claims: &AccessTokenClaims) -> Result<String, JwtError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| JwtError::encoding_error(e.to_string()))
    }

    /// Decodes and fully validates a JWT string.
    ///
    /// Enforces signature, algorithm, issuer, audience, and expiry. Used by
    /// the validator that authorizes ordinary requests.
    ///
    /// # Errors
    /// Returns an error if decoding or validation fails.
    pub fn decode(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        self.decode_with_lifetime(token, true)
    }

    /// Decodes a JWT without enforcing expiry.
    ///
    /// The refresh path expects the presented access credential to be past
    /// its `exp`; signature, algorithm, issuer, and audience are still
    /// enforced.
    ///
    /// # Errors
    /// Returns an error if decoding fails.
    pub fn decode_allow_expired(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        self.decode_with_lifetime(token, false)
    }

    fn decode_with_lifetime(
        &self,
        token: &str,
        validate_exp: bool,
    ) -> Result<AccessTokenClaims, JwtError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = validate_exp;
        // Expiry is a hard boundary for session credentials.
        validation.leeway = 0;

        decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(JwtError::from)
    }

    /// Returns the issuer value.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the audience value.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"an-hmac-test-secret-of-32-bytes!";
    const ISSUER: &str = "https://auth.stayforge.example";
    const AUDIENCE: &str = "stayforge-api";

    fn test_service() -> JwtService {
        JwtService::new(SECRET, ISSUER, AUDIENCE)
    }

    fn test_claims(expires_in_seconds: i64) -> AccessTokenClaims {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        AccessTokenClaims {
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
            sub: Uuid::new_v4().to_string(),
            email: "guest@example.com".to_string(),
            name: "Test Guest".to_string(),
            is_admin: false,
            roles: vec!["guest".to_string()],
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + expires_in_seconds,
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let service = test_service();
        let claims = test_claims(3600);

        let token = service.encode(&claims).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let decoded = service.decode(&token).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_roundtrip_preserves_roles_and_admin_flag() {
        let service = test_service();
        let mut claims = test_claims(3600);
        claims.is_admin = true;
        claims.roles = vec!["host".to_string(), "moderator".to_string()];

        let decoded = service.decode(&service.encode(&claims).unwrap()).unwrap();
        assert!(decoded.is_admin);
        assert_eq!(decoded.roles, vec!["host", "moderator"]);
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = test_service();
        let claims = test_claims(-3600); // expired an hour ago

        let token = service.encode(&claims).unwrap();
        let result = service.decode(&token);

        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_decode_allow_expired() {
        let service = test_service();
        let claims = test_claims(-3600);

        let token = service.encode(&claims).unwrap();

        // Regular decode fails, lifetime-disabled decode succeeds.
        assert!(service.decode(&token).is_err());
        let decoded = service.decode_allow_expired(&token).unwrap();
        assert_eq!(decoded.jti, claims.jti);
    }

    #[test]
    fn test_invalid_signature_rejected() {
        let service1 = test_service();
        let service2 = JwtService::new(b"a-different-secret-of-32-bytes!!", ISSUER, AUDIENCE);

        let token = service1.encode(&test_claims(3600)).unwrap();
        let result = service2.decode(&token);

        assert!(matches!(result, Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_invalid_signature_rejected_even_when_expired_allowed() {
        let service1 = test_service();
        let service2 = JwtService::new(b"a-different-secret-of-32-bytes!!", ISSUER, AUDIENCE);

        let token = service1.encode(&test_claims(-3600)).unwrap();
        let result = service2.decode_allow_expired(&token);

        assert!(matches!(result, Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_algorithm_confusion_rejected() {
        let service = test_service();
        let claims = test_claims(3600);

        // Sign with the same key under a different HMAC variant; the header
        // algorithm must be re-checked on verify.
        let forged = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let result = service.decode(&forged);
        assert!(matches!(result, Err(JwtError::AlgorithmMismatch)));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let service = test_service();

        let result = service.decode("not-a-token");
        assert!(matches!(result, Err(JwtError::Malformed { .. })));

        let result = service.decode("");
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let service = test_service();
        let other = JwtService::new(SECRET, "https://evil.example", AUDIENCE);

        let token = other.encode(&{
            let mut c = test_claims(3600);
            c.iss = "https://evil.example".to_string();
            c
        });
        let result = service.decode(&token.unwrap());

        assert!(matches!(result, Err(JwtError::InvalidClaims { .. })));
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let service = test_service();
        let mut claims = test_claims(3600);
        claims.aud = "some-other-api".to_string();

        let token = service.encode(&claims).unwrap();
        let result = service.decode(&token);

        assert!(matches!(result, Err(JwtError::InvalidClaims { .. })));
    }

    #[test]
    fn test_claims_user_id_parsing() {
        let claims = test_claims(3600);
        assert!(claims.user_id().is_ok());

        let mut bad = test_claims(3600);
        bad.sub = "not-a-uuid".to_string();
        assert!(matches!(bad.user_id(), Err(JwtError::InvalidClaims { .. })));
    }

    #[test]
    fn test_error_predicates() {
        assert!(JwtError::InvalidSignature.is_rejection());
        assert!(JwtError::AlgorithmMismatch.is_rejection());
        assert!(JwtError::malformed("x").is_rejection());
        assert!(!JwtError::Expired.is_rejection());
    }
}
