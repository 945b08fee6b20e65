//! Refresh token domain type.
//!
//! This module defines the refresh token record persisted by the
//! [`RefreshTokenStorage`](crate::storage::RefreshTokenStorage) backend.
//!
//! # Security
//!
//! - Refresh tokens are stored as SHA-256 hashes, never plaintext
//! - A record transitions `active -> revoked` exactly once; revoked is
//!   terminal and records are retained for audit, not deleted
//! - Rotation links the revoked record to its replacement via `replaced_by`

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Why a refresh token record was revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationReason {
    /// Revoked as part of a successful rotation; `replaced_by` points at
    /// the record that superseded this one.
    Rotated,
    /// Revoked by an explicit logout or administrative call.
    Explicit,
    /// Revoked by a revoke-all sweep over the owning user.
    BulkRevocation,
    /// Revoked because a rotated ancestor was presented again and the
    /// containment policy invalidated its descendant chain.
    ReplayContainment,
}

impl RevocationReason {
    /// Returns the reason as a string for audit details.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rotated => "rotated",
            Self::Explicit => "explicit",
            Self::BulkRevocation => "bulk_revocation",
            Self::ReplayContainment => "replay_containment",
        }
    }
}

impl std::fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Refresh token record stored in the database.
///
/// Refresh tokens allow clients to obtain a new credential pair without
/// re-authenticating. They are long-lived and paired 1:1 with the `jti` of
/// the access credential issued alongside them, so a stolen opaque value
/// cannot be replayed against a different session's access credential.
///
/// # Storage Security
///
/// The token itself is never stored. Only a SHA-256 hash is persisted,
/// similar to password storage. When validating a refresh token:
///
/// 1. Hash the incoming value
/// 2. Look up by hash
/// 3. Check the pairing (`user_id`, `access_token_jti`), revocation state,
///    and expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshToken {
    /// Unique identifier for this refresh token record.
    pub id: Uuid,

    /// SHA-256 hash of the actual token value.
    /// The plaintext token is returned to the client but never stored.
    pub token_hash: String,

    /// `jti` of the access credential this token was issued alongside.
    pub access_token_jti: String,

    /// User that owns this token.
    pub user_id: Uuid,

    /// When this token was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When this token expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// When this token was revoked (None = active).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub revoked_at: Option<OffsetDateTime>,

    /// IP address that triggered the revocation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_by_ip: Option<String>,

    /// Why the token was revoked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_reason: Option<RevocationReason>,

    /// The record that superseded this one. Set if and only if the token
    /// was revoked by rotation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<Uuid>,

    /// IP address the token was issued to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_ip: Option<String>,
}

impl RefreshToken {
    /// Creates a new active record pairing an opaque value hash with the
    /// access credential identified by `jti`.
    #[must_use]
    pub fn new(
        token_hash: String,
        access_token_jti: String,
        user_id: Uuid,
        expires_at: OffsetDateTime,
        created_by_ip: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            token_hash,
            access_token_jti,
            user_id,
            created_at: OffsetDateTime::now_utc(),
            expires_at,
            revoked_at: None,
            revoked_by_ip: None,
            revoked_reason: None,
            replaced_by: None,
            created_by_ip,
        }
    }

    /// Returns `true` if this token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    /// Returns `true` if this token has been revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Returns `true` if this token is active (not expired and not revoked).
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.is_expired() && !self.is_revoked()
    }

    /// Hash a token value using SHA-256.
    ///
    /// This is used both when storing new tokens and when looking up
    /// tokens for validation.
    #[must_use]
    pub fn hash_token(token: &str) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Generate a cryptographically secure random token.
    ///
    /// Returns a 256-bit random value encoded as base64url (43 characters).
    /// The value is opaque: clients must not parse it.
    #[must_use]
    pub fn generate_token() -> String {
        use base64::Engine;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;

        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}
