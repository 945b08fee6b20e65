//! Refresh token storage trait.
//!
//! This module defines the storage interface for refresh credentials.
//!
//! # Security Considerations
//!
//! - Tokens are stored as SHA-256 hashes only
//! - Rotation must be a compare-and-swap: two concurrent rotations of the
//!   same value must produce exactly one winner
//! - Revoked records are retained for audit; cleanup removes only records
//!   past their own expiry

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::types::refresh_token::{RefreshToken, RevocationReason};

/// Storage trait for refresh tokens.
///
/// The refresh token table is the only shared mutable resource in the
/// session core; every linearizability guarantee of the rotation flow is
/// enforced here rather than by application-level locking, because multiple
/// service instances may run against the same store.
///
/// # Implementations
///
/// - `stayforge-auth-memory` - in-memory backend (tests, single-process use)
#[async_trait]
pub trait RefreshTokenStorage: Send + Sync {
    /// Stores a new refresh token record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be stored (duplicate hash,
    /// storage unavailable). Issuance treats this as a hard failure: an
    /// unpersisted refresh token must never reach a client.
    async fn create(&self, token: &RefreshToken) -> AuthResult<()>;

    /// Finds a refresh token record by the hash of its opaque value.
    ///
    /// Returns records regardless of expiration/revocation status; callers
    /// check the record state themselves to produce distinct error kinds.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>>;

    /// Finds a refresh token record by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<RefreshToken>>;

    /// Atomically transitions an active record to revoked-by-rotation.
    ///
    /// This is the linearization point of the refresh flow: of two
    /// concurrent calls for the same hash, exactly one observes `true`.
    /// Returns `false` when the record was already revoked (the caller lost
    /// the race or is replaying) or does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn revoke_for_rotation(
        &self,
        token_hash: &str,
        revoked_by_ip: Option<&str>,
    ) -> AuthResult<bool>;

    /// Revokes a record with the given reason.
    ///
    /// Idempotent: revoking an already-revoked record succeeds without
    /// changing its original revocation state. Returns `false` only when no
    /// record matches the hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn revoke(
        &self,
        token_hash: &str,
        revoked_by_ip: Option<&str>,
        reason: RevocationReason,
    ) -> AuthResult<bool>;

    /// Revokes every currently-active record owned by a user in one pass.
    ///
    /// Returns the number of records revoked; zero is a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    async fn revoke_by_user(&self, user_id: Uuid, revoked_by_ip: Option<&str>) -> AuthResult<u64>;

    /// Links a revoked-by-rotation record to the record that superseded it.
    ///
    /// # Errors
    ///
    /// Returns an error if no record matches the hash or the operation
    /// fails.
    async fn mark_replaced(&self, token_hash: &str, replaced_by: Uuid) -> AuthResult<()>;

    /// Revokes the active descendants of a record by following its
    /// `replaced_by` links forward.
    ///
    /// Used by the replay-containment policy: when a rotated token is
    /// presented again, the chain minted from it is invalidated. The
    /// traversal is a storage query loop, not an in-memory graph walk.
    /// Returns the number of records revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    async fn revoke_chain(&self, from_id: Uuid, revoked_by_ip: Option<&str>) -> AuthResult<u64>;

    /// Lists all active (non-revoked, non-expired) records for a user.
    ///
    /// Useful for session management surfaces ("your logged-in devices").
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    async fn list_by_user(&self, user_id: Uuid) -> AuthResult<Vec<RefreshToken>>;

    /// Deletes records past their own expiry.
    ///
    /// Revoked-but-unexpired records are kept: the revocation columns and
    /// `replaced_by` links are the audit trail. Returns the number of
    /// records deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
