//! Token service for the credential session lifecycle.
//!
//! This module provides the service that handles every credential
//! lifecycle operation:
//!
//! - Issuance of an (access, refresh) pair at login
//! - Rotation of a refresh credential into a new pair
//! - Revocation, single and bulk
//! - Access credential validation for request authorization
//!
//! # Usage
//!
//! ```ignore
//! use stayforge_auth::token::{TokenConfig, TokenService};
//!
//! let config = TokenConfig::new();
//! let service = TokenService::new(
//!     jwt_service, refresh_storage, users, roles, audit, config,
//! );
//!
//! let pair = service.issue_for(user_id, &ctx).await?;
//! ```

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::AuthResult;
use crate::audit::AuditRecorder;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::storage::refresh_token::RefreshTokenStorage;
use crate::storage::role::RoleSource;
use crate::storage::user::{User, UserDirectory};
use crate::token::jwt::{AccessTokenClaims, JwtError, JwtService};
use crate::types::refresh_token::{RefreshToken, RevocationReason};
use crate::types::security_event::{RequestContext, SecurityEvent, SecurityEventType};

/// A freshly minted credential pair.
///
/// The refresh value is plaintext here and nowhere else: the store keeps
/// only its hash, so this is the single chance to hand it to the client.
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Signed access credential.
    pub access_token: String,

    /// Opaque refresh credential.
    pub refresh_token: String,

    /// When the access credential expires.
    pub access_expires_at: OffsetDateTime,

    /// When the refresh credential expires.
    pub refresh_expires_at: OffsetDateTime,
}

/// Configuration for the token service.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Access credential lifetime.
    pub access_token_lifetime: Duration,

    /// Refresh credential lifetime.
    pub refresh_token_lifetime: Duration,

    /// Revoke the descendant rotation chain when a rotated refresh token is
    /// replayed.
    pub revoke_descendants_on_reuse: bool,
}

impl TokenConfig {
    /// Creates a token configuration with the default lifetimes
    /// (60 minute access, 7 day refresh, no chain containment).
    #[must_use]
    pub fn new() -> Self {
        Self {
            access_token_lifetime: Duration::minutes(60),
            refresh_token_lifetime: Duration::days(7),
            revoke_descendants_on_reuse: false,
        }
    }

    /// Sets the access credential lifetime.
    #[must_use]
    pub fn with_access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_token_lifetime = lifetime;
        self
    }

    /// Sets the refresh credential lifetime.
    #[must_use]
    pub fn with_refresh_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.refresh_token_lifetime = lifetime;
        self
    }

    /// Sets the replay-containment policy.
    #[must_use]
    pub fn with_revoke_descendants_on_reuse(mut self, revoke: bool) -> Self {
        self.revoke_descendants_on_reuse = revoke;
        self
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&AuthConfig> for TokenConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            access_token_lifetime: Duration::seconds(
                config.tokens.access_token_lifetime.as_secs() as i64
            ),
            refresh_token_lifetime: Duration::seconds(
                config.tokens.refresh_token_lifetime.as_secs() as i64,
            ),
            revoke_descendants_on_reuse: config.tokens.revoke_descendants_on_reuse,
        }
    }
}

/// Service for issuing, rotating, revoking, and validating credentials.
///
/// Each operation is a request-scoped unit of work; the service holds no
/// mutable state of its own, so one instance is shared across tasks behind
/// an `Arc`. Rotation safety under concurrent use is delegated to the
/// storage compare-and-swap, not to in-process locking, because multiple
/// service instances may run against the same store.
pub struct TokenService {
    /// JWT service for signing and verifying access credentials.
    jwt_service: Arc<JwtService>,

    /// Refresh token storage.
    refresh_token_storage: Arc<dyn RefreshTokenStorage>,

    /// Read-only user lookup for the login path.
    user_directory: Arc<dyn UserDirectory>,

    /// Role lookup for the login path.
    role_source: Arc<dyn RoleSource>,

    /// Best-effort audit trail writer.
    audit: AuditRecorder,

    /// Service configuration.
    config: TokenConfig,
}

impl TokenService {
    /// Creates a new token service.
    #[must_use]
    pub fn new(
        jwt_service: Arc<JwtService>,
        refresh_token_storage: Arc<dyn RefreshTokenStorage>,
        user_directory: Arc<dyn UserDirectory>,
        role_source: Arc<dyn RoleSource>,
        audit: AuditRecorder,
        config: TokenConfig,
    ) -> Self {
        Self {
            jwt_service,
            refresh_token_storage,
            user_directory,
            role_source,
            audit,
            config,
        }
    }

    /// Issues a fresh credential pair for an already-resolved user.
    ///
    /// Signs an access credential with a new `jti`, generates an opaque
    /// refresh value, and persists the refresh record pairing the two. The
    /// `Login` audit event is best-effort; the record insert is not, since
    /// an unpersisted refresh token must never be handed to a client.
    ///
    /// # Errors
    ///
    /// Returns an error only when signing or persistence fails.
    pub async fn issue(
        &self,
        user: &User,
        roles: &[String],
        ctx: &RequestContext,
    ) -> AuthResult<TokenPair> {
        let pair = self
            .mint_pair(
                user.id,
                &user.email,
                &user.display_name,
                user.is_admin,
                roles,
                ctx,
            )
            .await?;

        self.audit
            .record(
                SecurityEvent::new(user.id, SecurityEventType::Login, ctx)
                    .with_token_id(pair.jti.clone()),
            )
            .await;

        tracing::info!(user_id = %user.id, jti = %pair.jti, "Issued credential pair");
        Ok(pair.tokens)
    }

    /// Resolves a user through the directory and role source, then issues
    /// a credential pair. This is the path the login controller calls.
    ///
    /// # Errors
    ///
    /// Returns `UnknownUser` if the directory has no such user, otherwise
    /// the same errors as [`issue`](Self::issue).
    pub async fn issue_for(&self, user_id: Uuid, ctx: &RequestContext) -> AuthResult<TokenPair> {
        let user = self
            .user_directory
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::unknown_user(user_id.to_string()))?;

        let roles = self.role_source.roles_for(&user).await?;
        self.issue(&user, &roles, ctx).await
    }

    /// Rotates a refresh credential into a new pair.
    ///
    /// The presented access credential is expected to be expired; its
    /// signature, algorithm, issuer, and audience are still verified, and
    /// its `jti` together with the subject must match the stored refresh
    /// record. Of two concurrent calls with the same refresh value exactly
    /// one wins; the loser observes `RefreshTokenRevoked`.
    ///
    /// # Errors
    ///
    /// - `InvalidToken` - the access credential fails verification
    /// - `UnknownRefreshToken` - no record matches the (value, user, jti)
    ///   triple
    /// - `RefreshTokenRevoked` - replay of a rotated/revoked token, or the
    ///   rotation race was lost
    /// - `RefreshTokenExpired` - the record is past its own expiry
    pub async fn refresh(
        &self,
        refresh_value: &str,
        expired_access_token: &str,
        ctx: &RequestContext,
    ) -> AuthResult<TokenPair> {
        // 1. Verify the expired access credential (lifetime check disabled).
        let claims = self
            .jwt_service
            .decode_allow_expired(expired_access_token)
            .map_err(|e| AuthError::invalid_token(e.to_string()))?;
        let user_id = claims
            .user_id()
            .map_err(|e| AuthError::invalid_token(e.to_string()))?;

        // 2. Look up the record; all three of value, user, and jti must
        //    match, so a stolen value cannot be replayed against a
        //    different session's credential.
        let token_hash = RefreshToken::hash_token(refresh_value);
        let stored = self
            .refresh_token_storage
            .find_by_hash(&token_hash)
            .await?
            .filter(|t| t.user_id == user_id && t.access_token_jti == claims.jti)
            .ok_or(AuthError::UnknownRefreshToken)?;

        // 3. A revoked record presented again is the replay signal.
        if stored.is_revoked() {
            return Err(self.handle_replay(&stored, ctx).await);
        }

        // 4. The record carries its own expiry, independent of the access
        //    credential's.
        if stored.is_expired() {
            return Err(AuthError::RefreshTokenExpired);
        }

        // 5. Rotation linearization point: the storage CAS admits exactly
        //    one winner per refresh value.
        let won = self
            .refresh_token_storage
            .revoke_for_rotation(&token_hash, ctx.ip_address.as_deref())
            .await?;
        if !won {
            tracing::warn!(
                user_id = %user_id,
                record_id = %stored.id,
                "Lost rotation race for refresh token"
            );
            return Err(AuthError::RefreshTokenRevoked);
        }

        // Mint the replacement pair reusing the claim identity and role
        // set; no directory round-trip on refresh.
        let pair = self
            .mint_pair(
                user_id,
                &claims.email,
                &claims.name,
                claims.is_admin,
                &claims.roles,
                ctx,
            )
            .await?;

        self.refresh_token_storage
            .mark_replaced(&token_hash, pair.record_id)
            .await?;

        self.audit
            .record(
                SecurityEvent::new(user_id, SecurityEventType::TokenRefresh, ctx)
                    .with_token_id(pair.jti.clone())
                    .with_detail(format!("rotated {} -> {}", stored.id, pair.record_id)),
            )
            .await;

        tracing::info!(
            user_id = %user_id,
            old_record = %stored.id,
            new_record = %pair.record_id,
            "Rotated refresh token"
        );
        Ok(pair.tokens)
    }

    /// Revokes a single refresh credential.
    ///
    /// Idempotent: revoking an already-revoked token succeeds and leaves
    /// its original revocation state untouched. Returns `false` only when
    /// the value is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn revoke_one(&self, refresh_value: &str, ctx: &RequestContext) -> AuthResult<bool> {
        let token_hash = RefreshToken::hash_token(refresh_value);

        let Some(stored) = self.refresh_token_storage.find_by_hash(&token_hash).await? else {
            return Ok(false);
        };

        self.refresh_token_storage
            .revoke(
                &token_hash,
                ctx.ip_address.as_deref(),
                RevocationReason::Explicit,
            )
            .await?;

        self.audit
            .record(
                SecurityEvent::new(stored.user_id, SecurityEventType::TokenRevocation, ctx)
                    .with_token_id(stored.id.to_string()),
            )
            .await;

        tracing::info!(user_id = %stored.user_id, record_id = %stored.id, "Revoked refresh token");
        Ok(true)
    }

    /// Revokes every active refresh credential of a user in one pass.
    ///
    /// Used for logout-everywhere and administrative lockout. Returns the
    /// number of records revoked; zero is a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn revoke_all(&self, user_id: Uuid, ctx: &RequestContext) -> AuthResult<u64> {
        let revoked = self
            .refresh_token_storage
            .revoke_by_user(user_id, ctx.ip_address.as_deref())
            .await?;

        self.audit
            .record(
                SecurityEvent::new(user_id, SecurityEventType::AllTokensRevocation, ctx)
                    .with_detail(format!("revoked {revoked} tokens")),
            )
            .await;

        tracing::info!(user_id = %user_id, revoked, "Revoked all refresh tokens for user");
        Ok(revoked)
    }

    /// Verifies an access credential for request authorization.
    ///
    /// Enforces signature, algorithm, issuer, audience, and expiry.
    ///
    /// # Errors
    ///
    /// - `TokenExpired` - the credential is past `exp`; the client should
    ///   attempt a refresh
    /// - `InvalidToken` - anything else; the client must re-authenticate
    pub fn validate(&self, access_token: &str) -> AuthResult<AccessTokenClaims> {
        self.jwt_service.decode(access_token).map_err(|e| match e {
            JwtError::Expired => AuthError::TokenExpired,
            other => AuthError::invalid_token(other.to_string()),
        })
    }

    /// Gets the JWT service reference.
    #[must_use]
    pub fn jwt_service(&self) -> &Arc<JwtService> {
        &self.jwt_service
    }

    /// Gets the service configuration.
    #[must_use]
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Signs a new access credential and persists its paired refresh
    /// record. Shared by issuance and rotation.
    async fn mint_pair(
        &self,
        user_id: Uuid,
        email: &str,
        name: &str,
        is_admin: bool,
        roles: &[String],
        ctx: &RequestContext,
    ) -> AuthResult<MintedPair> {
        let now = OffsetDateTime::now_utc();
        let access_expires_at = now + self.config.access_token_lifetime;
        let refresh_expires_at = now + self.config.refresh_token_lifetime;

        let claims = AccessTokenClaims {
            iss: self.jwt_service.issuer().to_string(),
            aud: self.jwt_service.audience().to_string(),
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            is_admin,
            roles: roles.to_vec(),
            jti: Uuid::new_v4().to_string(),
            iat: now.unix_timestamp(),
            exp: access_expires_at.unix_timestamp(),
        };

        let access_token = self
            .jwt_service
            .encode(&claims)
            .map_err(|e| AuthError::internal(format!("Failed to encode access token: {e}")))?;

        let refresh_value = RefreshToken::generate_token();
        let record = RefreshToken::new(
            RefreshToken::hash_token(&refresh_value),
            claims.jti.clone(),
            user_id,
            refresh_expires_at,
            ctx.ip_address.clone(),
        );

        // A refresh value that was never persisted must not reach the
        // client, so this error is surfaced, not swallowed.
        self.refresh_token_storage.create(&record).await?;

        Ok(MintedPair {
            tokens: TokenPair {
                access_token,
                refresh_token: refresh_value,
                access_expires_at,
                refresh_expires_at,
            },
            jti: claims.jti,
            record_id: record.id,
        })
    }

    /// Produces the replay error, optionally containing the descendant
    /// chain first.
    async fn handle_replay(&self, stored: &RefreshToken, ctx: &RequestContext) -> AuthError {
        tracing::warn!(
            user_id = %stored.user_id,
            record_id = %stored.id,
            reason = ?stored.revoked_reason,
            ip_address = ?ctx.ip_address,
            "Replay of revoked refresh token detected"
        );

        if self.config.revoke_descendants_on_reuse && stored.replaced_by.is_some() {
            match self
                .refresh_token_storage
                .revoke_chain(stored.id, ctx.ip_address.as_deref())
                .await
            {
                Ok(revoked) => {
                    tracing::warn!(
                        user_id = %stored.user_id,
                        record_id = %stored.id,
                        revoked,
                        "Revoked descendant chain of replayed refresh token"
                    );
                }
                Err(e) => {
                    // The replay is still rejected; containment is the part
                    // that failed.
                    tracing::error!(
                        error = %e,
                        record_id = %stored.id,
                        "Failed to revoke descendant chain of replayed refresh token"
                    );
                }
            }
        }

        AuthError::RefreshTokenRevoked
    }
}

/// Internal result of minting: the client-facing pair plus the identifiers
/// the lifecycle bookkeeping needs.
struct MintedPair {
    tokens: TokenPair,
    jti: String,
    record_id: Uuid,
}
