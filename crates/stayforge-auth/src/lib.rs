//! # stayforge-auth
//!
//! Credential session management for the StayForge booking platform.
//!
//! This crate provides:
//! - Issuance of short-lived signed access credentials paired with
//!   long-lived, rotating refresh credentials
//! - Safe rotation under concurrent use (exactly one winner per refresh
//!   value) with replay detection
//! - Single and bulk revocation
//! - Access credential validation for request authorization
//! - An append-only security audit trail for incident reconstruction
//!
//! ## Overview
//!
//! The session system pairs every signed access credential (a compact
//! HMAC-SHA-256 JWT) 1:1 with an opaque refresh record through the
//! credential's `jti`. Refreshing rotates the pair: the old record is
//! revoked and linked to its replacement, so a replayed value is
//! detectable as a theft signal.
//!
//! ## Modules
//!
//! - [`config`] - Session configuration (signing key, lifetimes, policy)
//! - [`token`] - Credential signing, lifecycle service, validation
//! - [`storage`] - Storage and collaborator traits
//! - [`audit`] - Best-effort security event recording
//! - [`types`] - Domain types (refresh records, security events)

pub mod audit;
pub mod config;
pub mod error;
pub mod storage;
pub mod token;
pub mod types;

pub use audit::AuditRecorder;
pub use config::{AuditConfig, AuthConfig, ConfigError, SigningConfig, TokenLifetimeConfig};
pub use error::{AuthError, ErrorCategory};
pub use storage::{
    RefreshTokenStorage, RoleSource, SecurityEventStorage, User, UserDirectory,
};
pub use token::{AccessTokenClaims, JwtError, JwtService, TokenConfig, TokenPair, TokenService};
pub use types::{
    RefreshToken, RequestContext, RevocationReason, SecurityEvent, SecurityEventType,
};

/// Type alias for credential lifecycle results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use stayforge_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::audit::AuditRecorder;
    pub use crate::config::{AuditConfig, AuthConfig, ConfigError};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::storage::{
        RefreshTokenStorage, RoleSource, SecurityEventStorage, User, UserDirectory,
    };
    pub use crate::token::{
        AccessTokenClaims, JwtError, JwtService, TokenConfig, TokenPair, TokenService,
    };
    pub use crate::types::{
        RefreshToken, RequestContext, RevocationReason, SecurityEvent, SecurityEventType,
    };
}
