//! Credential session configuration.
//!
//! This module provides the configuration types for the auth module:
//! token signing, credential lifetimes, rotation policy, and audit
//! recording. The configuration is loaded once at process start and
//! treated as immutable for the process lifetime.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root credential session configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// issuer = "https://auth.stayforge.example"
/// audience = "stayforge-api"
///
/// [auth.signing]
/// secret = "…at least 32 bytes of key material…"
///
/// [auth.tokens]
/// access_token_lifetime = "1h"
/// refresh_token_lifetime = "7d"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Token issuer (used in the access credential `iss` claim).
    /// This should be the public base URL of the auth service.
    pub issuer: String,

    /// Token audience (used in the access credential `aud` claim).
    pub audience: String,

    /// Token signing configuration.
    pub signing: SigningConfig,

    /// Credential lifetime and rotation configuration.
    pub tokens: TokenLifetimeConfig,

    /// Audit recording configuration.
    pub audit: AuditConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "https://auth.stayforge.example".to_string(),
            audience: "stayforge-api".to_string(),
            signing: SigningConfig::default(),
            tokens: TokenLifetimeConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

/// Token signing configuration.
///
/// Access credentials are signed with a symmetric key using HMAC-SHA-256.
/// The key is held in memory for the process lifetime; rotating it
/// invalidates every outstanding access credential at once.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Symmetric signing key material.
    ///
    /// Must be at least [`MIN_SECRET_LENGTH`] bytes. Empty in the default
    /// configuration so that a missing deployment secret fails validation
    /// instead of signing with a well-known value.
    pub secret: String,
}

/// Minimum signing secret length in bytes (256 bits of key material).
pub const MIN_SECRET_LENGTH: usize = 32;

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
        }
    }
}

/// Credential lifetime and rotation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenLifetimeConfig {
    /// Access credential lifetime.
    /// Shorter lifetimes are more secure but require more frequent refresh.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh credential lifetime.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Revoke the whole descendant rotation chain when a rotated refresh
    /// token is presented again.
    ///
    /// Replay of a rotated token always fails; with this enabled the
    /// replacement tokens minted from it are invalidated as well, which
    /// contains a stolen credential at the cost of logging out the
    /// legitimate holder of the chain tip.
    pub revoke_descendants_on_reuse: bool,
}

impl Default for TokenLifetimeConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::from_secs(3600), // 60 minutes
            refresh_token_lifetime: Duration::from_secs(7 * 24 * 3600), // 7 days
            revoke_descendants_on_reuse: false,
        }
    }
}

/// Audit recording configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Record security events for credential lifecycle transitions.
    pub enabled: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The issuer or audience is empty
    /// - The signing secret is missing or shorter than [`MIN_SECRET_LENGTH`]
    /// - A credential lifetime is zero, or the refresh lifetime does not
    ///   exceed the access lifetime
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.is_empty() {
            return Err(ConfigError::InvalidValue(
                "issuer cannot be empty".to_string(),
            ));
        }

        if self.audience.is_empty() {
            return Err(ConfigError::InvalidValue(
                "audience cannot be empty".to_string(),
            ));
        }

        if self.signing.secret.is_empty() {
            return Err(ConfigError::Missing("signing.secret".to_string()));
        }

        if self.signing.secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::InvalidValue(format!(
                "signing.secret must be at least {} bytes, got {}",
                MIN_SECRET_LENGTH,
                self.signing.secret.len()
            )));
        }

        if self.tokens.access_token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "access_token_lifetime must be > 0".to_string(),
            ));
        }

        if self.tokens.refresh_token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "refresh_token_lifetime must be > 0".to_string(),
            ));
        }

        if self.tokens.refresh_token_lifetime <= self.tokens.access_token_lifetime {
            return Err(ConfigError::InvalidValue(
                "refresh_token_lifetime must exceed access_token_lifetime".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_secret() -> AuthConfig {
        let mut config = AuthConfig::default();
        config.signing.secret = "0123456789abcdef0123456789abcdef".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.issuer, "https://auth.stayforge.example");
        assert_eq!(config.audience, "stayforge-api");
        assert_eq!(
            config.tokens.access_token_lifetime,
            Duration::from_secs(3600)
        );
        assert_eq!(
            config.tokens.refresh_token_lifetime,
            Duration::from_secs(7 * 24 * 3600)
        );
        assert!(!config.tokens.revoke_descendants_on_reuse);
        assert!(config.audit.enabled);
    }

    #[test]
    fn test_default_config_missing_secret_fails_validation() {
        let err = AuthConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
        assert!(err.to_string().contains("signing.secret"));
    }

    #[test]
    fn test_config_with_secret_validates() {
        assert!(config_with_secret().validate().is_ok());
    }

    #[test]
    fn test_short_secret_fails_validation() {
        let mut config = AuthConfig::default();
        config.signing.secret = "too-short".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
        assert!(err.to_string().contains("signing.secret"));
    }

    #[test]
    fn test_empty_issuer_fails_validation() {
        let mut config = config_with_secret();
        config.issuer = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("issuer"));
    }

    #[test]
    fn test_empty_audience_fails_validation() {
        let mut config = config_with_secret();
        config.audience = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("audience"));
    }

    #[test]
    fn test_refresh_lifetime_must_exceed_access_lifetime() {
        let mut config = config_with_secret();
        config.tokens.refresh_token_lifetime = config.tokens.access_token_lifetime;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("refresh_token_lifetime"));
    }

    #[test]
    fn test_serde_roundtrip_with_humantime_durations() {
        let config = config_with_secret();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AuthConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed.tokens.access_token_lifetime,
            config.tokens.access_token_lifetime
        );
        assert_eq!(parsed.issuer, config.issuer);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: AuthConfig =
            serde_json::from_str(r#"{"issuer": "https://auth.test.local"}"#).unwrap();
        assert_eq!(parsed.issuer, "https://auth.test.local");
        assert_eq!(parsed.audience, "stayforge-api");
        assert_eq!(
            parsed.tokens.refresh_token_lifetime,
            Duration::from_secs(7 * 24 * 3600)
        );
    }
}
