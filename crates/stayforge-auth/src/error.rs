//! Credential lifecycle error types.
//!
//! This module defines all error types that can occur while issuing,
//! refreshing, revoking, or validating credentials.

use std::fmt;

/// Errors that can occur during credential lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The access credential is malformed, carries the wrong algorithm,
    /// or its signature does not verify.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Description of why the token is invalid.
        message: String,
    },

    /// The access credential has expired.
    #[error("Token expired")]
    TokenExpired,

    /// No refresh token record matches the presented value for this session.
    #[error("Unknown refresh token")]
    UnknownRefreshToken,

    /// The refresh token has already been rotated or explicitly revoked.
    ///
    /// A second use of a rotated token is the replay-detection signal; a
    /// rotation that loses the race against a concurrent refresh of the same
    /// value surfaces here as well.
    #[error("Refresh token revoked")]
    RefreshTokenRevoked,

    /// The refresh token record is past its own expiry.
    #[error("Refresh token expired")]
    RefreshTokenExpired,

    /// The referenced user does not exist in the user directory.
    #[error("Unknown user: {user_id}")]
    UnknownUser {
        /// The user id that was not found.
        user_id: String,
    },

    /// An error occurred while storing or retrieving credential data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidToken` error.
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Creates a new `UnknownUser` error.
    #[must_use]
    pub fn unknown_user(user_id: impl Into<String>) -> Self {
        Self::UnknownUser {
            user_id: user_id.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken { .. }
                | Self::TokenExpired
                | Self::UnknownRefreshToken
                | Self::RefreshTokenRevoked
                | Self::RefreshTokenExpired
                | Self::UnknownUser { .. }
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. }
        )
    }

    /// Returns `true` if the client holding the failing credential must go
    /// through login again.
    ///
    /// Every credential-shaped failure requires re-authentication; the
    /// distinction between kinds exists for internal logging and alerting,
    /// not for differentiated client messaging.
    #[must_use]
    pub fn requires_reauthentication(&self) -> bool {
        self.is_client_error() && !matches!(self, Self::TokenExpired)
    }

    /// Returns `true` if this failure indicates possible credential theft
    /// and should be alerted on, not just logged.
    #[must_use]
    pub fn is_security_event(&self) -> bool {
        matches!(self, Self::RefreshTokenRevoked)
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidToken { .. } | Self::TokenExpired => ErrorCategory::AccessCredential,
            Self::UnknownRefreshToken
            | Self::RefreshTokenRevoked
            | Self::RefreshTokenExpired => ErrorCategory::RefreshCredential,
            Self::UnknownUser { .. } => ErrorCategory::Identity,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of credential errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Access-credential verification errors.
    AccessCredential,
    /// Refresh-credential lookup and state errors.
    RefreshCredential,
    /// User directory lookup errors.
    Identity,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Configuration errors.
    Configuration,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessCredential => write!(f, "access_credential"),
            Self::RefreshCredential => write!(f, "refresh_credential"),
            Self::Identity => write!(f, "identity"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::invalid_token("signature mismatch");
        assert_eq!(err.to_string(), "Invalid token: signature mismatch");

        let err = AuthError::TokenExpired;
        assert_eq!(err.to_string(), "Token expired");

        let err = AuthError::RefreshTokenRevoked;
        assert_eq!(err.to_string(), "Refresh token revoked");

        let err = AuthError::unknown_user("42");
        assert_eq!(err.to_string(), "Unknown user: 42");
    }

    #[test]
    fn test_error_predicates() {
        let err = AuthError::invalid_token("test");
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
        assert!(err.requires_reauthentication());

        // An expired access credential should be refreshed, not re-logged-in.
        let err = AuthError::TokenExpired;
        assert!(err.is_client_error());
        assert!(!err.requires_reauthentication());

        let err = AuthError::RefreshTokenRevoked;
        assert!(err.requires_reauthentication());
        assert!(err.is_security_event());

        let err = AuthError::storage("database down");
        assert!(!err.is_client_error());
        assert!(err.is_server_error());
        assert!(!err.is_security_event());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            AuthError::invalid_token("test").category(),
            ErrorCategory::AccessCredential
        );
        assert_eq!(
            AuthError::TokenExpired.category(),
            ErrorCategory::AccessCredential
        );
        assert_eq!(
            AuthError::UnknownRefreshToken.category(),
            ErrorCategory::RefreshCredential
        );
        assert_eq!(
            AuthError::RefreshTokenExpired.category(),
            ErrorCategory::RefreshCredential
        );
        assert_eq!(
            AuthError::storage("test").category(),
            ErrorCategory::Infrastructure
        );
        assert_eq!(
            AuthError::configuration("test").category(),
            ErrorCategory::Configuration
        );
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(
            ErrorCategory::AccessCredential.to_string(),
            "access_credential"
        );
        assert_eq!(
            ErrorCategory::RefreshCredential.to_string(),
            "refresh_credential"
        );
        assert_eq!(ErrorCategory::Infrastructure.to_string(), "infrastructure");
    }
}
