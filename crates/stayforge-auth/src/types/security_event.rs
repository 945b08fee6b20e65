//! Security event domain type.
//!
//! Security events form the append-only audit trail for credential
//! lifecycle transitions. Events are created once per transition and are
//! never mutated or deleted by this crate.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Kind of credential lifecycle transition an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventType {
    /// A credential pair was issued at login.
    Login,
    /// A refresh credential was rotated into a new pair.
    TokenRefresh,
    /// A single refresh credential was explicitly revoked.
    TokenRevocation,
    /// Every refresh credential of a user was revoked in one sweep.
    AllTokensRevocation,
}

impl SecurityEventType {
    /// Returns the event type as a string for log fields.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::TokenRefresh => "token_refresh",
            Self::TokenRevocation => "token_revocation",
            Self::AllTokensRevocation => "all_tokens_revocation",
        }
    }
}

impl std::fmt::Display for SecurityEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single entry in the security audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityEvent {
    /// Unique identifier for this event.
    pub id: Uuid,

    /// User the event concerns.
    pub user_id: Uuid,

    /// Lifecycle transition being recorded.
    pub event_type: SecurityEventType,

    /// IP address of the request that triggered the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    /// Related token identifier (access credential `jti` or refresh record
    /// id), when the event concerns a specific token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,

    /// User agent of the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Free-text detail for incident reconstruction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// When the transition occurred.
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
}

impl SecurityEvent {
    /// Creates a new event stamped with the current time.
    #[must_use]
    pub fn new(user_id: Uuid, event_type: SecurityEventType, ctx: &RequestContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            event_type,
            ip_address: ctx.ip_address.clone(),
            token_id: None,
            user_agent: ctx.user_agent.clone(),
            detail: None,
            occurred_at: OffsetDateTime::now_utc(),
        }
    }

    /// Sets the related token identifier.
    #[must_use]
    pub fn with_token_id(mut self, token_id: impl Into<String>) -> Self {
        self.token_id = Some(token_id.into());
        self
    }

    /// Sets the free-text detail.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Request metadata supplied by the request-handling layer for audit fields.
///
/// The core never inspects these values; they flow into
/// [`SecurityEvent`] and the revocation columns of the refresh record.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Client IP address, if known.
    pub ip_address: Option<String>,

    /// Client user agent, if known.
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Creates a context with both fields set.
    #[must_use]
    pub fn new(ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip_address: Some(ip_address.into()),
            user_agent: Some(user_agent.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_display() {
        assert_eq!(SecurityEventType::Login.to_string(), "login");
        assert_eq!(SecurityEventType::TokenRefresh.to_string(), "token_refresh");
        assert_eq!(
            SecurityEventType::TokenRevocation.to_string(),
            "token_revocation"
        );
        assert_eq!(
            SecurityEventType::AllTokensRevocation.to_string(),
            "all_tokens_revocation"
        );
    }

    #[test]
    fn test_event_builder() {
        let ctx = RequestContext::new("203.0.113.7", "booking-app/2.4");
        let event = SecurityEvent::new(Uuid::new_v4(), SecurityEventType::TokenRefresh, &ctx)
            .with_token_id("jti-123")
            .with_detail("rotation");

        assert_eq!(event.event_type, SecurityEventType::TokenRefresh);
        assert_eq!(event.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(event.user_agent.as_deref(), Some("booking-app/2.4"));
        assert_eq!(event.token_id.as_deref(), Some("jti-123"));
        assert_eq!(event.detail.as_deref(), Some("rotation"));
    }

    #[test]
    fn test_event_serialization() {
        let ctx = RequestContext::default();
        let event = SecurityEvent::new(Uuid::new_v4(), SecurityEventType::Login, &ctx);

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"eventType\":\"login\""));
        // Optional fields that are None should not be serialized
        assert!(!json.contains("ipAddress"));
        assert!(!json.contains("userAgent"));

        let deserialized: SecurityEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.id, event.id);
        assert_eq!(deserialized.event_type, SecurityEventType::Login);
    }
}
