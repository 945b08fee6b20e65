//! Security event storage trait.
//!
//! Events are append-only; nothing in this crate updates or deletes them.

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::types::security_event::SecurityEvent;

/// Append-only store for the security audit trail.
///
/// Writes go through the [`AuditRecorder`](crate::audit::AuditRecorder),
/// which catches every error here: a failing audit store must never fail an
/// authentication operation.
#[async_trait]
pub trait SecurityEventStorage: Send + Sync {
    /// Appends an event to the trail.
    ///
    /// # Errors
    ///
    /// Returns an error if the append fails.
    async fn append(&self, event: &SecurityEvent) -> AuthResult<()>;

    /// Lists events for a user, oldest first.
    ///
    /// Used when reconstructing a security incident.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    async fn list_by_user(&self, user_id: Uuid) -> AuthResult<Vec<SecurityEvent>>;
}
