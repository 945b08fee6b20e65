//! Security event audit recording.
//!
//! Every credential lifecycle transition (login, refresh, revocation,
//! bulk revocation) is recorded here. Recording is best-effort: the audit
//! trail must never cause an authentication operation to fail, so every
//! storage error is caught and logged instead of propagated.

use std::sync::Arc;

use crate::config::AuditConfig;
use crate::storage::security_event::SecurityEventStorage;
use crate::types::security_event::SecurityEvent;

/// Best-effort writer for the security audit trail.
///
/// Wraps a [`SecurityEventStorage`] and swallows its failures. Callers fire
/// events and move on; a broken audit store degrades to tracing output.
pub struct AuditRecorder {
    storage: Arc<dyn SecurityEventStorage>,
    enabled: bool,
}

impl AuditRecorder {
    /// Creates a new recorder.
    #[must_use]
    pub fn new(storage: Arc<dyn SecurityEventStorage>, config: &AuditConfig) -> Self {
        Self {
            storage,
            enabled: config.enabled,
        }
    }

    /// Records a security event.
    ///
    /// Never returns an error: append failures are logged at `warn` with
    /// enough fields to reconstruct the lost event from the log stream.
    pub async fn record(&self, event: SecurityEvent) {
        if !self.enabled {
            return;
        }

        if let Err(e) = self.storage.append(&event).await {
            tracing::warn!(
                error = %e,
                event_type = %event.event_type,
                user_id = %event.user_id,
                token_id = ?event.token_id,
                ip_address = ?event.ip_address,
                "Failed to record security event"
            );
        } else {
            tracing::debug!(
                event_type = %event.event_type,
                user_id = %event.user_id,
                token_id = ?event.token_id,
                "Recorded security event"
            );
        }
    }
}
