//! In-memory security event storage.
//!
//! Append-only: the vector is only ever pushed to.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use stayforge_auth::AuthResult;
use stayforge_auth::storage::SecurityEventStorage;
use stayforge_auth::types::SecurityEvent;

/// In-memory append-only event log.
#[derive(Debug, Default)]
pub struct InMemorySecurityEventStorage {
    events: RwLock<Vec<SecurityEvent>>,
}

impl InMemorySecurityEventStorage {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded event, oldest first.
    pub async fn all(&self) -> Vec<SecurityEvent> {
        self.events.read().await.clone()
    }

    /// Returns the number of recorded events.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Returns `true` if no events have been recorded.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl SecurityEventStorage for InMemorySecurityEventStorage {
    async fn append(&self, event: &SecurityEvent) -> AuthResult<()> {
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn list_by_user(&self, user_id: Uuid) -> AuthResult<Vec<SecurityEvent>> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }
}
