//! In-memory refresh token storage.
//!
//! All state transitions happen under one write lock, which is what makes
//! `revoke_for_rotation` a compare-and-swap: the check of the current
//! revocation state and the transition to revoked are a single critical
//! section, so two concurrent rotations of the same value cannot both win.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use stayforge_auth::AuthResult;
use stayforge_auth::error::AuthError;
use stayforge_auth::storage::RefreshTokenStorage;
use stayforge_auth::types::{RefreshToken, RevocationReason};

/// In-memory refresh token store keyed by token hash.
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStorage {
    tokens: RwLock<HashMap<String, RefreshToken>>,
}

impl InMemoryRefreshTokenStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records, active or not.
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Returns `true` if the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }

    fn revoke_record(
        token: &mut RefreshToken,
        revoked_by_ip: Option<&str>,
        reason: RevocationReason,
    ) {
        token.revoked_at = Some(OffsetDateTime::now_utc());
        token.revoked_by_ip = revoked_by_ip.map(String::from);
        token.revoked_reason = Some(reason);
    }
}

#[async_trait]
impl RefreshTokenStorage for InMemoryRefreshTokenStorage {
    async fn create(&self, token: &RefreshToken) -> AuthResult<()> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.token_hash) {
            return Err(AuthError::storage(format!(
                "refresh token record '{}' already exists",
                token.id
            )));
        }
        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
        Ok(self.tokens.read().await.get(token_hash).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<RefreshToken>> {
        Ok(self
            .tokens
            .read()
            .await
            .values()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn revoke_for_rotation(
        &self,
        token_hash: &str,
        revoked_by_ip: Option<&str>,
    ) -> AuthResult<bool> {
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(token_hash) {
            Some(token) if !token.is_revoked() => {
                Self::revoke_record(token, revoked_by_ip, RevocationReason::Rotated);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke(
        &self,
        token_hash: &str,
        revoked_by_ip: Option<&str>,
        reason: RevocationReason,
    ) -> AuthResult<bool> {
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(token_hash) {
            Some(token) => {
                // Revoked is terminal: a second revocation succeeds without
                // touching the original state.
                if !token.is_revoked() {
                    Self::revoke_record(token, revoked_by_ip, reason);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revoke_by_user(&self, user_id: Uuid, revoked_by_ip: Option<&str>) -> AuthResult<u64> {
        let mut tokens = self.tokens.write().await;
        let mut count = 0u64;
        for token in tokens.values_mut() {
            if token.user_id == user_id && token.is_active() {
                Self::revoke_record(token, revoked_by_ip, RevocationReason::BulkRevocation);
                count += 1;
            }
        }
        Ok(count)
    }

    async fn mark_replaced(&self, token_hash: &str, replaced_by: Uuid) -> AuthResult<()> {
        let mut tokens = self.tokens.write().await;
        let token = tokens.get_mut(token_hash).ok_or_else(|| {
            AuthError::storage(format!("no refresh token record for hash '{token_hash}'"))
        })?;
        token.replaced_by = Some(replaced_by);
        Ok(())
    }

    async fn revoke_chain(&self, from_id: Uuid, revoked_by_ip: Option<&str>) -> AuthResult<u64> {
        let mut tokens = self.tokens.write().await;
        let mut count = 0u64;
        let mut cursor = tokens
            .values()
            .find(|t| t.id == from_id)
            .and_then(|t| t.replaced_by);

        while let Some(id) = cursor {
            let Some(token) = tokens.values_mut().find(|t| t.id == id) else {
                break;
            };
            if !token.is_revoked() {
                Self::revoke_record(token, revoked_by_ip, RevocationReason::ReplayContainment);
                count += 1;
            }
            cursor = token.replaced_by;
        }
        Ok(count)
    }

    async fn list_by_user(&self, user_id: Uuid) -> AuthResult<Vec<RefreshToken>> {
        Ok(self
            .tokens
            .read()
            .await
            .values()
            .filter(|t| t.user_id == user_id && t.is_active())
            .cloned()
            .collect())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_expired());
        Ok((before - tokens.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn make_token(user_id: Uuid, expires_in: Duration) -> RefreshToken {
        RefreshToken::new(
            RefreshToken::hash_token(&RefreshToken::generate_token()),
            Uuid::new_v4().to_string(),
            user_id,
            OffsetDateTime::now_utc() + expires_in,
            None,
        )
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let storage = InMemoryRefreshTokenStorage::new();
        let token = make_token(Uuid::new_v4(), Duration::days(7));

        storage.create(&token).await.unwrap();

        let found = storage.find_by_hash(&token.token_hash).await.unwrap();
        assert_eq!(found.unwrap().id, token.id);

        let found = storage.find_by_id(token.id).await.unwrap();
        assert_eq!(found.unwrap().token_hash, token.token_hash);

        assert!(storage.find_by_hash("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_hash_rejected() {
        let storage = InMemoryRefreshTokenStorage::new();
        let token = make_token(Uuid::new_v4(), Duration::days(7));

        storage.create(&token).await.unwrap();
        let result = storage.create(&token).await;
        assert!(matches!(result, Err(AuthError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_revoke_for_rotation_single_winner() {
        let storage = InMemoryRefreshTokenStorage::new();
        let token = make_token(Uuid::new_v4(), Duration::days(7));
        storage.create(&token).await.unwrap();

        assert!(
            storage
                .revoke_for_rotation(&token.token_hash, Some("203.0.113.7"))
                .await
                .unwrap()
        );
        // Second attempt observes the terminal state.
        assert!(
            !storage
                .revoke_for_rotation(&token.token_hash, Some("203.0.113.8"))
                .await
                .unwrap()
        );

        let stored = storage
            .find_by_hash(&token.token_hash)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.revoked_reason, Some(RevocationReason::Rotated));
        assert_eq!(stored.revoked_by_ip.as_deref(), Some("203.0.113.7"));
    }

    #[tokio::test]
    async fn test_revoke_idempotent() {
        let storage = InMemoryRefreshTokenStorage::new();
        let token = make_token(Uuid::new_v4(), Duration::days(7));
        storage.create(&token).await.unwrap();

        assert!(
            storage
                .revoke(&token.token_hash, None, RevocationReason::Explicit)
                .await
                .unwrap()
        );
        let first = storage
            .find_by_hash(&token.token_hash)
            .await
            .unwrap()
            .unwrap();

        assert!(
            storage
                .revoke(&token.token_hash, None, RevocationReason::BulkRevocation)
                .await
                .unwrap()
        );
        let second = storage
            .find_by_hash(&token.token_hash)
            .await
            .unwrap()
            .unwrap();

        // Terminal: reason and timestamp of the first revocation stand.
        assert_eq!(second.revoked_reason, Some(RevocationReason::Explicit));
        assert_eq!(second.revoked_at, first.revoked_at);

        assert!(
            !storage
                .revoke("missing", None, RevocationReason::Explicit)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_revoke_by_user_only_touches_active() {
        let storage = InMemoryRefreshTokenStorage::new();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();

        let active_a = make_token(user, Duration::days(7));
        let active_b = make_token(user, Duration::days(7));
        let expired = make_token(user, Duration::seconds(-60));
        let foreign = make_token(other, Duration::days(7));
        for t in [&active_a, &active_b, &expired, &foreign] {
            storage.create(t).await.unwrap();
        }

        let revoked = storage.revoke_by_user(user, None).await.unwrap();
        assert_eq!(revoked, 2);

        let foreign_stored = storage
            .find_by_hash(&foreign.token_hash)
            .await
            .unwrap()
            .unwrap();
        assert!(foreign_stored.is_active());

        assert_eq!(storage.revoke_by_user(user, None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_revoke_chain_follows_forward_links() {
        let storage = InMemoryRefreshTokenStorage::new();
        let user = Uuid::new_v4();

        // a -> b -> c, where a and b were rotated and c is the live tip.
        let a = make_token(user, Duration::days(7));
        let b = make_token(user, Duration::days(7));
        let c = make_token(user, Duration::days(7));
        for t in [&a, &b, &c] {
            storage.create(t).await.unwrap();
        }
        storage
            .revoke_for_rotation(&a.token_hash, None)
            .await
            .unwrap();
        storage.mark_replaced(&a.token_hash, b.id).await.unwrap();
        storage
            .revoke_for_rotation(&b.token_hash, None)
            .await
            .unwrap();
        storage.mark_replaced(&b.token_hash, c.id).await.unwrap();

        let revoked = storage.revoke_chain(a.id, Some("203.0.113.9")).await.unwrap();
        // Only c was still active.
        assert_eq!(revoked, 1);

        let tip = storage.find_by_id(c.id).await.unwrap().unwrap();
        assert!(tip.is_revoked());
        assert_eq!(
            tip.revoked_reason,
            Some(RevocationReason::ReplayContainment)
        );
        // b keeps its rotation state.
        let mid = storage.find_by_id(b.id).await.unwrap().unwrap();
        assert_eq!(mid.revoked_reason, Some(RevocationReason::Rotated));
    }

    #[tokio::test]
    async fn test_list_by_user_filters_inactive() {
        let storage = InMemoryRefreshTokenStorage::new();
        let user = Uuid::new_v4();

        let active = make_token(user, Duration::days(7));
        let expired = make_token(user, Duration::seconds(-60));
        let revoked = make_token(user, Duration::days(7));
        for t in [&active, &expired, &revoked] {
            storage.create(t).await.unwrap();
        }
        storage
            .revoke(&revoked.token_hash, None, RevocationReason::Explicit)
            .await
            .unwrap();

        let listed = storage.list_by_user(user).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, active.id);
    }

    #[tokio::test]
    async fn test_cleanup_expired_keeps_revoked_records() {
        let storage = InMemoryRefreshTokenStorage::new();
        let user = Uuid::new_v4();

        let expired = make_token(user, Duration::seconds(-60));
        let revoked = make_token(user, Duration::days(7));
        storage.create(&expired).await.unwrap();
        storage.create(&revoked).await.unwrap();
        storage
            .revoke(&revoked.token_hash, None, RevocationReason::Explicit)
            .await
            .unwrap();

        let deleted = storage.cleanup_expired().await.unwrap();
        assert_eq!(deleted, 1);

        // The revoked-but-unexpired record is audit material, not garbage.
        assert!(storage.find_by_id(revoked.id).await.unwrap().is_some());
        assert!(storage.find_by_id(expired.id).await.unwrap().is_none());
    }
}
