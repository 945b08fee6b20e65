//! In-memory user directory and role source.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use stayforge_auth::AuthResult;
use stayforge_auth::storage::{RoleSource, User, UserDirectory};

/// In-memory user directory keyed by user id.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user.
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

/// In-memory role source with per-user role sets.
///
/// Users without an entry get the default role set.
#[derive(Debug, Default)]
pub struct InMemoryRoleSource {
    default_roles: Vec<String>,
    roles: RwLock<HashMap<Uuid, Vec<String>>>,
}

impl InMemoryRoleSource {
    /// Creates a role source with the given default role set.
    #[must_use]
    pub fn new(default_roles: Vec<String>) -> Self {
        Self {
            default_roles,
            roles: RwLock::new(HashMap::new()),
        }
    }

    /// Assigns a specific role set to a user.
    pub async fn assign(&self, user_id: Uuid, roles: Vec<String>) {
        self.roles.write().await.insert(user_id, roles);
    }
}

#[async_trait]
impl RoleSource for InMemoryRoleSource {
    async fn roles_for(&self, user: &User) -> AuthResult<Vec<String>> {
        Ok(self
            .roles
            .read()
            .await
            .get(&user.id)
            .cloned()
            .unwrap_or_else(|| self.default_roles.clone()))
    }
}
