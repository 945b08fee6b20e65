//! Role source trait.
//!
//! Roles are opaque strings to the session core: they are fetched at login,
//! embedded into claims, and carried forward unchanged through rotation.
//! Evaluation of what a role permits happens in the consuming layer.

use async_trait::async_trait;

use crate::AuthResult;
use crate::storage::user::User;

/// Supplies the role set embedded into a user's access credential.
#[async_trait]
pub trait RoleSource: Send + Sync {
    /// Returns the role names granted to a user. May be empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    async fn roles_for(&self, user: &User) -> AuthResult<Vec<String>>;
}
