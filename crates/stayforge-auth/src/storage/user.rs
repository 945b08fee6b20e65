//! User directory trait.
//!
//! The session core does not own user records; it reads the few identity
//! fields that go into access credential claims through this interface.
//! The relational persistence layer behind it is an external collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AuthResult;

/// Identity fields the session core embeds into claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user.
    pub id: Uuid,

    /// Email address.
    pub email: String,

    /// Display name.
    pub display_name: String,

    /// Whether the user holds the administrator flag.
    pub is_admin: bool,
}

/// Read-only lookup into the user store.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails. A missing user is `None`, not
    /// an error.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>>;
}
