//! Storage and collaborator traits for the credential session core.
//!
//! This module defines the interfaces the core consumes:
//!
//! - Refresh token records (the one shared mutable resource)
//! - Security events (append-only audit trail)
//! - User directory and role source (read-only identity lookups)
//!
//! # Implementations
//!
//! - `stayforge-auth-memory` - in-memory backend

pub mod refresh_token;
pub mod role;
pub mod security_event;
pub mod user;

pub use refresh_token::RefreshTokenStorage;
pub use role::RoleSource;
pub use security_event::SecurityEventStorage;
pub use user::{User, UserDirectory};
