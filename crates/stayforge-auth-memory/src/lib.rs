//! In-memory storage backend for the StayForge session system.
//!
//! This crate provides in-memory implementations of the `stayforge-auth`
//! storage traits. The refresh token store enforces the same
//! compare-and-swap rotation contract a database backend must provide, so
//! it doubles as the reference implementation for the concurrency tests.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use stayforge_auth_memory::InMemoryRefreshTokenStorage;
//!
//! let storage = Arc::new(InMemoryRefreshTokenStorage::new());
//! let service = TokenService::new(jwt, storage, users, roles, audit, config);
//! ```

pub mod refresh_token;
pub mod security_event;
pub mod user;

pub use refresh_token::InMemoryRefreshTokenStorage;
pub use security_event::InMemorySecurityEventStorage;
pub use user::{InMemoryRoleSource, InMemoryUserDirectory};
