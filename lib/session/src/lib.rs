//! Visitor sessions for gatehouse.
//!
//! This crate provides:
//! - The per-visitor `Session` holding provider tokens and cached entitlements
//! - The tri-state `Entitlement` that separates "never checked" from "checked, no"
//! - The `SessionStore` abstraction with in-memory (moka) and Redis backends
//!
//! # Example
//!
//! ```
//! use gatehouse_core::{AccessToken, Identity, Provider};
//! use gatehouse_session::{Entitlement, Session};
//!
//! let mut session = Session::new();
//! assert!(!session.is_authenticated());
//!
//! session.record_identity(Identity::new(Provider::Google, AccessToken::new("ya29.token")));
//! assert!(session.is_authenticated());
//! assert_eq!(session.subscription(), Entitlement::Unknown);
//!
//! session.set_entitlement(Provider::Google, Entitlement::Satisfied);
//! assert!(session.subscription().is_satisfied());
//! ```

pub mod entitlement;
pub mod error;
pub mod memory;
pub mod redis_store;
pub mod session;
pub mod store;

pub use entitlement::Entitlement;
pub use error::SessionStoreError;
pub use memory::MemorySessionStore;
pub use redis_store::RedisSessionStore;
pub use session::Session;
pub use store::SessionStore;
