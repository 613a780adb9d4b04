//! The session store abstraction.

use async_trait::async_trait;
use gatehouse_core::{Result, SessionId};

use crate::error::SessionStoreError;
use crate::session::Session;

/// Key/value storage for visitor sessions keyed by [`SessionId`].
///
/// Entries expire on their own after a backend-defined idle period; nothing
/// in gatehouse sweeps them explicitly.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads a session, returning `None` if it never existed or has expired.
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError>;

    /// Inserts or overwrites a session.
    async fn save(&self, id: &SessionId, session: &Session) -> Result<(), SessionStoreError>;

    /// Removes a session. Removing a missing session is not an error.
    async fn remove(&self, id: &SessionId) -> Result<(), SessionStoreError>;
}
