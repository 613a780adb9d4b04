//! In-memory session store using the moka crate.

use std::time::Duration;

use async_trait::async_trait;
use gatehouse_core::{Result, SessionId};
use moka::future::Cache;
use tracing::debug;

use crate::error::SessionStoreError;
use crate::session::Session;
use crate::store::SessionStore;

/// Process-local session store.
///
/// Sessions are evicted after `idle_ttl` without access, or when the store
/// grows past its capacity.
#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    cache: Cache<SessionId, Session>,
}

impl MemorySessionStore {
    /// Creates a store holding at most `max_sessions` entries.
    #[must_use]
    pub fn new(max_sessions: u64, idle_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_sessions)
            .time_to_idle(idle_ttl)
            .build();
        Self { cache }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(10_000, Duration::from_secs(24 * 60 * 60))
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError> {
        Ok(self.cache.get(id).await)
    }

    async fn save(&self, id: &SessionId, session: &Session) -> Result<(), SessionStoreError> {
        self.cache.insert(id.clone(), session.clone()).await;
        debug!(entries = self.cache.entry_count(), "session saved");
        Ok(())
    }

    async fn remove(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        self.cache.invalidate(id).await;
        Ok(())
    }
}
