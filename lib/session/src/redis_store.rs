//! Redis-backed session store for multi-instance deployments.

use std::time::Duration;

use async_trait::async_trait;
use gatehouse_core::{Result, SessionId};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::{debug, info, instrument};

use crate::error::SessionStoreError;
use crate::session::Session;
use crate::store::SessionStore;

/// Prefix for session keys so the database can be shared.
const KEY_PREFIX: &str = "gatehouse:session:";

/// Session store persisting JSON-encoded sessions in Redis.
///
/// Every save refreshes the key's expiry, giving the same idle-timeout
/// semantics as [`MemorySessionStore`](crate::MemorySessionStore).
#[derive(Clone)]
pub struct RedisSessionStore {
    connection: ConnectionManager,
    idle_ttl: Duration,
}

impl RedisSessionStore {
    /// Connects to Redis at `url`.
    pub async fn connect(url: &str, idle_ttl: Duration) -> Result<Self, SessionStoreError> {
        let client = redis::Client::open(url).map_err(|e| SessionStoreError::ConnectionFailed {
            reason: e.to_string(),
        })?;
        let connection = ConnectionManager::new(client).await.map_err(|e| {
            SessionStoreError::ConnectionFailed {
                reason: e.to_string(),
            }
        })?;
        info!("connected to Redis session store");
        Ok(Self {
            connection,
            idle_ttl,
        })
    }

    fn key(id: &SessionId) -> String {
        format!("{KEY_PREFIX}{id}")
    }

    fn ttl_seconds(&self) -> u64 {
        self.idle_ttl.as_secs().max(1)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    #[instrument(skip_all)]
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError> {
        let mut connection = self.connection.clone();
        let raw: Option<String> =
            connection
                .get(Self::key(id))
                .await
                .map_err(|e| SessionStoreError::Backend {
                    reason: e.to_string(),
                })?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        let session = decode(id, &raw)?;
        Ok(Some(session))
    }

    #[instrument(skip_all)]
    async fn save(&self, id: &SessionId, session: &Session) -> Result<(), SessionStoreError> {
        let raw = encode(session)?;
        let mut connection = self.connection.clone();
        connection
            .set_ex::<_, _, ()>(Self::key(id), raw, self.ttl_seconds())
            .await
            .map_err(|e| SessionStoreError::Backend {
                reason: e.to_string(),
            })?;
        debug!(ttl_seconds = self.ttl_seconds(), "session saved");
        Ok(())
    }

    #[instrument(skip_all)]
    async fn remove(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        let mut connection = self.connection.clone();
        connection
            .del::<_, ()>(Self::key(id))
            .await
            .map_err(|e| SessionStoreError::Backend {
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

fn encode(session: &Session) -> Result<String, SessionStoreError> {
    let raw = serde_json::to_string(session).map_err(|e| SessionStoreError::Encoding {
        reason: e.to_string(),
    })?;
    Ok(raw)
}

fn decode(id: &SessionId, raw: &str) -> Result<Session, SessionStoreError> {
    let session = serde_json::from_str(raw).map_err(|e| SessionStoreError::Corrupted {
        session_id: id.to_string(),
        reason: e.to_string(),
    })?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitlement::Entitlement;
    use gatehouse_core::{AccessToken, Identity, Provider};

    #[test]
    fn keys_are_namespaced() {
        let key = RedisSessionStore::key(&SessionId::new("abc"));
        assert_eq!(key, "gatehouse:session:abc");
    }

    #[test]
    fn stored_form_decodes_to_same_session() {
        let mut session = Session::new();
        session.record_identity(Identity::new(Provider::Google, AccessToken::new("ya29.t")));
        session.set_entitlement(Provider::Google, Entitlement::Satisfied);

        let raw = encode(&session).expect("encode");
        let decoded = decode(&SessionId::new("abc"), &raw).expect("decode");
        assert_eq!(decoded, session);
    }

    #[test]
    fn garbage_is_reported_as_corrupted() {
        assert!(decode(&SessionId::new("abc"), "{not json").is_err());
    }
}
