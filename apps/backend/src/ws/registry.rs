//! Session-scoped connection registry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

/// Why a single delivery attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The transport is closed; the connection will never accept messages again.
    #[error("connection gone")]
    Gone,
    /// The channel as a whole is throttled; retrying now would not help.
    #[error("rate limited")]
    RateLimited,
    #[error("transient delivery failure: {0}")]
    Transient(String),
}

impl DeliveryError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, DeliveryError::Transient(_))
    }
}

/// Where serialized messages for one connection go.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn deliver(&self, payload: &str) -> Result<(), DeliveryError>;
}

#[derive(Clone)]
pub struct Connection {
    pub conn_id: Uuid,
    pub session_id: String,
    pub user_id: String,
    pub established_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub sink: Arc<dyn MessageSink>,
}

impl Connection {
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("conn_id", &self.conn_id)
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Live connections keyed by session, then by connection id.
pub struct ConnectionRegistry {
    sessions: DashMap<String, DashMap<Uuid, Connection>>,
    ttl: Duration,
}

impl ConnectionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn register(
        &self,
        session_id: &str,
        user_id: &str,
        sink: Arc<dyn MessageSink>,
    ) -> Connection {
        let established_at = OffsetDateTime::now_utc();
        let conn = Connection {
            conn_id: Uuid::new_v4(),
            session_id: session_id.to_owned(),
            user_id: user_id.to_owned(),
            established_at,
            expires_at: established_at + self.ttl,
            sink,
        };
        self.sessions
            .entry(session_id.to_owned())
            .or_default()
            .insert(conn.conn_id, conn.clone());
        debug!(session_id, user_id, conn_id = %conn.conn_id, "connection registered");
        conn
    }

    /// Returns whether the connection was present.
    pub fn deregister(&self, session_id: &str, conn_id: Uuid) -> bool {
        let removed = self
            .sessions
            .get(session_id)
            .is_some_and(|entry| entry.remove(&conn_id).is_some());
        self.sessions.remove_if(session_id, |_, conns| conns.is_empty());
        if removed {
            debug!(session_id, conn_id = %conn_id, "connection deregistered");
        }
        removed
    }

    /// Unexpired connections of a session.
    pub fn connections_for(&self, session_id: &str) -> Vec<Connection> {
        let now = OffsetDateTime::now_utc();
        self.sessions
            .get(session_id)
            .map(|entry| {
                entry
                    .iter()
                    .filter(|c| !c.is_expired(now))
                    .map(|c| c.value().clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn connections_for_user(&self, session_id: &str, user_id: &str) -> Vec<Connection> {
        self.connections_for(session_id)
            .into_iter()
            .filter(|c| c.user_id == user_id)
            .collect()
    }

    /// Drop connections expired at `now`. Returns how many were removed.
    pub fn sweep_expired(&self, now: OffsetDateTime) -> usize {
        let mut removed = 0;
        for entry in self.sessions.iter() {
            let before = entry.len();
            entry.retain(|_, c| !c.is_expired(now));
            removed += before - entry.len();
        }
        self.sessions.retain(|_, conns| !conns.is_empty());
        if removed > 0 {
            debug!(removed, "swept expired connections");
        }
        removed
    }

    pub fn connection_count(&self) -> usize {
        self.sessions.iter().map(|e| e.len()).sum()
    }
}
