//! Session storage.

use std::fmt;
use std::time::SystemTime;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::mvc::Data;
use crate::session::SessionError;

/// Opaque session identifier carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backing storage for session data.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Load a session. Expired sessions read as absent.
    async fn load(&self, id: &SessionId) -> Result<Option<Data>, SessionError>;

    /// Insert or replace a session, valid until `expires_at`.
    async fn save(&self, id: &SessionId, data: Data, expires_at: SystemTime) -> Result<(), SessionError>;

    async fn destroy(&self, id: &SessionId) -> Result<(), SessionError>;

    /// Remove expired sessions, returning how many were removed.
    async fn purge_expired(&self) -> Result<usize, SessionError>;

    /// Number of sessions currently held, including not yet purged expired ones.
    async fn count(&self) -> Result<usize, SessionError>;
}

#[derive(Debug, Clone)]
struct StoredSession {
    data: Data,
    expires_at: SystemTime,
}

impl StoredSession {
    fn is_expired(&self, now: SystemTime) -> bool {
        self.expires_at <= now
    }
}

/// In-memory session store. Not durable across restarts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: DashMap<SessionId, StoredSession>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, id: &SessionId) -> Result<Option<Data>, SessionError> {
        let now = SystemTime::now();
        let expired = match self.inner.get(id) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.data.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.inner.remove_if(id, |_, entry| entry.is_expired(now));
        }
        Ok(None)
    }

    async fn save(&self, id: &SessionId, data: Data, expires_at: SystemTime) -> Result<(), SessionError> {
        self.inner.insert(id.clone(), StoredSession { data, expires_at });
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), SessionError> {
        self.inner.remove(id);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, SessionError> {
        let now = SystemTime::now();
        let before = self.inner.len();
        self.inner.retain(|_, entry| !entry.is_expired(now));
        Ok(before.saturating_sub(self.inner.len()))
    }

    async fn count(&self) -> Result<usize, SessionError> {
        Ok(self.inner.len())
    }
}
