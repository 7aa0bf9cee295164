//! Per-request session handle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::mvc::Data;
use crate::session::SessionId;

#[derive(Debug, Default)]
struct SessionState {
    id: Option<SessionId>,
    data: Data,
    modified: bool,
    destroyed: bool,
    regenerate: bool,
}

/// Key-value session of the current client.
///
/// Cloning yields another handle to the same session. Writes are persisted
/// by the session middleware once the handler returns.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<Mutex<SessionState>>,
}

impl Session {
    /// A session that has never been stored.
    pub fn fresh() -> Self {
        Self::default()
    }

    /// A session loaded from the store.
    pub fn existing(id: SessionId, data: Data) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionState {
                id: Some(id),
                data,
                ..SessionState::default()
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> Option<SessionId> {
        self.state().id.clone()
    }

    /// True until the session has been stored under an ID.
    pub fn is_new(&self) -> bool {
        self.state().id.is_none()
    }

    pub fn is_modified(&self) -> bool {
        self.state().modified
    }

    pub fn is_destroyed(&self) -> bool {
        self.state().destroyed
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.state().data.get(key).cloned()
    }

    /// Deserialize a value into `T`; `None` if missing or of the wrong shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| serde_json::from_value(v).ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state().data.contains_key(key)
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) {
        let mut state = self.state();
        state.data.insert(key.into(), value.into());
        state.modified = true;
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut state = self.state();
        let removed = state.data.remove(key);
        if removed.is_some() {
            state.modified = true;
        }
        removed
    }

    pub fn clear(&self) {
        let mut state = self.state();
        if !state.data.is_empty() {
            state.data.clear();
            state.modified = true;
        }
    }

    /// Copy of the current data.
    pub fn snapshot(&self) -> Data {
        self.state().data.clone()
    }

    /// Drop the session from the store and clear the client's cookie.
    pub fn destroy(&self) {
        let mut state = self.state();
        state.destroyed = true;
        state.data.clear();
    }

    /// Keep the data but move it to a new ID, invalidating the old cookie.
    pub fn regenerate(&self) {
        let mut state = self.state();
        state.regenerate = true;
        state.modified = true;
    }

    pub(crate) fn wants_regenerate(&self) -> bool {
        self.state().regenerate
    }
}
