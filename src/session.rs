//! # Session Bridge
//!
//! Loads a client's session attributes into a request-local copy and merges
//! them back after the handler returns.
//!
//! Persistent storage is a collaborator behind the [`SessionStore`] trait.
//! [`MemorySessionStore`] keeps sessions in a concurrent map for tests and
//! single-process deployments.
//!
//! Saving is a merge: every entry of the saved map overwrites the stored one,
//! and nothing is ever removed by a save.

use crate::handlers::SessionMap;
use crate::ids::SessionId;
use crate::security::SessionReader;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Key/value storage scoped to a client session.
pub trait SessionStore: Send + Sync {
    /// Copy of every attribute, or `None` if the session does not exist.
    fn attributes(&self, id: &SessionId) -> Option<SessionMap>;

    /// One attribute, without creating the session.
    fn attribute(&self, id: &SessionId, key: &str) -> Option<Value> {
        self.attributes(id).and_then(|mut m| m.remove(key))
    }

    /// Create an empty session under `id` if none exists.
    fn create(&self, id: SessionId);

    /// Set each entry of `entries` on the session, creating it if needed.
    fn merge(&self, id: &SessionId, entries: &SessionMap);

    /// Drop the session. Returns whether it existed.
    fn remove(&self, id: &SessionId) -> bool;
}

/// In-process [`SessionStore`].
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<SessionId, SessionMap>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn attributes(&self, id: &SessionId) -> Option<SessionMap> {
        self.sessions.get(id).map(|s| s.value().clone())
    }

    fn attribute(&self, id: &SessionId, key: &str) -> Option<Value> {
        self.sessions.get(id).and_then(|s| s.get(key).cloned())
    }

    fn create(&self, id: SessionId) {
        self.sessions.entry(id).or_default();
    }

    fn merge(&self, id: &SessionId, entries: &SessionMap) {
        let mut session = self.sessions.entry(*id).or_default();
        for (k, v) in entries {
            session.insert(k.clone(), v.clone());
        }
    }

    fn remove(&self, id: &SessionId) -> bool {
        self.sessions.remove(id).is_some()
    }
}

/// A session loaded for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionScope {
    id: SessionId,
    attributes: SessionMap,
    created: bool,
}

impl SessionScope {
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn attributes(&self) -> &SessionMap {
        &self.attributes
    }

    /// Id of the session if it was created by this load.
    #[must_use]
    pub fn new_session(&self) -> Option<SessionId> {
        self.created.then_some(self.id)
    }
}

/// Read-only view of one client's session, for role checks.
pub struct SessionView<'a> {
    store: &'a dyn SessionStore,
    id: Option<SessionId>,
}

impl SessionReader for SessionView<'_> {
    fn read(&self, key: &str) -> Option<Value> {
        self.id.as_ref().and_then(|id| self.store.attribute(id, key))
    }
}

/// Moves session attributes between the store and handler arguments.
#[derive(Clone)]
pub struct SessionBridge {
    store: Arc<dyn SessionStore>,
}

impl SessionBridge {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Bridge over a fresh [`MemorySessionStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Copy the client's attributes, creating a session when the client has
    /// none or presents an unknown id.
    #[must_use]
    pub fn load(&self, client: Option<SessionId>) -> SessionScope {
        if let Some(id) = client {
            if let Some(attributes) = self.store.attributes(&id) {
                debug!(session_id = %id, attributes = attributes.len(), "Session loaded");
                return SessionScope {
                    id,
                    attributes,
                    created: false,
                };
            }
        }
        let id = SessionId::new();
        self.store.create(id);
        info!(session_id = %id, "Session created");
        SessionScope {
            id,
            attributes: SessionMap::new(),
            created: true,
        }
    }

    /// Merge `attributes` into the stored session.
    pub fn save(&self, id: &SessionId, attributes: &SessionMap) {
        debug!(session_id = %id, attributes = attributes.len(), "Session saved");
        self.store.merge(id, attributes);
    }

    /// Read one attribute without creating a session.
    #[must_use]
    pub fn attribute(&self, client: Option<SessionId>, key: &str) -> Option<Value> {
        client.and_then(|id| self.store.attribute(&id, key))
    }

    /// Discard the client's session. Returns whether one existed.
    pub fn invalidate(&self, id: &SessionId) -> bool {
        let existed = self.store.remove(id);
        if existed {
            info!(session_id = %id, "Session invalidated");
        }
        existed
    }

    #[must_use]
    pub fn reader(&self, client: Option<SessionId>) -> SessionView<'_> {
        SessionView {
            store: self.store.as_ref(),
            id: client,
        }
    }
}

impl Default for SessionBridge {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_creates_missing_session() {
        let bridge = SessionBridge::in_memory();
        let scope = bridge.load(None);
        assert!(scope.attributes().is_empty());
        assert_eq!(scope.new_session(), Some(scope.id()));

        let unknown = SessionId::new();
        let scope = bridge.load(Some(unknown));
        assert_ne!(scope.id(), unknown);
        assert!(scope.new_session().is_some());
    }

    #[test]
    fn test_load_returns_copy() {
        let bridge = SessionBridge::in_memory();
        let id = bridge.load(None).id();
        let mut first = SessionMap::new();
        first.insert("cart".into(), json!([1]));
        bridge.save(&id, &first);

        let mut scope = bridge.load(Some(id));
        assert_eq!(scope.new_session(), None);
        scope.attributes.insert("cart".into(), json!([1, 2]));
        assert_eq!(bridge.attribute(Some(id), "cart"), Some(json!([1])));
    }

    #[test]
    fn test_save_merges_and_never_removes() {
        let bridge = SessionBridge::in_memory();
        let id = bridge.load(None).id();
        let mut a = SessionMap::new();
        a.insert("x".into(), json!(1));
        a.insert("y".into(), json!(2));
        bridge.save(&id, &a);
        let mut b = SessionMap::new();
        b.insert("y".into(), json!(3));
        bridge.save(&id, &b);

        let stored = bridge.store().attributes(&id).unwrap();
        assert_eq!(stored.get("x"), Some(&json!(1)));
        assert_eq!(stored.get("y"), Some(&json!(3)));
    }

    #[test]
    fn test_reader_does_not_create() {
        let store = Arc::new(MemorySessionStore::new());
        let bridge = SessionBridge::new(Arc::clone(&store) as Arc<dyn SessionStore>);
        assert_eq!(bridge.reader(Some(SessionId::new())).read("profile"), None);
        assert_eq!(bridge.reader(None).read("profile"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_invalidate() {
        let bridge = SessionBridge::in_memory();
        let id = bridge.load(None).id();
        assert!(bridge.invalidate(&id));
        assert!(!bridge.invalidate(&id));
        assert_eq!(bridge.attribute(Some(id), "anything"), None);
    }
}
