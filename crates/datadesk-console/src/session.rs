//! In-memory browser sessions.
//!
//! A session is `{username, role}` keyed by a random token held in the
//! browser's cookie. Nothing is persisted: sessions live exactly as long as
//! the process, and logout removes the entry.

use datadesk_pg::UserRole;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// An authenticated browser session.
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub role: UserRole,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Server-side session map.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and return its token.
    pub fn create(&self, username: impl Into<String>, role: UserRole) -> String {
        let token = Uuid::new_v4().to_string();
        let session = Session {
            username: username.into(),
            role,
        };
        self.sessions.write().unwrap().insert(token.clone(), session);
        token
    }

    /// Look up a session by token.
    pub fn get(&self, token: &str) -> Option<Session> {
        self.sessions.read().unwrap().get(token).cloned()
    }

    /// Remove a session, if present.
    pub fn remove(&self, token: &str) {
        self.sessions.write().unwrap().remove(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_get_round_trips() {
        let store = SessionStore::new();
        let token = store.create("alice", UserRole::Admin);

        let session = store.get(&token).unwrap();
        assert_eq!(session.username, "alice");
        assert!(session.is_admin());
    }

    #[test]
    fn tokens_are_unique_per_session() {
        let store = SessionStore::new();
        let a = store.create("alice", UserRole::User);
        let b = store.create("alice", UserRole::User);
        assert_ne!(a, b);
    }

    #[test]
    fn removed_sessions_stop_resolving() {
        let store = SessionStore::new();
        let token = store.create("bob", UserRole::User);
        store.remove(&token);
        assert!(store.get(&token).is_none());
        assert!(store.get("unknown-token").is_none());
    }
}
