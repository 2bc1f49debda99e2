// Persisted session storage contract.
//
// The session is a flat key/value map holding two keys: `token` (bearer
// string) and `currentUser` (JSON-encoded `StoredUser`). They are written
// and cleared together. IAM owns writes; every other context reads through
// `SessionReader` only.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const TOKEN_KEY: &str = "token";
pub const CURRENT_USER_KEY: &str = "currentUser";

/// The `currentUser` record as persisted after sign-in.
///
/// Profile-derived fields are added after the first profile fetch and are
/// omitted from the JSON until then.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub id: u64,
    pub email: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Read-only view of the persisted session.
pub trait SessionReader: Send + Sync {
    /// Raw value for `key`, exactly as persisted.
    fn get(&self, key: &str) -> Option<String>;

    /// The bearer token, if one is stored and non-empty.
    fn token(&self) -> Option<String> {
        self.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// The decoded `currentUser` record. Malformed JSON reads as `None`.
    fn current_user(&self) -> Option<StoredUser> {
        let raw = self.get(CURRENT_USER_KEY)?;
        serde_json::from_str(&raw)
            .inspect_err(|e| warn!(error = %e, "stored currentUser is not valid JSON"))
            .ok()
    }
}

/// Read-write session storage. Only IAM and the HTTP 401 handler write.
pub trait SessionStore: SessionReader {
    fn set(&self, key: &str, value: String);

    fn remove(&self, key: &str);

    /// Persist a fresh session.
    fn save(&self, token: &str, user: &StoredUser) {
        self.set(TOKEN_KEY, token.to_owned());
        self.set_current_user(user);
    }

    fn set_current_user(&self, user: &StoredUser) {
        match serde_json::to_string(user) {
            Ok(json) => self.set(CURRENT_USER_KEY, json),
            Err(e) => warn!(error = %e, "failed to encode currentUser"),
        }
    }

    /// Drop both session keys.
    fn clear(&self) {
        self.remove(TOKEN_KEY);
        self.remove(CURRENT_USER_KEY);
        debug!("session cleared");
    }
}

// ── In-memory store ──────────────────────────────────────────────────

/// Process-local session storage. Lost on exit.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionReader for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl SessionStore for MemorySessionStore {
    fn set(&self, key: &str, value: String) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value);
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

// ── Navigation ───────────────────────────────────────────────────────

/// Host hook used to force a view change, e.g. to the login path on 401.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator for headless consumers: only logs the request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, path: &str) {
        debug!(path, "navigation requested");
    }
}
