// ── File-backed session ──
//
// Persists the session map (`token`, `currentUser`) as a JSON object so a
// sign-in survives between CLI invocations. Every write rewrites the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use iobuilt_api::{SessionReader, SessionStore};
use tracing::{debug, warn};

use crate::{ConfigError, project_dirs};

/// Default session file in the platform data directory.
pub fn default_session_path() -> Result<PathBuf, ConfigError> {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("session.json"))
        .ok_or(ConfigError::NoConfigDir)
}

#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileSessionStore {
    /// Open the store at `path`. A missing file is an empty session.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = entries.len(), "session opened");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) {
        if let Err(e) = write_entries(&self.path, entries) {
            warn!(path = %self.path.display(), error = %e, "failed to persist session");
        }
    }
}

fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), ConfigError> {
    if entries.is_empty() {
        return match std::fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        };
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(entries)?)?;
    Ok(())
}

impl SessionReader for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl SessionStore for FileSessionStore {
    fn set(&self, key: &str, value: String) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value);
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use iobuilt_api::StoredUser;
    use pretty_assertions::assert_eq;

    use super::*;

    fn user() -> StoredUser {
        StoredUser {
            id: 1,
            email: "a@b.com".into(),
            role: "builder".into(),
            username: None,
            name: None,
            photo_url: None,
        }
    }

    #[test]
    fn session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("session.json");

        FileSessionStore::open(&path).unwrap().save("T", &user());

        let reopened = FileSessionStore::open(&path).unwrap();
        assert_eq!(reopened.token().as_deref(), Some("T"));
        assert_eq!(reopened.current_user(), Some(user()));
    }

    #[test]
    fn clear_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileSessionStore::open(&path).unwrap();
        store.save("T", &user());
        assert!(path.exists());

        store.clear();
        assert!(!path.exists());
        assert!(FileSessionStore::open(&path).unwrap().token().is_none());
    }

    #[test]
    fn missing_and_empty_files_are_empty_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        assert!(FileSessionStore::open(&path).unwrap().get("token").is_none());

        std::fs::write(&path, "  \n").unwrap();
        assert!(FileSessionStore::open(&path).unwrap().get("token").is_none());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{token").unwrap();

        assert!(matches!(
            FileSessionStore::open(&path),
            Err(ConfigError::SessionFormat(_))
        ));
    }
}
