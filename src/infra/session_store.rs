//! Usage: Injected string key-value session store (in-memory and atomic-file backends).

use crate::shared::error::AppResult;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Persisted session record (JSON-serialized `UserRecord`).
pub const KEY_USER: &str = "user";
/// Opaque ID token from the last successful exchange.
pub const KEY_AUTH_TOKEN: &str = "authToken";
/// Authorization code waiting to be consumed, together with its receipt time.
pub const KEY_PENDING_CODE: &str = "pendingAuthCode";
pub const KEY_PENDING_RECEIVED_AT: &str = "pendingAuthReceivedAt";
/// Expected CSRF state nonce issued by `initiate_federated_login`.
pub const KEY_OAUTH_STATE: &str = "oauthState";

/// Browser-storage stand-in. Values are plain strings; callers own the
/// serialization. Multi-tab sharing is last-writer-wins by design.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: &str);
    fn remove(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.remove(key)
    }
}

/// File-backed store for long-lived sessions (desktop embedding, tests).
///
/// Writes go through a temp file and rename so a crash never leaves a
/// half-written session on disk.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileSessionStore {
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| format!("SYSTEM_ERROR: failed to read session file: {e}"))?;
            serde_json::from_str(&content)
                .map_err(|e| format!("SYSTEM_ERROR: session file is not valid json: {e}"))?
        } else {
            HashMap::new()
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        let content = match serde_json::to_vec_pretty(entries) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("session file serialize failed: {err}");
                return;
            }
        };

        let tmp_path = self.path.with_extension("json.tmp");
        if let Err(err) = std::fs::write(&tmp_path, content) {
            tracing::warn!("session file write failed: {err}");
            return;
        }
        if let Err(err) = std::fs::rename(&tmp_path, &self.path) {
            tracing::warn!("session file rename failed: {err}");
        }
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
            self.persist(&entries);
        }
    }

    fn remove(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().ok()?;
        let removed = entries.remove(key);
        if removed.is_some() {
            self.persist(&entries);
        }
        removed
    }
}
