use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CredentialError;

use super::credential::Credential;

/// Store key for the session access token.
pub const ACCESS_TOKEN_KEY: &str = "remedia.access-token";
/// Store key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "remedia.refresh-token";

/// Abstract secure key-value store for persisted credentials.
///
/// Only the token cache and the gateway's session hooks go through this
/// trait; nothing else touches durable session state.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError>;
    fn remove(&self, key: &str) -> Result<(), CredentialError>;
}

/// Read the full credential out of the store's two well-known keys.
///
/// A missing access token means "no session" regardless of the refresh key.
pub fn read_credential(
    store: &dyn CredentialStore,
) -> Result<Option<Credential>, CredentialError> {
    let Some(access_token) = store.get(ACCESS_TOKEN_KEY)? else {
        return Ok(None);
    };
    let refresh_token = store.get(REFRESH_TOKEN_KEY)?;
    Ok(Some(Credential {
        access_token,
        refresh_token,
    }))
}

/// Persist a credential across the two well-known keys.
pub fn write_credential(
    store: &dyn CredentialStore,
    credential: &Credential,
) -> Result<(), CredentialError> {
    store.set(ACCESS_TOKEN_KEY, &credential.access_token)?;
    match &credential.refresh_token {
        Some(refresh) => store.set(REFRESH_TOKEN_KEY, refresh)?,
        None => store.remove(REFRESH_TOKEN_KEY)?,
    }
    Ok(())
}

/// Remove both credential keys.
pub fn clear_credential(store: &dyn CredentialStore) -> Result<(), CredentialError> {
    store.remove(ACCESS_TOKEN_KEY)?;
    store.remove(REFRESH_TOKEN_KEY)?;
    Ok(())
}

/// In-memory credential store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, CredentialError> {
        self.entries
            .lock()
            .map_err(|_| CredentialError::Io("credential store lock poisoned".to_string()))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CredentialError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// File-backed credential store using a single TOML file.
///
/// # Example
/// ```no_run
/// use remedia::auth::{CredentialStore, FileCredentialStore, ACCESS_TOKEN_KEY};
///
/// let store = FileCredentialStore::new_default();
/// store.set(ACCESS_TOKEN_KEY, "abc123")?;
/// # Ok::<(), remedia::error::CredentialError>(())
/// ```
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    // serializes read-modify-write cycles on the backing file
    io_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            io_lock: Mutex::new(()),
        }
    }

    pub fn new_default() -> Self {
        Self::new(default_credentials_path())
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(err) => return Err(CredentialError::Io(err.to_string())),
        };
        let file: CredentialFile = toml::from_str(&raw)?;
        Ok(file.entries)
    }

    fn write_entries(&self, entries: BTreeMap<String, String>) -> Result<(), CredentialError> {
        Self::ensure_parent(&self.path)?;
        let file = CredentialFile {
            version: 1,
            entries,
            saved_at: DateTime::<Utc>::from(std::time::SystemTime::now()),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&self.path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn ensure_parent(path: &Path) -> Result<(), CredentialError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>, CredentialError> {
        self.io_lock
            .lock()
            .map_err(|_| CredentialError::Io("credential store lock poisoned".to_string()))
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        let _guard = self.guard()?;
        Ok(self.read_entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        let _guard = self.guard()?;
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(entries)
    }

    fn remove(&self, key: &str) -> Result<(), CredentialError> {
        let _guard = self.guard()?;
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_some() {
            self.write_entries(entries)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialFile {
    version: u32,
    entries: BTreeMap<String, String>,
    saved_at: DateTime<Utc>,
}

fn default_credentials_path() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".remedia").join("credentials.toml"))
        .unwrap_or_else(|| PathBuf::from(".remedia/credentials.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileCredentialStore) {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.toml"));
        (dir, store)
    }

    #[test]
    fn file_store_round_trip_works() {
        let (_dir, store) = temp_store();
        store.set(ACCESS_TOKEN_KEY, "access").unwrap();
        store.set(REFRESH_TOKEN_KEY, "refresh").unwrap();
        assert_eq!(
            store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(),
            Some("access")
        );
        assert_eq!(
            store.get(REFRESH_TOKEN_KEY).unwrap().as_deref(),
            Some("refresh")
        );
    }

    #[test]
    fn file_store_missing_key_returns_none() {
        let (_dir, store) = temp_store();
        assert!(store.get(ACCESS_TOKEN_KEY).unwrap().is_none());
    }

    #[test]
    fn file_store_remove_is_idempotent() {
        let (_dir, store) = temp_store();
        store.set(ACCESS_TOKEN_KEY, "access").unwrap();
        store.remove(ACCESS_TOKEN_KEY).unwrap();
        store.remove(ACCESS_TOKEN_KEY).unwrap();
        assert!(store.get(ACCESS_TOKEN_KEY).unwrap().is_none());
    }

    #[test]
    fn read_credential_requires_access_token() {
        let store = MemoryCredentialStore::new();
        store.set(REFRESH_TOKEN_KEY, "refresh").unwrap();
        assert!(read_credential(&store).unwrap().is_none());
    }

    #[test]
    fn write_credential_without_refresh_clears_stale_refresh_key() {
        let store = MemoryCredentialStore::new();
        store.set(REFRESH_TOKEN_KEY, "old-refresh").unwrap();
        write_credential(&store, &Credential::new("access", None)).unwrap();
        let loaded = read_credential(&store).unwrap().unwrap();
        assert_eq!(loaded.access_token, "access");
        assert!(loaded.refresh_token.is_none());
    }

    #[test]
    fn clear_credential_removes_both_keys() {
        let store = MemoryCredentialStore::new();
        write_credential(
            &store,
            &Credential::new("access", Some("refresh".to_string())),
        )
        .unwrap();
        clear_credential(&store).unwrap();
        assert!(store.get(ACCESS_TOKEN_KEY).unwrap().is_none());
        assert!(store.get(REFRESH_TOKEN_KEY).unwrap().is_none());
    }
}
