use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;

use super::credential::Credential;
use super::store::{read_credential, CredentialStore};

/// Default time-to-live for a cached credential. Tunable via
/// [`TokenCache::new`] / `GatewayConfig::with_token_ttl`.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Default)]
struct CacheEntry {
    value: Option<Credential>,
    fetched_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: TimeDelta) -> bool {
        self.fetched_at
            .is_some_and(|fetched| Utc::now() - fetched < ttl)
    }
}

/// TTL'd in-memory view of the stored credential.
///
/// The entry is guarded by an async mutex, so any number of concurrent
/// [`get`](TokenCache::get) calls against a stale entry serialize on a single
/// store reload: the store is read at most once and every caller observes the
/// same resulting value. The lock is never held across the network transport;
/// the credential store is a local secure key-value read.
pub struct TokenCache {
    store: Arc<dyn CredentialStore>,
    ttl: TimeDelta,
    entry: Mutex<CacheEntry>,
}

impl TokenCache {
    pub fn new(store: Arc<dyn CredentialStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl: TimeDelta::from_std(ttl).unwrap_or_else(|_| TimeDelta::seconds(300)),
            entry: Mutex::new(CacheEntry::default()),
        }
    }

    /// Current credential, reloading from the store when the cached entry is
    /// absent or older than its TTL.
    ///
    /// `None` is a valid result meaning "no session"; the request is then
    /// sent unauthenticated. A store read failure degrades to the last known
    /// value rather than surfacing an error.
    pub async fn get(&self) -> Option<Credential> {
        let mut entry = self.entry.lock().await;
        if entry.is_fresh(self.ttl) {
            return entry.value.clone();
        }
        match read_credential(self.store.as_ref()) {
            Ok(value) => {
                entry.value = value;
                entry.fetched_at = Some(Utc::now());
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "credential store read failed; keeping last known credential"
                );
            }
        }
        entry.value.clone()
    }

    /// Drop the in-memory entry without touching durable storage. The next
    /// [`get`](TokenCache::get) reloads from the store.
    pub async fn invalidate(&self) {
        let mut entry = self.entry.lock().await;
        entry.value = None;
        entry.fetched_at = None;
    }

    /// Install a freshly issued credential, e.g. right after sign-in.
    pub async fn prime(&self, credential: Credential) {
        let mut entry = self.entry.lock().await;
        entry.value = Some(credential);
        entry.fetched_at = Some(Utc::now());
    }
}
