//! Credential model, secure key-value storage, and the TTL'd token cache.

pub mod cache;
pub mod credential;
pub mod store;

pub use cache::{TokenCache, DEFAULT_TOKEN_TTL};
pub use credential::Credential;
pub use store::{
    clear_credential, read_credential, write_credential, CredentialStore, FileCredentialStore,
    MemoryCredentialStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY,
};
