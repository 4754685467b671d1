use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};

use crate::auth::TokenCache;
use crate::transport::OutboundRequest;

/// Attaches the bearer credential to an outgoing request.
///
/// Performs no network I/O; the only thing this stage can block on is the
/// token cache lock.
pub struct RequestAuthenticator {
    cache: Arc<TokenCache>,
}

impl RequestAuthenticator {
    pub fn new(cache: Arc<TokenCache>) -> Self {
        Self { cache }
    }

    /// Set or overwrite the authorization header from the current credential.
    /// With no session the header is removed and the request goes out
    /// unauthenticated.
    pub async fn authenticate(&self, request: &mut OutboundRequest) {
        match self.cache.get().await {
            Some(credential) => {
                match HeaderValue::from_str(&format!("Bearer {}", credential.access_token)) {
                    Ok(value) => {
                        request.headers.insert(AUTHORIZATION, value);
                    }
                    Err(_) => {
                        tracing::warn!(
                            "access token is not a valid header value; sending unauthenticated"
                        );
                        request.headers.remove(AUTHORIZATION);
                    }
                }
            }
            None => {
                request.headers.remove(AUTHORIZATION);
            }
        }
    }
}
