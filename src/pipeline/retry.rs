use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::auth::TokenCache;
use crate::error::TransportError;
use crate::transport::{OutboundRequest, RawResponse, Transport};

use super::authenticator::RequestAuthenticator;

/// The backend signals credential staleness with 401 exactly. 403 means the
/// session is valid but the action is forbidden, so retrying cannot help.
const AUTH_FAILURE_STATUS: u16 = 401;

pub fn is_auth_failure(status: u16) -> bool {
    status == AUTH_FAILURE_STATUS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    First,
    Retried,
}

/// Wraps authenticate-then-send with a single coordinated retry on an
/// authorization failure.
///
/// On 401 at the first attempt the cached credential is invalidated, the same
/// request is re-authenticated and resent once. A 401 on the retry, and any
/// non-authorization failure at any point, passes through untouched.
pub struct UnauthorizedRetryPolicy {
    cache: Arc<TokenCache>,
}

impl UnauthorizedRetryPolicy {
    pub fn new(cache: Arc<TokenCache>) -> Self {
        Self { cache }
    }

    pub async fn run(
        &self,
        transport: &dyn Transport,
        authenticator: &RequestAuthenticator,
        request: &mut OutboundRequest,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, TransportError> {
        let mut attempt = Attempt::First;
        loop {
            authenticator.authenticate(request).await;
            let response = transport.send(request, cancel).await?;
            if is_auth_failure(response.status) && attempt == Attempt::First {
                tracing::debug!(
                    path = %request.path,
                    "authorization rejected; refreshing credential and retrying once"
                );
                self.cache.invalidate().await;
                attempt = Attempt::Retried;
                continue;
            }
            return Ok(response);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Credential, CredentialStore, MemoryCredentialStore, ACCESS_TOKEN_KEY};
    use async_trait::async_trait;
    use reqwest::header::AUTHORIZATION;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Transport fake that pops scripted statuses and records the
    /// authorization header of every request it sees.
    struct ScriptedTransport {
        statuses: Mutex<VecDeque<u16>>,
        seen_auth: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedTransport {
        fn new(statuses: &[u16]) -> Self {
            Self {
                statuses: Mutex::new(statuses.iter().copied().collect()),
                seen_auth: Mutex::new(Vec::new()),
            }
        }

        fn request_count(&self) -> usize {
            self.seen_auth.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(
            &self,
            request: &OutboundRequest,
            _cancel: &CancellationToken,
        ) -> Result<RawResponse, TransportError> {
            let auth = request
                .headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            self.seen_auth.lock().unwrap().push(auth);
            let status = self
                .statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(200);
            Ok(RawResponse {
                status,
                body: Vec::new(),
            })
        }
    }

    struct Harness {
        store: Arc<MemoryCredentialStore>,
        cache: Arc<TokenCache>,
        authenticator: RequestAuthenticator,
        policy: UnauthorizedRetryPolicy,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryCredentialStore::new());
        let cache = Arc::new(TokenCache::new(store.clone(), Duration::from_secs(300)));
        Harness {
            store,
            authenticator: RequestAuthenticator::new(cache.clone()),
            policy: UnauthorizedRetryPolicy::new(cache.clone()),
            cache,
        }
    }

    #[tokio::test]
    async fn auth_failure_is_retried_exactly_once() {
        let h = harness();
        h.store.set(ACCESS_TOKEN_KEY, "stored").unwrap();
        let transport = ScriptedTransport::new(&[401, 200]);
        let cancel = CancellationToken::new();

        let mut request = OutboundRequest::get("api/recordatorios");
        let response = h
            .policy
            .run(&transport, &h.authenticator, &mut request, &cancel)
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn second_auth_failure_terminates_without_third_attempt() {
        let h = harness();
        let transport = ScriptedTransport::new(&[401, 401, 200]);
        let cancel = CancellationToken::new();

        let mut request = OutboundRequest::get("api/recordatorios");
        let response = h
            .policy
            .run(&transport, &h.authenticator, &mut request, &cancel)
            .await
            .unwrap();

        assert_eq!(response.status, 401);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn non_auth_failure_is_never_retried() {
        for status in [400, 403, 404, 500, 503] {
            let h = harness();
            let transport = ScriptedTransport::new(&[status]);
            let cancel = CancellationToken::new();

            let mut request = OutboundRequest::get("api/recordatorios");
            let response = h
                .policy
                .run(&transport, &h.authenticator, &mut request, &cancel)
                .await
                .unwrap();

            assert_eq!(response.status, status);
            assert_eq!(transport.request_count(), 1);
        }
    }

    #[tokio::test]
    async fn retry_reauthenticates_with_reloaded_credential() {
        let h = harness();
        // cache primed with a stale token; the store already holds the fresh one
        h.cache.prime(Credential::new("stale", None)).await;
        h.store.set(ACCESS_TOKEN_KEY, "fresh").unwrap();
        let transport = ScriptedTransport::new(&[401, 200]);
        let cancel = CancellationToken::new();

        let mut request = OutboundRequest::get("api/recordatorios");
        h.policy
            .run(&transport, &h.authenticator, &mut request, &cancel)
            .await
            .unwrap();

        let seen = transport.seen_auth.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                Some("Bearer stale".to_string()),
                Some("Bearer fresh".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn transport_error_passes_through() {
        struct FailingTransport;

        #[async_trait]
        impl Transport for FailingTransport {
            async fn send(
                &self,
                _request: &OutboundRequest,
                _cancel: &CancellationToken,
            ) -> Result<RawResponse, TransportError> {
                Err(TransportError::Timeout(100))
            }
        }

        let h = harness();
        let cancel = CancellationToken::new();
        let mut request = OutboundRequest::get("api/recordatorios");
        let result = h
            .policy
            .run(&FailingTransport, &h.authenticator, &mut request, &cancel)
            .await;
        assert!(matches!(result, Err(TransportError::Timeout(100))));
    }
}
