//! The façade consumed by the rest of the application.
//!
//! One typed async operation per backend endpoint; every expected failure
//! mode resolves into the returned [`Outcome`], never an exception path.
//! Session state is mutated in exactly two places: the sign-in success hook
//! and the drop-session hook (sign-out success or unrecoverable
//! authorization failure).

pub mod operations;

pub use operations::{
    Ack, Medication, MedicationList, Reminder, ReminderList, SaveRecordRequest, SavedRecord,
    Session, SignInRequest,
};

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::auth::{clear_credential, write_credential, Credential, CredentialStore, TokenCache};
use crate::config::GatewayConfig;
use crate::error::TransportError;
use crate::normalize::{self, Schema};
use crate::outcome::{Cancelled, ErrorDetail, FailureKind, Outcome};
use crate::pipeline::{is_auth_failure, RequestAuthenticator, UnauthorizedRetryPolicy};
use crate::transport::{HttpTransport, OutboundRequest, Transport};

use operations::*;

/// Dependency-injected gateway with an explicit lifetime; tests supply fake
/// stores and transports through the constructor.
pub struct EndpointGateway {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    cache: Arc<TokenCache>,
    authenticator: RequestAuthenticator,
    retry: UnauthorizedRetryPolicy,
}

impl EndpointGateway {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        token_ttl: Duration,
    ) -> Self {
        let cache = Arc::new(TokenCache::new(store.clone(), token_ttl));
        Self {
            authenticator: RequestAuthenticator::new(cache.clone()),
            retry: UnauthorizedRetryPolicy::new(cache.clone()),
            transport,
            store,
            cache,
        }
    }

    /// Build a gateway over the HTTP transport described by `config`.
    pub fn from_config(config: &GatewayConfig, store: Arc<dyn CredentialStore>) -> Self {
        let transport = Arc::new(HttpTransport::new(
            config.base_url.clone(),
            config.request_timeout,
        ));
        Self::new(transport, store, config.token_ttl)
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Authenticate against the backend. On success the credential is
    /// persisted and the token cache primed.
    pub async fn sign_in(
        &self,
        request: &SignInRequest,
        cancel: &CancellationToken,
    ) -> Result<Outcome<Session>, Cancelled> {
        let outbound = OutboundRequest::post(SIGN_IN_PATH, encode(request));
        let outcome = self.call::<Session>(outbound, &SESSION_SCHEMA, cancel).await?;
        if let Some(session) = outcome.payload() {
            let credential =
                Credential::new(session.token.clone(), session.refresh_token.clone());
            if let Err(err) = write_credential(self.store.as_ref(), &credential) {
                tracing::warn!(error = %err, "failed to persist credential after sign-in");
            }
            self.cache.prime(credential).await;
            tracing::debug!(user_id = session.user_id, "session established");
        }
        Ok(outcome)
    }

    /// End the session. On success both the token cache and the credential
    /// store are cleared.
    pub async fn sign_out(&self, cancel: &CancellationToken) -> Result<Outcome<Ack>, Cancelled> {
        let outbound = OutboundRequest::post(SIGN_OUT_PATH, serde_json::json!({}));
        let outcome = self.call::<Ack>(outbound, &ACK_SCHEMA, cancel).await?;
        if outcome.is_success() {
            self.drop_session().await;
        }
        Ok(outcome)
    }

    pub async fn list_reminders(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Outcome<ReminderList>, Cancelled> {
        self.call(
            OutboundRequest::get(REMINDERS_PATH),
            &REMINDER_LIST_SCHEMA,
            cancel,
        )
        .await
    }

    pub async fn list_medications(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Outcome<MedicationList>, Cancelled> {
        self.call(
            OutboundRequest::get(MEDICATIONS_PATH),
            &MEDICATION_LIST_SCHEMA,
            cancel,
        )
        .await
    }

    pub async fn save_record(
        &self,
        request: &SaveRecordRequest,
        cancel: &CancellationToken,
    ) -> Result<Outcome<SavedRecord>, Cancelled> {
        self.call(
            OutboundRequest::post(RECORDS_PATH, encode(request)),
            &SAVED_RECORD_SCHEMA,
            cancel,
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn call<T: DeserializeOwned>(
        &self,
        mut request: OutboundRequest,
        schema: &Schema,
        cancel: &CancellationToken,
    ) -> Result<Outcome<T>, Cancelled> {
        let response = match self
            .retry
            .run(
                self.transport.as_ref(),
                &self.authenticator,
                &mut request,
                cancel,
            )
            .await
        {
            Ok(response) => response,
            Err(TransportError::Cancelled) => return Err(Cancelled),
            Err(err) => {
                tracing::debug!(path = %request.path, error = %err, "transport failure");
                return Ok(Outcome::failure(
                    FailureKind::Network,
                    vec![ErrorDetail::new(err.to_string())],
                ));
            }
        };

        if is_auth_failure(response.status) {
            // the single retry already happened; the session can no longer
            // be trusted
            tracing::debug!(path = %request.path, "authorization failure persisted after retry");
            self.drop_session().await;
            return Ok(Outcome::failure(
                FailureKind::Auth,
                body_error_details(&response.body),
            ));
        }

        if !response.is_success() {
            return Ok(Outcome::failure(
                FailureKind::Server(response.status),
                body_error_details(&response.body),
            ));
        }

        Ok(normalize::normalize(&response.body, schema))
    }

    async fn drop_session(&self) {
        if let Err(err) = clear_credential(self.store.as_ref()) {
            tracing::warn!(error = %err, "failed to clear stored credential");
        }
        self.cache.invalidate().await;
    }
}

/// Serialize a typed request body. Our request types always serialize;
/// a failure here is a programming error and is allowed to surface as one.
fn encode<B: Serialize>(body: &B) -> serde_json::Value {
    serde_json::to_value(body).expect("request body serializes to JSON")
}

/// Best-effort message extraction from a failing response body.
fn body_error_details(body: &[u8]) -> Vec<ErrorDetail> {
    serde_json::from_slice::<serde_json::Value>(body)
        .map(|value| normalize::extract_error_details(&value))
        .unwrap_or_default()
}
