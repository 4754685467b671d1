//! Uniform success/error envelope returned by every gateway operation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fallback shown to the user when a failure carries no backend message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// A single backend-supplied error message, flattened out of whatever
/// nesting and casing the endpoint used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Classifies why an operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No response was obtained: connectivity failure or timeout.
    Network,
    /// Authorization failure that persisted after the single retry.
    Auth,
    /// Non-2xx response unrelated to authorization.
    Server(u16),
    /// The response body could not be mapped to the expected schema.
    Deserialization,
    /// A well-formed response explicitly reported failure with messages.
    Validation,
}

/// Result envelope for a gateway operation.
///
/// Invariants are enforced by the constructors: a successful outcome always
/// has a payload and no errors; a failed outcome always has a
/// [`FailureKind`] and never a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    payload: Option<T>,
    errors: Vec<ErrorDetail>,
    failure: Option<FailureKind>,
}

impl<T> Outcome<T> {
    pub fn success(payload: T) -> Self {
        Self {
            payload: Some(payload),
            errors: Vec::new(),
            failure: None,
        }
    }

    pub fn failure(kind: FailureKind, errors: Vec<ErrorDetail>) -> Self {
        Self {
            payload: None,
            errors,
            failure: Some(kind),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn into_payload(self) -> Option<T> {
        self.payload
    }

    pub fn errors(&self) -> &[ErrorDetail] {
        &self.errors
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure
    }

    /// The message callers surface to the user: the first backend message,
    /// or a generic fallback when the list is empty.
    pub fn first_message(&self) -> &str {
        self.errors
            .first()
            .map(|detail| detail.message.as_str())
            .unwrap_or(GENERIC_FAILURE_MESSAGE)
    }

    /// Map the payload type, preserving errors and classification.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            payload: self.payload.map(f),
            errors: self.errors,
            failure: self.failure,
        }
    }
}

/// Terminal marker for a cancelled call.
///
/// Cancellation is a distinct outcome, not part of [`FailureKind`]: gateway
/// operations return `Result<Outcome<T>, Cancelled>` so a cancelled call can
/// never be mistaken for a success or a typed error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("operation cancelled")
    }
}

impl std::error::Error for Cancelled {}
