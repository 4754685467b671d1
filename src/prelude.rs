//! Convenience re-exports for common use.

pub use crate::auth::{
    Credential, CredentialStore, FileCredentialStore, MemoryCredentialStore, TokenCache,
};
pub use crate::config::GatewayConfig;
pub use crate::gateway::{
    Ack, EndpointGateway, Medication, MedicationList, Reminder, ReminderList, SaveRecordRequest,
    SavedRecord, Session, SignInRequest,
};
pub use crate::outcome::{Cancelled, ErrorDetail, FailureKind, Outcome};
pub use crate::transport::{HttpTransport, OutboundRequest, RawResponse, Transport};
pub use tokio_util::sync::CancellationToken;
