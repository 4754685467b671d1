//! Request pipeline stages: authentication and the unauthorized-retry wrapper.

pub mod authenticator;
pub mod retry;

pub use authenticator::RequestAuthenticator;
pub use retry::{is_auth_failure, UnauthorizedRetryPolicy};
