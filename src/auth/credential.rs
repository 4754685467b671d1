use serde::{Deserialize, Serialize};

/// Bearer credential for the backend session.
///
/// Created on successful sign-in, owned by the token cache once loaded;
/// the credential store remains the durable source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }
}
