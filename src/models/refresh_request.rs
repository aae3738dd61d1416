use serde::{Deserialize, Serialize};

use crate::credentials::Credential;

/// Refresh request body: the current pair is exchanged for a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// The (expired) access token being exchanged
    pub access_token: String,
    /// The refresh token authorizing the exchange
    pub refresh_token: String,
}

impl From<&Credential> for RefreshRequest {
    fn from(credential: &Credential) -> Self {
        Self {
            access_token: credential.access_token.clone(),
            refresh_token: credential.refresh_token.clone(),
        }
    }
}
