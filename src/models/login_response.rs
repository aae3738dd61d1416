use serde::{Deserialize, Serialize};

use super::user_info::UserInfo;
use crate::credentials::Credential;

/// Login response from the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer access token for subsequent API calls
    pub access_token: String,
    /// Refresh token for obtaining new access tokens (longer-lived)
    pub refresh_token: String,
    /// Authenticated user information, when the server includes it
    #[serde(default)]
    pub user: Option<UserInfo>,
}

impl LoginResponse {
    /// The credential pair carried by this response.
    pub fn credential(&self) -> Credential {
        Credential::new(self.access_token.clone(), self.refresh_token.clone())
    }
}
