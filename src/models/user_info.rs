use serde::{Deserialize, Serialize};

/// Basic user information returned with a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// Server-side user identifier
    pub id: String,
    /// Login name
    pub username: String,
    /// Display name, when set
    #[serde(default)]
    pub display_name: Option<String>,
}
