use serde::{Deserialize, Serialize};

/// Third-party identity token exchange request.
///
/// Sent to the external-auth endpoint to trade an identity provider's token
/// for a first-party credential pair. Exempt from bearer injection and from
/// the 401 interception path, like login itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalLoginRequest {
    /// Identity provider name (e.g. "azure-ad", "google")
    pub provider: String,
    /// The provider-issued identity token to exchange
    pub id_token: String,
}
