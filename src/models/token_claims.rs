use serde::{Deserialize, Deserializer};

/// Claims the client reads out of the access token payload.
///
/// Only the fields the dashboard needs for gating are modeled; everything
/// else in the token is ignored. The signature is not verified client-side;
/// the server remains the authority on every request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenClaims {
    /// Subject (user identifier)
    #[serde(default)]
    pub sub: Option<String>,

    /// Roles granted to the subject; accepts a single string or an array
    #[serde(default, alias = "role", deserialize_with = "string_or_seq")]
    pub roles: Vec<String>,

    /// Fine-grained permissions; accepts a single string or an array
    #[serde(default, alias = "permission", deserialize_with = "string_or_seq")]
    pub permissions: Vec<String>,
}

/// Some issuers emit a bare string when only one value is granted.
fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrSeq {
        One(String),
        Many(Vec<String>),
    }

    Ok(match StringOrSeq::deserialize(deserializer)? {
        StringOrSeq::One(value) => vec![value],
        StringOrSeq::Many(values) => values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_array_form() {
        let claims: TokenClaims =
            serde_json::from_str(r#"{"sub":"u1","roles":["Admin","HR"],"permissions":["files.read"]}"#)
                .unwrap();
        assert_eq!(claims.sub.as_deref(), Some("u1"));
        assert_eq!(claims.roles, vec!["Admin", "HR"]);
        assert_eq!(claims.permissions, vec!["files.read"]);
    }

    #[test]
    fn test_claims_single_string_form() {
        let claims: TokenClaims =
            serde_json::from_str(r#"{"role":"Admin","permission":"files.read"}"#).unwrap();
        assert_eq!(claims.roles, vec!["Admin"]);
        assert_eq!(claims.permissions, vec!["files.read"]);
    }

    #[test]
    fn test_claims_missing_fields_default_empty() {
        let claims: TokenClaims = serde_json::from_str(r#"{"sub":"u2"}"#).unwrap();
        assert!(claims.roles.is_empty());
        assert!(claims.permissions.is_empty());
    }
}
