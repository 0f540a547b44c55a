use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Token payload returned by the provider's token endpoint.
///
/// Fields the provider adds beyond the known ones are kept in `extra` and
/// written back unchanged when the token is stored. The access and refresh
/// tokens are redacted from `Debug` output.
///
/// # Example
/// ```
/// use sfauth::auth::AuthToken;
///
/// let token = AuthToken::new("00Dxx!token", Some("https://na1.salesforce.com".to_string()), None);
/// assert_eq!(token.token_type, "Bearer");
/// assert_eq!(token.authorization_header(), "Bearer 00Dxx!token");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    #[serde(with = "super::secret")]
    pub access_token: SecretString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_url: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(
        default,
        with = "super::secret::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub refresh_token: Option<SecretString>,
    /// Identity URL of the authenticated user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Milliseconds since the epoch, as a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthToken {
    /// Token built from a caller-supplied access token.
    pub fn new(
        access_token: impl Into<String>,
        instance_url: Option<String>,
        token_type: Option<String>,
    ) -> Self {
        Self::from_secret(
            SecretString::new(access_token.into()),
            instance_url,
            token_type,
        )
    }

    pub fn from_secret(
        access_token: SecretString,
        instance_url: Option<String>,
        token_type: Option<String>,
    ) -> Self {
        Self {
            access_token,
            instance_url,
            token_type: token_type
                .filter(|value| !value.is_empty())
                .unwrap_or_else(default_token_type),
            refresh_token: None,
            id: None,
            issued_at: None,
            signature: None,
            scope: None,
            extra: Map::new(),
        }
    }

    /// Value for an `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token.expose_secret())
    }

    pub fn issued_at_time(&self) -> Option<DateTime<Utc>> {
        let millis: i64 = self.issued_at.as_deref()?.trim().parse().ok()?;
        DateTime::<Utc>::from_timestamp_millis(millis)
    }
}

fn default_token_type() -> String {
    DEFAULT_TOKEN_TYPE.to_string()
}
