//! Token-endpoint grants: payload construction, submission and validation.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, info};

use super::credentials::{CredentialKey, Credentials};
use super::token::AuthToken;
use crate::error::{AuthError, Result};
use crate::format::Formatter;
use crate::transport::{HttpResponse, HttpTransport, Method, RequestOptions, FORM_CONTENT_TYPE};

const TOKEN_PATH: &str = "/services/oauth2/token";
const REVOKE_PATH: &str = "/services/oauth2/revoke";

pub fn token_url(login_url: &str) -> String {
    format!("{}{TOKEN_PATH}", login_url.trim_end_matches('/'))
}

pub fn revoke_url(login_url: &str) -> String {
    format!("{}{REVOKE_PATH}", login_url.trim_end_matches('/'))
}

/// Supported grant types, chosen from which credentials are available.
#[derive(Debug, Clone)]
pub enum Grant {
    Password {
        client_id: String,
        client_secret: SecretString,
        username: String,
        password: SecretString,
    },
    /// The client secret is deliberately not sent with this grant.
    RefreshToken {
        client_id: String,
        refresh_token: SecretString,
    },
}

impl Grant {
    /// Refresh-token grant when a refresh token is known, password grant otherwise.
    pub fn select(credentials: &Credentials) -> Result<Self> {
        let client_id = credentials.require(CredentialKey::ConsumerKey)?.to_string();
        if let Some(refresh_token) = credentials.secret(CredentialKey::RefreshToken) {
            return Ok(Self::RefreshToken {
                client_id,
                refresh_token: refresh_token.clone(),
            });
        }
        Ok(Self::Password {
            client_id,
            client_secret: credentials
                .require_secret(CredentialKey::ConsumerSecret)?
                .clone(),
            username: credentials.require(CredentialKey::Username)?.to_string(),
            password: credentials.require_secret(CredentialKey::Password)?.clone(),
        })
    }

    pub fn grant_type(&self) -> &'static str {
        match self {
            Self::Password { .. } => "password",
            Self::RefreshToken { .. } => "refresh_token",
        }
    }

    /// Form body for the token endpoint, secrets included.
    pub fn form_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("grant_type".to_string(), self.grant_type().to_string())];
        match self {
            Self::Password {
                client_id,
                client_secret,
                username,
                password,
            } => {
                params.push(("client_id".to_string(), client_id.clone()));
                params.push((
                    "client_secret".to_string(),
                    client_secret.expose_secret().clone(),
                ));
                params.push(("username".to_string(), username.clone()));
                params.push(("password".to_string(), password.expose_secret().clone()));
            }
            Self::RefreshToken {
                client_id,
                refresh_token,
            } => {
                params.push(("client_id".to_string(), client_id.clone()));
                params.push((
                    "refresh_token".to_string(),
                    refresh_token.expose_secret().clone(),
                ));
            }
        }
        params
    }
}

/// Submits grants to the token endpoint and decodes the issued token.
#[derive(Clone)]
pub struct GrantExecutor {
    transport: Arc<dyn HttpTransport>,
    formatter: Arc<dyn Formatter>,
}

impl GrantExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>, formatter: Arc<dyn Formatter>) -> Self {
        Self {
            transport,
            formatter,
        }
    }

    pub async fn execute(&self, token_url: &str, grant: &Grant) -> Result<AuthToken> {
        debug!(grant_type = grant.grant_type(), url = token_url, "requesting token");
        let mut options = RequestOptions::new()
            .header("Accept", self.formatter.mime_type())
            .header("Content-Type", FORM_CONTENT_TYPE);
        options.form_params = grant.form_params();
        let response = self
            .transport
            .request(Method::POST, token_url, options)
            .await?;

        let decoded = match self.formatter.decode_response(&response) {
            Ok(decoded) => decoded,
            Err(_) if !response.is_success() => return Err(status_error(&response)),
            Err(err) => return Err(err),
        };
        if let Some(err) = provider_error(&decoded) {
            return Err(err);
        }
        if !response.is_success() {
            return Err(status_error(&response));
        }
        if decoded.get("access_token").and_then(Value::as_str).is_none() {
            return Err(AuthError::InvalidResponse(
                "token response missing access_token".to_string(),
            ));
        }
        let token: AuthToken = serde_json::from_value(decoded)?;
        info!(
            grant_type = grant.grant_type(),
            instance_url = token.instance_url.as_deref().unwrap_or_default(),
            "token issued"
        );
        Ok(token)
    }
}

/// Authentication error carried by an error-shaped provider body, if any.
///
/// Recognizes OAuth `{"error", "error_description"}` objects and REST
/// `[{"errorCode", "message"}]` arrays.
pub fn provider_error(body: &Value) -> Option<AuthError> {
    if let Some(code) = body.get("error") {
        let code = code
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| code.to_string());
        let description = body
            .get("error_description")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Some(AuthError::authentication(code, description));
    }
    let first = body.as_array()?.first()?;
    let code = first.get("errorCode")?.as_str()?;
    let message = first
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(AuthError::authentication(code, message))
}

/// Error for a non-success response, preferring the provider's own error body.
pub(crate) fn response_error(formatter: &dyn Formatter, response: &HttpResponse) -> AuthError {
    formatter
        .decode_response(response)
        .ok()
        .and_then(|decoded| provider_error(&decoded))
        .unwrap_or_else(|| status_error(response))
}

fn status_error(response: &HttpResponse) -> AuthError {
    AuthError::Http {
        status: response.status,
        body: response.body.clone(),
    }
}
