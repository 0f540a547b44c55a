//! Out-of-band lookups of the provider's API versions and resources.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::credentials::CredentialKey;
use super::grant::{provider_error, response_error};
use super::token::AuthToken;
use crate::error::{AuthError, Result};
use crate::format::Formatter;
use crate::repository::{ResourceMap, VersionRecord};
use crate::transport::{HttpTransport, Method, RequestOptions};

const VERSIONS_PATH: &str = "/services/data";

/// Source of version listings and resource maps.
#[async_trait]
pub trait Discovery: Send + Sync {
    async fn versions(&self, token: &AuthToken) -> Result<Vec<VersionRecord>>;

    async fn resources(&self, token: &AuthToken, version: &VersionRecord) -> Result<ResourceMap>;
}

/// [`Discovery`] against the instance's REST endpoints.
pub struct HttpDiscovery {
    transport: Arc<dyn HttpTransport>,
    formatter: Arc<dyn Formatter>,
    instance_url: Option<String>,
}

impl HttpDiscovery {
    pub fn new(transport: Arc<dyn HttpTransport>, formatter: Arc<dyn Formatter>) -> Self {
        Self {
            transport,
            formatter,
            instance_url: None,
        }
    }

    /// Use `url` instead of the token's `instance_url`.
    pub fn with_instance_url(mut self, url: Option<String>) -> Self {
        self.instance_url = url.filter(|url| !url.is_empty());
        self
    }

    fn base_url<'a>(&'a self, token: &'a AuthToken) -> Result<&'a str> {
        self.instance_url
            .as_deref()
            .or(token.instance_url.as_deref())
            .filter(|url| !url.is_empty())
            .map(|url| url.trim_end_matches('/'))
            .ok_or(AuthError::MissingCredential(CredentialKey::InstanceUrl))
    }

    async fn get_json(&self, url: &str, token: &AuthToken) -> Result<serde_json::Value> {
        let options = RequestOptions::new()
            .headers(self.formatter.headers())
            .header("Authorization", token.authorization_header());
        let response = self.transport.request(Method::GET, url, options).await?;
        if !response.is_success() {
            return Err(response_error(self.formatter.as_ref(), &response));
        }
        let decoded = self.formatter.decode_response(&response)?;
        match provider_error(&decoded) {
            Some(err) => Err(err),
            None => Ok(decoded),
        }
    }
}

#[async_trait]
impl Discovery for HttpDiscovery {
    async fn versions(&self, token: &AuthToken) -> Result<Vec<VersionRecord>> {
        let url = format!("{}{VERSIONS_PATH}", self.base_url(token)?);
        debug!(url = %url, "listing API versions");
        let decoded = self.get_json(&url, token).await?;
        serde_json::from_value(decoded)
            .map_err(|err| AuthError::InvalidResponse(format!("version listing: {err}")))
    }

    async fn resources(&self, token: &AuthToken, version: &VersionRecord) -> Result<ResourceMap> {
        let url = format!("{}{}", self.base_url(token)?, version.url);
        debug!(url = %url, version = %version.version, "listing API resources");
        let decoded = self.get_json(&url, token).await?;
        serde_json::from_value(decoded)
            .map_err(|err| AuthError::InvalidResponse(format!("resource listing: {err}")))
    }
}
