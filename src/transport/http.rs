use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

use super::{HttpResponse, HttpTransport, RequestOptions};
use crate::error::{AuthError, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default [`HttpTransport`] built on a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|err| AuthError::Configuration(format!("HTTP client: {err}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client, keeping its configuration.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse> {
        debug!(%method, url, "sending request");
        let mut builder = self.client.request(method, url);
        // Explicit headers go first so `form` does not add a second content type.
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !options.form_params.is_empty() {
            builder = builder.form(&options.form_params);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await?;
        debug!(status, url, "received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
