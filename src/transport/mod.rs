//! HTTP transport contract and its reqwest-backed default.

pub mod http;

pub use http::ReqwestTransport;
pub use reqwest::Method;

use async_trait::async_trait;

use crate::error::Result;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Headers and form fields for a single request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    /// Sent form-encoded when non-empty.
    pub form_params: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn form_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form_params.push((name.into(), value.into()));
        self
    }
}

/// Raw response as seen by the transport. Non-success statuses are not errors here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Issues HTTP requests on behalf of the authenticator.
///
/// Timeouts, TLS and redirects are the implementation's concern.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: "{}".to_string(),
        };
        assert!(response.is_success());
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("accept"), None);
    }

    #[test]
    fn options_builder_accumulates() {
        let options = RequestOptions::new()
            .header("content-type", FORM_CONTENT_TYPE)
            .form_param("token", "abc")
            .form_param("extra", "1");
        assert_eq!(options.headers.len(), 1);
        assert_eq!(
            options.form_params,
            vec![
                ("token".to_string(), "abc".to_string()),
                ("extra".to_string(), "1".to_string())
            ]
        );
    }
}
