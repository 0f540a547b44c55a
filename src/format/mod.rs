//! Response body codecs.

use serde_json::Value;

use crate::error::{AuthError, Result};
use crate::transport::HttpResponse;

/// Decodes response bodies for one MIME type.
pub trait Formatter: Send + Sync {
    fn mime_type(&self) -> &'static str;

    /// `Accept` and `Content-Type` headers for requests using this format.
    fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("Accept".to_string(), self.mime_type().to_string()),
            ("Content-Type".to_string(), self.mime_type().to_string()),
        ]
    }

    fn decode_response(&self, response: &HttpResponse) -> Result<Value>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn decode_response(&self, response: &HttpResponse) -> Result<Value> {
        serde_json::from_str(&response.body).map_err(|err| {
            AuthError::InvalidResponse(format!(
                "expected JSON body (status {}): {err}",
                response.status
            ))
        })
    }
}
