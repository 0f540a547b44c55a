#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use sfauth::auth::{AuthToken, Authenticator, Credentials, Discovery, RefreshHook};
use sfauth::config::{ResourcePolicy, Settings};
use sfauth::error::Result;
use sfauth::repository::{Repositories, ResourceMap, VersionRecord};
use sfauth::transport::ReqwestTransport;
use wiremock::{MockServer, Request};

/// Discovery fake that counts calls and serves fixed listings.
pub struct CountingDiscovery {
    versions: Vec<VersionRecord>,
    resources: ResourceMap,
    version_calls: AtomicUsize,
    resource_calls: AtomicUsize,
}

impl CountingDiscovery {
    pub fn new(versions: &[&str]) -> Self {
        let resources = [
            ("sobjects", "/services/data/v59.0/sobjects"),
            ("query", "/services/data/v59.0/query"),
        ]
        .into_iter()
        .map(|(name, url)| (name.to_string(), url.to_string()))
        .collect();
        Self {
            versions: versions.iter().map(|v| version(v)).collect(),
            resources,
            version_calls: AtomicUsize::new(0),
            resource_calls: AtomicUsize::new(0),
        }
    }

    pub fn version_calls(&self) -> usize {
        self.version_calls.load(Ordering::SeqCst)
    }

    pub fn resource_calls(&self) -> usize {
        self.resource_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Discovery for CountingDiscovery {
    async fn versions(&self, _token: &AuthToken) -> Result<Vec<VersionRecord>> {
        self.version_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.versions.clone())
    }

    async fn resources(&self, _token: &AuthToken, _version: &VersionRecord) -> Result<ResourceMap> {
        self.resource_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.resources.clone())
    }
}

pub fn version(version: &str) -> VersionRecord {
    VersionRecord {
        label: format!("v{version}"),
        url: format!("/services/data/v{version}"),
        version: version.to_string(),
    }
}

pub fn settings(server: &MockServer, version: &str, policy: ResourcePolicy) -> Settings {
    Settings {
        version: version.to_string(),
        login_url: server.uri(),
        resource_policy: policy,
        ..Settings::default()
    }
}

pub fn password_credentials() -> Credentials {
    Credentials::builder()
        .consumer_key("K")
        .consumer_secret("S")
        .username("u@x.com")
        .password("p")
        .build()
}

pub fn token_response(server: &MockServer, access_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "instance_url": server.uri(),
        "id": "https://login.salesforce.com/id/00Dxx/005xx",
        "token_type": "Bearer",
        "issued_at": "1700000000000",
        "signature": "c2lnbmF0dXJl"
    })
}

pub fn build_authenticator(
    settings: Settings,
    repositories: Repositories,
    discovery: Arc<dyn Discovery>,
    on_refresh: Option<RefreshHook>,
) -> Authenticator {
    let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(5)).expect("transport"));
    Authenticator::builder()
        .settings(settings)
        .repositories(repositories)
        .transport(transport)
        .discovery(discovery)
        .maybe_on_refresh(on_refresh)
        .build()
        .expect("authenticator")
}

/// Raw request body as text, for asserting on what a form did not carry.
pub fn request_body(request: &Request) -> String {
    String::from_utf8_lossy(&request.body).into_owned()
}
