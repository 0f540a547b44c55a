mod auth_support;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use sfauth::auth::{AuthToken, Authenticator, Credentials, VersionCheck};
use sfauth::config::ResourcePolicy;
use sfauth::repository::{Repositories, ResourceMap};
use sfauth::transport::ReqwestTransport;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_support::{build_authenticator, settings, version, CountingDiscovery};

fn seeded(token: bool, cached_version: Option<&str>, resources: bool) -> Repositories {
    let repos = Repositories::in_memory();
    if token {
        repos
            .token
            .put(&AuthToken::new("cached", Some("https://na1.salesforce.com".to_string()), None))
            .unwrap();
    }
    if let Some(cached) = cached_version {
        repos.version.put(&version(cached)).unwrap();
    }
    if resources {
        let mut map = ResourceMap::new();
        map.insert("sobjects".to_string(), "/services/data/v58.0/sobjects".to_string());
        repos.resource.put(&map).unwrap();
    }
    repos
}

#[tokio::test]
async fn current_version_and_resources_make_no_calls() {
    let server = MockServer::start().await;
    let discovery = Arc::new(CountingDiscovery::new(&["58.0", "59.0"]));
    let auth = build_authenticator(
        settings(&server, "58.0", ResourcePolicy::Relaxed),
        seeded(true, Some("58.0"), true),
        discovery.clone(),
        None,
    );

    let check = auth.check_version().await.unwrap();
    assert!(check.is_noop());
    assert_eq!(discovery.version_calls(), 0);
    assert_eq!(discovery.resource_calls(), 0);
}

#[tokio::test]
async fn absent_version_restores_version_and_resources() {
    let server = MockServer::start().await;
    let discovery = Arc::new(CountingDiscovery::new(&["58.0", "59.0"]));
    let auth = build_authenticator(
        settings(&server, "", ResourcePolicy::Strict),
        seeded(true, None, true),
        discovery.clone(),
        None,
    );

    let check = auth.check_version().await.unwrap();
    assert_eq!(
        check,
        VersionCheck {
            version_refreshed: true,
            resources_refreshed: true
        }
    );
    assert_eq!(auth.version_repo().get().unwrap().version, "59.0");
    assert_eq!(discovery.resource_calls(), 1);
}

#[tokio::test]
async fn configured_version_mismatch_refreshes_both() {
    let server = MockServer::start().await;
    let discovery = Arc::new(CountingDiscovery::new(&["58.0", "59.0", "60.0"]));
    let auth = build_authenticator(
        settings(&server, "59.0", ResourcePolicy::Strict),
        seeded(true, Some("58.0"), true),
        discovery.clone(),
        None,
    );

    let check = auth.check_version().await.unwrap();
    assert!(check.version_refreshed);
    assert!(check.resources_refreshed);
    assert_eq!(auth.version_repo().get().unwrap().version, "59.0");
}

#[tokio::test]
async fn unoffered_configured_version_falls_back_to_latest() {
    let server = MockServer::start().await;
    let discovery = Arc::new(CountingDiscovery::new(&["58.0", "60.0", "9.0"]));
    let auth = build_authenticator(
        settings(&server, "99.0", ResourcePolicy::Relaxed),
        seeded(true, None, false),
        discovery,
        None,
    );

    auth.check_version().await.unwrap();
    assert_eq!(auth.version_repo().get().unwrap().version, "60.0");
}

#[tokio::test]
async fn strict_policy_leaves_missing_resources_alone() {
    let server = MockServer::start().await;
    let discovery = Arc::new(CountingDiscovery::new(&["58.0"]));
    let auth = build_authenticator(
        settings(&server, "58.0", ResourcePolicy::Strict),
        seeded(true, Some("58.0"), false),
        discovery.clone(),
        None,
    );

    let check = auth.check_version().await.unwrap();
    assert!(check.is_noop());
    assert!(!auth.resource_repo().has().unwrap());
    assert_eq!(discovery.resource_calls(), 0);
}

#[tokio::test]
async fn relaxed_policy_restores_missing_resources_only() {
    let server = MockServer::start().await;
    let discovery = Arc::new(CountingDiscovery::new(&["58.0"]));
    let auth = build_authenticator(
        settings(&server, "58.0", ResourcePolicy::Relaxed),
        seeded(true, Some("58.0"), false),
        discovery.clone(),
        None,
    );

    let check = auth.check_version().await.unwrap();
    assert_eq!(
        check,
        VersionCheck {
            version_refreshed: false,
            resources_refreshed: true
        }
    );
    assert_eq!(discovery.version_calls(), 0);
    assert_eq!(auth.resource_repo().get().unwrap().len(), 2);
}

#[tokio::test]
async fn version_refresh_without_token_fails() {
    let server = MockServer::start().await;
    let auth = build_authenticator(
        settings(&server, "", ResourcePolicy::Relaxed),
        seeded(false, None, false),
        Arc::new(CountingDiscovery::new(&["58.0"])),
        None,
    );

    assert!(auth.check_version().await.is_err());
}

#[tokio::test]
async fn http_discovery_reads_instance_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "live",
            "instance_url": server.uri(),
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/data"))
        .and(header("authorization", "Bearer live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"label": "Summer '23", "url": "/services/data/v58.0", "version": "58.0"},
            {"label": "Winter '24", "url": "/services/data/v59.0", "version": "59.0"}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/data/v59.0"))
        .and(header("authorization", "Bearer live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sobjects": "/services/data/v59.0/sobjects",
            "query": "/services/data/v59.0/query",
            "limits": "/services/data/v59.0/limits"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut auth = Authenticator::builder()
        .settings(settings(&server, "", ResourcePolicy::Relaxed))
        .repositories(Repositories::in_memory())
        .transport(Arc::new(
            ReqwestTransport::new(Duration::from_secs(5)).unwrap(),
        ))
        .build()
        .unwrap();

    let is_new = auth
        .authenticate(
            &Credentials::builder()
                .consumer_key("K")
                .consumer_secret("S")
                .username("u@x.com")
                .password("p")
                .build(),
        )
        .await
        .unwrap();

    assert!(is_new);
    let stored = auth.version_repo().get().unwrap();
    assert_eq!(stored.label, "Winter '24");
    assert_eq!(stored.url, "/services/data/v59.0");
    let resources = auth.resource_repo().get().unwrap();
    assert_eq!(resources.len(), 3);
    assert_eq!(resources["query"], "/services/data/v59.0/query");
}

#[tokio::test]
async fn http_discovery_surfaces_rest_error_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/data"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!([
            {"errorCode": "INVALID_SESSION_ID", "message": "Session expired or invalid"}
        ])))
        .mount(&server)
        .await;

    let repos = Repositories::in_memory();
    repos
        .token
        .put(&AuthToken::new("expired", Some(server.uri()), None))
        .unwrap();
    let auth = Authenticator::builder()
        .settings(settings(&server, "", ResourcePolicy::Relaxed))
        .repositories(repos)
        .transport(Arc::new(
            ReqwestTransport::new(Duration::from_secs(5)).unwrap(),
        ))
        .build()
        .unwrap();

    match auth.check_version().await {
        Err(sfauth::AuthError::Authentication { code, .. }) => {
            assert_eq!(code, "INVALID_SESSION_ID")
        }
        other => panic!("expected Authentication, got {other:?}"),
    }
}
