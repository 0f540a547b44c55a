//! Token lifecycle orchestration: credential merge, cached-token reuse,
//! grant execution, revocation.

use std::sync::Arc;

use bon::bon;
use secrecy::ExposeSecret;
use tracing::{debug, info, warn};

use super::credentials::{CredentialKey, Credentials};
use super::discovery::{Discovery, HttpDiscovery};
use super::grant::{self, response_error, Grant, GrantExecutor};
use super::token::AuthToken;
use crate::config::Settings;
use crate::error::{AuthError, Result};
use crate::format::{Formatter, JsonFormatter};
use crate::repository::{
    InstanceUrlRepository, Repositories, ResourceRepository, StateRepository, TokenRepository,
    VersionRepository,
};
use crate::transport::{
    HttpResponse, HttpTransport, Method, ReqwestTransport, RequestOptions, FORM_CONTENT_TYPE,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Called synchronously with every newly issued token.
pub type RefreshHook = Arc<dyn Fn(&AuthToken) -> std::result::Result<(), BoxError> + Send + Sync>;

/// Wrap a closure as a [`RefreshHook`].
pub fn refresh_hook<F>(hook: F) -> RefreshHook
where
    F: Fn(&AuthToken) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
{
    Arc::new(hook)
}

/// Authentication manager for one credential set.
///
/// Owns the credential store; repositories, transport and discovery are
/// injected collaborators. Nothing here locks: callers sharing one instance
/// across tasks must serialize access themselves.
///
/// # Example
/// ```no_run
/// use sfauth::auth::{Authenticator, Credentials};
/// use sfauth::config::Settings;
///
/// # async fn run() -> sfauth::error::Result<()> {
/// let mut auth = Authenticator::builder()
///     .settings(Settings::from_env())
///     .build()?;
/// let is_new = auth
///     .authenticate(
///         &Credentials::builder()
///             .consumer_key("key")
///             .consumer_secret("secret")
///             .username("user@example.com")
///             .password("password")
///             .build(),
///     )
///     .await?;
/// println!("fresh token: {is_new}");
/// # Ok(())
/// # }
/// ```
pub struct Authenticator {
    credentials: Credentials,
    settings: Settings,
    repositories: Repositories,
    transport: Arc<dyn HttpTransport>,
    formatter: Arc<dyn Formatter>,
    grants: GrantExecutor,
    pub(super) discovery: Arc<dyn Discovery>,
    on_refresh: Option<RefreshHook>,
}

#[bon]
impl Authenticator {
    /// Unset collaborators fall back to: repositories from
    /// [`Settings::repositories`], a reqwest transport, the JSON formatter and
    /// HTTP discovery.
    #[builder]
    pub fn new(
        #[builder(default)] settings: Settings,
        repositories: Option<Repositories>,
        transport: Option<Arc<dyn HttpTransport>>,
        formatter: Option<Arc<dyn Formatter>>,
        discovery: Option<Arc<dyn Discovery>>,
        on_refresh: Option<RefreshHook>,
    ) -> Result<Self> {
        let transport: Arc<dyn HttpTransport> = match transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(settings.timeout())?),
        };
        let formatter: Arc<dyn Formatter> = match formatter {
            Some(formatter) => formatter,
            None => Arc::new(JsonFormatter),
        };
        let discovery: Arc<dyn Discovery> = match discovery {
            Some(discovery) => discovery,
            None => Arc::new(
                HttpDiscovery::new(transport.clone(), formatter.clone())
                    .with_instance_url(settings.instance_url.clone()),
            ),
        };
        let repositories = match repositories {
            Some(repositories) => repositories,
            None => settings.repositories(),
        };
        let mut credentials = Credentials::default();
        credentials.merge(&settings.credentials);

        Ok(Self {
            credentials,
            grants: GrantExecutor::new(transport.clone(), formatter.clone()),
            settings,
            repositories,
            transport,
            formatter,
            discovery,
            on_refresh,
        })
    }
}

impl Authenticator {
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Merge non-empty fields of `supplied` into the credential store.
    pub fn set_credentials(&mut self, supplied: &Credentials) -> &mut Self {
        self.credentials.merge(supplied);
        self
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repositories
    }

    pub fn token_repo(&self) -> &Arc<dyn TokenRepository> {
        &self.repositories.token
    }

    pub fn version_repo(&self) -> &Arc<dyn VersionRepository> {
        &self.repositories.version
    }

    pub fn resource_repo(&self) -> &Arc<dyn ResourceRepository> {
        &self.repositories.resource
    }

    pub fn state_repo(&self) -> &Arc<dyn StateRepository> {
        &self.repositories.state
    }

    pub fn instance_url_repo(&self) -> &Arc<dyn InstanceUrlRepository> {
        &self.repositories.instance_url
    }

    /// Login URL from the credentials, else from settings.
    pub fn login_url(&self) -> Result<&str> {
        self.credentials
            .get(CredentialKey::LoginUrl)
            .or_else(|| Some(self.settings.login_url.as_str()).filter(|url| !url.is_empty()))
            .ok_or(AuthError::MissingCredential(CredentialKey::LoginUrl))
    }

    /// Merge `credentials`, make sure a token is cached, then reconcile the
    /// version and resource caches.
    ///
    /// Returns `true` when a new token was obtained from the token endpoint.
    /// Merged credentials are kept even when a later step fails.
    pub async fn authenticate(&mut self, credentials: &Credentials) -> Result<bool> {
        self.set_credentials(credentials);

        let is_new = match self.static_token() {
            Some(token) => {
                debug!("storing caller-supplied access token");
                self.store_token(&token)?;
                false
            }
            None => self.check_auth_token().await?,
        };

        self.check_version().await?;
        Ok(is_new)
    }

    /// Request a token with the grant the credentials allow and cache it.
    pub async fn refresh(&self) -> Result<AuthToken> {
        let token_url = grant::token_url(self.login_url()?);
        let grant = Grant::select(&self.credentials)?;
        let token = self.grants.execute(&token_url, &grant).await?;
        self.store_token(&token)?;

        if let Some(hook) = &self.on_refresh {
            if let Err(err) = hook(&token) {
                warn!(error = %err, "refresh hook failed");
            }
        }
        Ok(token)
    }

    /// Cached token, unless `refresh` is set or nothing is cached.
    pub async fn get_auth_token(&self, refresh: bool) -> Result<AuthToken> {
        if !refresh && self.repositories.token.has()? {
            return self.repositories.token.get();
        }
        self.refresh().await
    }

    /// Revoke the cached token at the provider.
    ///
    /// The token stays cached; call [`Authenticator::flush_token`] to drop it.
    pub async fn revoke(&self) -> Result<HttpResponse> {
        let token = self.repositories.token.get()?;
        let url = grant::revoke_url(self.login_url()?);
        let options = RequestOptions::new()
            .header("content-type", FORM_CONTENT_TYPE)
            .form_param("token", token.access_token.expose_secret().as_str());

        let response = self.transport.request(Method::POST, &url, options).await?;
        if !response.is_success() {
            return Err(response_error(self.formatter.as_ref(), &response));
        }
        info!("token revoked");
        Ok(response)
    }

    pub fn flush_token(&self) -> Result<()> {
        self.repositories.token.flush()
    }

    fn static_token(&self) -> Option<AuthToken> {
        let access_token = self.credentials.secret(CredentialKey::AccessToken)?;
        Some(AuthToken::from_secret(
            access_token.clone(),
            self.credentials
                .get(CredentialKey::InstanceUrl)
                .map(str::to_string),
            self.credentials
                .get(CredentialKey::TokenType)
                .map(str::to_string),
        ))
    }

    async fn check_auth_token(&self) -> Result<bool> {
        if self.repositories.token.has()? {
            debug!("reusing cached token");
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }

    fn store_token(&self, token: &AuthToken) -> Result<()> {
        self.repositories.token.put(token)?;
        if let Some(url) = token.instance_url.as_deref().filter(|url| !url.is_empty()) {
            self.repositories.instance_url.put(url)?;
        }
        Ok(())
    }
}
