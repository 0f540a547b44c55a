//! Configuration system (layered: defaults < TOML file < environment).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::auth::credentials::{CredentialKey, Credentials};
use crate::error::{AuthError, Result};
use crate::repository::Repositories;
use crate::storage::{default_dir, FileStorage, MemoryStorage, Storage};
use crate::transport::http::DEFAULT_TIMEOUT_SECS;

pub const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com";
pub const DEFAULT_STORAGE_PREFIX: &str = "sfauth_";

/// When the cached resource map is rediscovered.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResourcePolicy {
    /// Resources move only together with a version refresh.
    Strict,
    /// Resources are also rediscovered whenever the resource cache is empty.
    #[default]
    Relaxed,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub kind: StorageKind,
    /// Directory for file storage; `~/.sfauth` when unset.
    pub path: Option<PathBuf>,
    /// Prepended to every storage key.
    pub prefix: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            kind: StorageKind::default(),
            path: None,
            prefix: DEFAULT_STORAGE_PREFIX.to_string(),
        }
    }
}

/// Read-only settings for an authenticator.
///
/// # Example
/// ```
/// use sfauth::config::{ResourcePolicy, Settings};
///
/// let settings: Settings = toml::from_str(r#"
///     version = "59.0"
///     resource_policy = "strict"
///
///     [credentials]
///     consumerKey = "key"
/// "#).unwrap();
/// assert_eq!(settings.resource_policy, ResourcePolicy::Strict);
/// assert_eq!(settings.login_url, "https://login.salesforce.com");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Target API version such as `"59.0"`; empty means "latest offered".
    pub version: String,
    /// Used when the credentials carry no `loginURL`.
    pub login_url: String,
    /// Overrides the token's instance URL for discovery calls.
    pub instance_url: Option<String>,
    pub resource_policy: ResourcePolicy,
    pub timeout_secs: u64,
    pub storage: StorageSettings,
    /// Merged into the credential store when an authenticator is built.
    pub credentials: Credentials,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: String::new(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
            instance_url: None,
            resource_policy: ResourcePolicy::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            storage: StorageSettings::default(),
            credentials: Credentials::default(),
        }
    }
}

/// Environment variables mapped onto credential keys.
const CREDENTIAL_ENV: &[(&str, CredentialKey)] = &[
    ("SF_CONSUMER_KEY", CredentialKey::ConsumerKey),
    ("SF_CONSUMER_SECRET", CredentialKey::ConsumerSecret),
    ("SF_USERNAME", CredentialKey::Username),
    ("SF_PASSWORD", CredentialKey::Password),
    ("SF_ACCESS_TOKEN", CredentialKey::AccessToken),
    ("SF_REFRESH_TOKEN", CredentialKey::RefreshToken),
    ("SF_INSTANCE_URL", CredentialKey::InstanceUrl),
];

impl Settings {
    /// Defaults overlaid with the process environment (and `.env`, if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut settings = Self::default();
        settings.apply_env();
        settings
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            AuthError::Configuration(format!("cannot read {}: {err}", path.display()))
        })?;
        Ok(toml::from_str(&raw)?)
    }

    /// File settings (when a path is given) overlaid with the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env();
        Ok(settings)
    }

    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    /// Overlay values from `lookup`; empty values are ignored.
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        if let Some(url) = get("SF_LOGIN_URL") {
            self.login_url = url;
        }
        if let Some(version) = get("SF_API_VERSION") {
            self.version = version;
        }
        if let Some(path) = get("SF_STORAGE_PATH") {
            self.storage.kind = StorageKind::File;
            self.storage.path = Some(PathBuf::from(path));
        }
        let mut supplied = Credentials::default();
        for &(name, key) in CREDENTIAL_ENV {
            if let Some(value) = get(name) {
                supplied.set(key, value);
            }
        }
        self.credentials.merge(&supplied);
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Storage backend described by [`StorageSettings`].
    pub fn storage_backend(&self) -> Arc<dyn Storage> {
        match self.storage.kind {
            StorageKind::Memory => Arc::new(MemoryStorage::new()),
            StorageKind::File => Arc::new(FileStorage::new(
                self.storage.path.clone().unwrap_or_else(default_dir),
            )),
        }
    }

    pub fn repositories(&self) -> Repositories {
        Repositories::from_storage(self.storage_backend(), &self.storage.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_target_production_login_with_relaxed_policy() {
        let settings = Settings::default();
        assert_eq!(settings.login_url, DEFAULT_LOGIN_URL);
        assert_eq!(settings.resource_policy, ResourcePolicy::Relaxed);
        assert_eq!(settings.storage.kind, StorageKind::Memory);
        assert_eq!(settings.storage.prefix, "sfauth_");
        assert!(settings.version.is_empty());
        assert!(settings.credentials.is_empty());
    }

    #[test]
    fn env_overrides_file_values_and_skips_empty_ones() {
        let mut settings: Settings = toml::from_str(
            r#"
            version = "58.0"
            login_url = "https://test.salesforce.com"

            [credentials]
            consumerKey = "file-key"
            username = "file-user"
            "#,
        )
        .unwrap();
        let env = vars(&[
            ("SF_API_VERSION", "59.0"),
            ("SF_CONSUMER_KEY", "env-key"),
            ("SF_USERNAME", ""),
            ("SF_STORAGE_PATH", "/var/lib/sfauth"),
        ]);
        settings.apply_vars(|name| env.get(name).cloned());

        assert_eq!(settings.version, "59.0");
        assert_eq!(settings.login_url, "https://test.salesforce.com");
        assert_eq!(settings.credentials.consumer_key.as_deref(), Some("env-key"));
        assert_eq!(settings.credentials.username.as_deref(), Some("file-user"));
        assert_eq!(settings.storage.kind, StorageKind::File);
        assert_eq!(
            settings.storage.path.as_deref(),
            Some(Path::new("/var/lib/sfauth"))
        );
    }

    #[test]
    fn storage_section_parses() {
        let settings: Settings = toml::from_str(
            r#"
            [storage]
            kind = "file"
            path = "/tmp/sfauth"
            prefix = "app_"
            "#,
        )
        .unwrap();
        assert_eq!(settings.storage.kind, StorageKind::File);
        assert_eq!(settings.storage.prefix, "app_");
    }

    #[test]
    fn unreadable_file_is_a_configuration_error() {
        let err = Settings::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[test]
    fn policy_parses_from_str() {
        assert_eq!("strict".parse::<ResourcePolicy>().unwrap(), ResourcePolicy::Strict);
        assert_eq!(ResourcePolicy::Relaxed.to_string(), "relaxed");
    }
}
