//! Reconciles cached API version and resource map against configuration.

use std::cmp::Ordering;

use tracing::{debug, info, warn};

use super::manager::Authenticator;
use crate::config::ResourcePolicy;
use crate::error::{AuthError, Result};
use crate::repository::VersionRecord;

/// What [`Authenticator::check_version`] refreshed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VersionCheck {
    pub version_refreshed: bool,
    pub resources_refreshed: bool,
}

impl VersionCheck {
    pub fn is_noop(&self) -> bool {
        !self.version_refreshed && !self.resources_refreshed
    }
}

/// A stored version is stale when absent or when a configured target differs.
pub fn needs_version_refresh(configured: &str, current: Option<&str>) -> bool {
    match current.filter(|version| !version.is_empty()) {
        None => true,
        Some(current) => !configured.is_empty() && configured != current,
    }
}

/// Configured version when offered, otherwise the highest one.
pub fn select_version(versions: &[VersionRecord], configured: &str) -> Option<VersionRecord> {
    if !configured.is_empty() {
        if let Some(found) = versions.iter().find(|v| v.version == configured) {
            return Some(found.clone());
        }
    }
    versions
        .iter()
        .max_by(|a, b| compare_versions(&a.version, &b.version))
        .cloned()
}

fn compare_versions(a: &str, b: &str) -> Ordering {
    let parts = |version: &str| -> Vec<u32> {
        version
            .split('.')
            .map(|part| part.trim().parse().unwrap_or(0))
            .collect()
    };
    parts(a).cmp(&parts(b))
}

impl Authenticator {
    /// Refresh the cached version when stale, and the resource map as the
    /// configured [`ResourcePolicy`] requires.
    ///
    /// Both policies refresh resources after a version refresh. `Relaxed`
    /// additionally refreshes them when the resource cache is empty.
    pub async fn check_version(&self) -> Result<VersionCheck> {
        let repos = self.repositories();
        let current = if repos.version.has()? {
            Some(repos.version.get()?)
        } else {
            None
        };
        let configured = self.settings().version.as_str();
        let mut check = VersionCheck::default();

        let version = match current {
            Some(current)
                if !needs_version_refresh(configured, Some(current.version.as_str())) =>
            {
                current
            }
            _ => {
                check.version_refreshed = true;
                self.store_version().await?
            }
        };

        let refresh_resources = check.version_refreshed
            || match self.settings().resource_policy {
                ResourcePolicy::Strict => false,
                ResourcePolicy::Relaxed => !repos.resource.has()?,
            };
        if refresh_resources {
            self.store_resources(&version).await?;
            check.resources_refreshed = true;
        } else {
            debug!(version = %version.version, "version and resource caches are current");
        }
        Ok(check)
    }

    async fn store_version(&self) -> Result<VersionRecord> {
        let token = self.token_repo().get()?;
        let versions = self.discovery.versions(&token).await?;
        let configured = self.settings().version.as_str();
        let chosen = select_version(&versions, configured)
            .ok_or_else(|| AuthError::InvalidResponse("empty version listing".to_string()))?;
        if !configured.is_empty() && chosen.version != configured {
            warn!(
                configured,
                using = %chosen.version,
                "configured API version not offered, using latest"
            );
        }
        self.version_repo().put(&chosen)?;
        info!(version = %chosen.version, "API version stored");
        Ok(chosen)
    }

    async fn store_resources(&self, version: &VersionRecord) -> Result<()> {
        let token = self.token_repo().get()?;
        let resources = self.discovery.resources(&token, version).await?;
        self.resource_repo().put(&resources)?;
        info!(count = resources.len(), version = %version.version, "API resources stored");
        Ok(())
    }
}
