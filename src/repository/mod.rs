//! Repository contracts for cached authentication state, plus the default
//! implementation over a [`Storage`] backend.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::auth::token::AuthToken;
use crate::error::{AuthError, Result};
use crate::storage::{MemoryStorage, Storage};

/// Named API endpoints discovered at a given version, relative to the instance URL.
pub type ResourceMap = BTreeMap<String, String>;

/// One entry of the provider's API version listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub label: String,
    pub url: String,
    pub version: String,
}

pub trait TokenRepository: Send + Sync {
    fn has(&self) -> Result<bool>;
    /// Fails with [`AuthError::Missing`] when no token is cached.
    fn get(&self) -> Result<AuthToken>;
    fn put(&self, token: &AuthToken) -> Result<()>;
    fn flush(&self) -> Result<()>;
}

pub trait VersionRepository: Send + Sync {
    fn has(&self) -> Result<bool>;
    fn get(&self) -> Result<VersionRecord>;
    fn put(&self, version: &VersionRecord) -> Result<()>;
}

pub trait ResourceRepository: Send + Sync {
    fn has(&self) -> Result<bool>;
    fn get(&self) -> Result<ResourceMap>;
    fn put(&self, resources: &ResourceMap) -> Result<()>;
}

/// Opaque state for redirect-based flows; only exposed through accessors here.
pub trait StateRepository: Send + Sync {
    fn has(&self) -> Result<bool>;
    fn get(&self) -> Result<String>;
    fn put(&self, state: &str) -> Result<()>;
}

pub trait InstanceUrlRepository: Send + Sync {
    fn has(&self) -> Result<bool>;
    fn get(&self) -> Result<String>;
    fn put(&self, instance_url: &str) -> Result<()>;
}

/// Single serialized record kept under one storage key.
pub struct StorageRepository<T> {
    storage: Arc<dyn Storage>,
    key: String,
    label: &'static str,
    _record: PhantomData<fn() -> T>,
}

impl<T> StorageRepository<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<String>, label: &'static str) -> Self {
        Self {
            storage,
            key: key.into(),
            label,
            _record: PhantomData,
        }
    }

    fn exists(&self) -> Result<bool> {
        self.storage.has(&self.key)
    }

    fn load(&self) -> Result<T> {
        let value = self
            .storage
            .get(&self.key)?
            .ok_or(AuthError::Missing(self.label))?;
        serde_json::from_value(value)
            .map_err(|err| AuthError::Storage(format!("corrupt {} record: {err}", self.label)))
    }

    fn store(&self, record: &T) -> Result<()> {
        self.storage.put(&self.key, serde_json::to_value(record)?)
    }

    fn forget(&self) -> Result<()> {
        self.storage.forget(&self.key)
    }
}

impl TokenRepository for StorageRepository<AuthToken> {
    fn has(&self) -> Result<bool> {
        self.exists()
    }

    fn get(&self) -> Result<AuthToken> {
        self.load()
    }

    fn put(&self, token: &AuthToken) -> Result<()> {
        self.store(token)
    }

    fn flush(&self) -> Result<()> {
        self.forget()
    }
}

impl VersionRepository for StorageRepository<VersionRecord> {
    fn has(&self) -> Result<bool> {
        self.exists()
    }

    fn get(&self) -> Result<VersionRecord> {
        self.load()
    }

    fn put(&self, version: &VersionRecord) -> Result<()> {
        self.store(version)
    }
}

impl ResourceRepository for StorageRepository<ResourceMap> {
    fn has(&self) -> Result<bool> {
        self.exists()
    }

    fn get(&self) -> Result<ResourceMap> {
        self.load()
    }

    fn put(&self, resources: &ResourceMap) -> Result<()> {
        self.store(resources)
    }
}

/// State and instance URL share the `String` record type, so each gets a thin wrapper.
pub struct StateStorageRepository(StorageRepository<String>);

impl StateRepository for StateStorageRepository {
    fn has(&self) -> Result<bool> {
        self.0.exists()
    }

    fn get(&self) -> Result<String> {
        self.0.load()
    }

    fn put(&self, state: &str) -> Result<()> {
        self.0.store(&state.to_string())
    }
}

pub struct InstanceUrlStorageRepository(StorageRepository<String>);

impl InstanceUrlRepository for InstanceUrlStorageRepository {
    fn has(&self) -> Result<bool> {
        self.0.exists()
    }

    fn get(&self) -> Result<String> {
        self.0.load()
    }

    fn put(&self, instance_url: &str) -> Result<()> {
        self.0.store(&instance_url.to_string())
    }
}

/// The full set of repositories an authenticator works against.
#[derive(Clone)]
pub struct Repositories {
    pub token: Arc<dyn TokenRepository>,
    pub version: Arc<dyn VersionRepository>,
    pub resource: Arc<dyn ResourceRepository>,
    pub state: Arc<dyn StateRepository>,
    pub instance_url: Arc<dyn InstanceUrlRepository>,
}

impl Repositories {
    /// Repositories over one storage backend, keys namespaced by `prefix`.
    pub fn from_storage(storage: Arc<dyn Storage>, prefix: &str) -> Self {
        let key = |name: &str| format!("{prefix}{name}");
        Self {
            token: Arc::new(StorageRepository::<AuthToken>::new(
                storage.clone(),
                key("token"),
                "token",
            )),
            version: Arc::new(StorageRepository::<VersionRecord>::new(
                storage.clone(),
                key("version"),
                "version",
            )),
            resource: Arc::new(StorageRepository::<ResourceMap>::new(
                storage.clone(),
                key("resources"),
                "resources",
            )),
            state: Arc::new(StateStorageRepository(StorageRepository::new(
                storage.clone(),
                key("state"),
                "state",
            ))),
            instance_url: Arc::new(InstanceUrlStorageRepository(StorageRepository::new(
                storage,
                key("instance_url"),
                "instance URL",
            ))),
        }
    }

    pub fn in_memory() -> Self {
        Self::from_storage(Arc::new(MemoryStorage::new()), "")
    }
}
