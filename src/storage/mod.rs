//! Key/value storage backends that repositories persist into.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AuthError, Result};

/// Storage abstraction for cached authentication state.
///
/// Implementations may be in-process, file-backed or networked.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn put(&self, key: &str, value: Value) -> Result<()>;
    fn forget(&self, key: &str) -> Result<()>;

    fn has(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Process-local storage. Contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Value>>> {
        self.entries
            .lock()
            .map_err(|_| AuthError::Storage("memory storage lock poisoned".to_string()))
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: Value) -> Result<()> {
        self.entries()?.insert(key.to_string(), value);
        Ok(())
    }

    fn forget(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// File-backed storage writing one JSON document per key.
///
/// # Example
/// ```no_run
/// use sfauth::storage::{FileStorage, Storage};
///
/// let storage = FileStorage::new("/tmp/sfauth");
/// storage.put("sfauth_instance_url", serde_json::json!("https://na1.salesforce.com"))?;
/// # Ok::<(), sfauth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn new_default() -> Self {
        Self::new(default_dir())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", normalize_label(key)))
    }

    /// Opens `path` for a full rewrite, owner read/write only on unix.
    #[cfg(unix)]
    fn open_private(path: &Path) -> Result<fs::File> {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

        let file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        // `mode` only applies on creation; tighten files left by older writers.
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
        Ok(file)
    }

    #[cfg(not(unix))]
    fn open_private(path: &Path) -> Result<fs::File> {
        Ok(fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?)
    }

    fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.entry_path(key);
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Storage(err.to_string())),
        };
        let entry: StoredEntry = serde_json::from_str(&raw).map_err(|err| {
            AuthError::Storage(format!("corrupt entry {}: {err}", path.display()))
        })?;
        Ok(Some(entry.value))
    }

    fn put(&self, key: &str, value: Value) -> Result<()> {
        let path = self.entry_path(key);
        Self::ensure_parent(&path)?;
        let entry = StoredEntry {
            version: 1,
            key: key.to_string(),
            value,
            saved_at: Utc::now(),
        };
        let serialized = serde_json::to_string_pretty(&entry)?;
        let mut file = Self::open_private(&path)?;
        file.write_all(serialized.as_bytes())?;
        Ok(())
    }

    fn forget(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Storage(err.to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    version: u32,
    key: String,
    value: Value,
    saved_at: DateTime<Utc>,
}

/// `~/.sfauth`, or `./.sfauth` when no home directory is known.
pub fn default_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".sfauth"))
        .unwrap_or_else(|| PathBuf::from(".sfauth"))
}

fn normalize_label(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    let mut out = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() || lower == '-' || lower == '_' {
            out.push(lower);
        } else {
            out.push('-');
        }
    }
    out
}
