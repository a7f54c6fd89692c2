//! Local key-value preference storage.
//!
//! Only the theme choice is persisted; the cart deliberately is not.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Errors from the preference store.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("preference storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("preference file is not a JSON object of strings: {0}")]
    Format(#[from] serde_json::Error),
}

/// Asynchronous string key-value storage on the device.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// Preferences that live only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryPreferences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferences {
    async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences stored as a flat JSON object in a file.
///
/// A missing file reads as empty. Writes rewrite the whole file.
#[derive(Debug)]
pub struct JsonFilePreferences {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFilePreferences {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl PreferenceStore for JsonFilePreferences {
    async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.load().await?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(&values)?;
        tokio::fs::write(&self.path, json).await?;
        debug!(path = %self.path.display(), key, "preference saved");
        Ok(())
    }
}
