//! JSON-file store. The whole map is rewritten on every mutation, which is fine for a single
//! polling process but not for high-frequency or multi-process writers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::store::CursorStore;

pub struct FileStore {
    path: PathBuf,
    data: Mutex<BTreeMap<String, Value>>,
}

impl FileStore {
    /// Opens the store at `path`. A missing, empty or unreadable file starts an empty map;
    /// the file itself is only created on the first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = load(&path).await?;
        debug!(path = %path.display(), keys = data.len(), "File store opened");
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, data: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let body = serde_json::to_vec_pretty(data)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

async fn load(path: &Path) -> Result<BTreeMap<String, Value>, StoreError> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(e.into()),
    };
    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    match serde_json::from_str::<BTreeMap<String, Value>>(&contents) {
        Ok(map) => Ok(map),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Store file is not a JSON object, starting empty");
            Ok(BTreeMap::new())
        }
    }
}

#[async_trait]
impl CursorStore for FileStore {
    async fn get(&self, key: &str, default: Value) -> Result<Value, StoreError> {
        Ok(match self.data.lock().await.get(key) {
            Some(v) if !v.is_null() => v.clone(),
            _ => default,
        })
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;
        data.insert(key.to_string(), value);
        self.persist(&data).await
    }

    async fn has(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.data.lock().await.contains_key(key))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;
        data.remove(key);
        self.persist(&data).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;
        data.clear();
        self.persist(&data).await
    }
}
