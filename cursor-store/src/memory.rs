//! Process-local store; contents are lost on restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::CursorStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CursorStore for MemoryStore {
    async fn get(&self, key: &str, default: Value) -> Result<Value, StoreError> {
        Ok(match self.data.read().await.get(key) {
            Some(v) if !v.is_null() => v.clone(),
            _ => default,
        })
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.data.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn has(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.data.read().await.contains_key(key))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.data.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.data.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k", json!(0)).await.unwrap(), json!(0));
        store.set("k", json!(5)).await.unwrap();
        assert_eq!(store.get_i64("k", 0).await.unwrap(), 5);
        store.set("n", Value::Null).await.unwrap();
        assert!(store.has("n").await.unwrap());
        assert_eq!(store.get("n", json!("d")).await.unwrap(), json!("d"));
        store.clear().await.unwrap();
        assert!(!store.has("k").await.unwrap());
    }
}
