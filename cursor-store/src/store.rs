use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

/// Reserved key holding the last processed update id.
pub const LAST_UPDATE_ID_KEY: &str = "last_update_id";

/// String-keyed store of JSON values. Implementations serialise their own get/set pairs;
/// callers never hold a lock across calls.
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Stored value, or `default` when the key is missing or holds `null`.
    async fn get(&self, key: &str, default: Value) -> Result<Value, StoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// True for any stored key, including one holding `null`.
    async fn has(&self, key: &str) -> Result<bool, StoreError>;

    /// Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;

    /// Integer view of [`get`](CursorStore::get); non-integer values read as `default`.
    async fn get_i64(&self, key: &str, default: i64) -> Result<i64, StoreError> {
        Ok(self
            .get(key, Value::from(default))
            .await?
            .as_i64()
            .unwrap_or(default))
    }
}
