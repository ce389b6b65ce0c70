//! Cursor-driven pull fetcher for `getUpdates`.

use std::sync::Arc;

use courier_core::{Bot, CourierError, Result, Update};
use cursor_store::{CursorStore, StoreError, LAST_UPDATE_ID_KEY};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

pub const DEFAULT_LIMIT: u32 = 100;
pub const MAX_LIMIT: u32 = 100;

/// Parameters of one `getUpdates` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GetUpdatesParams {
    /// `last + 1`, or 0 (take whatever is queued) when no cursor is stored.
    pub offset: i64,
    pub limit: u32,
    /// Long-poll seconds; 0 is a short poll.
    pub timeout: u32,
}

/// Result of folding one batch: parsed updates in delivery order plus the elements that
/// failed to parse (never routed).
#[derive(Debug, Default)]
pub struct FetchedBatch {
    pub updates: Vec<Update>,
    pub rejected: Vec<CourierError>,
}

impl FetchedBatch {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.rejected.is_empty()
    }
}

/// Computes request parameters from the stored cursor and advances it from each batch.
/// The cursor only moves forward; only an explicit store `clear`/`delete` resets it.
pub struct PullFetcher {
    store: Arc<dyn CursorStore>,
    limit: u32,
    timeout: u32,
}

impl PullFetcher {
    /// `limit` is clamped to 1..=100.
    pub fn new(store: Arc<dyn CursorStore>, limit: u32, timeout: u32) -> Self {
        Self {
            store,
            limit: limit.clamp(1, MAX_LIMIT),
            timeout,
        }
    }

    pub async fn request_params(&self) -> Result<GetUpdatesParams> {
        let last = self
            .store
            .get_i64(LAST_UPDATE_ID_KEY, 0)
            .await
            .map_err(storage_error)?;
        Ok(GetUpdatesParams {
            offset: if last > 0 { last + 1 } else { 0 },
            limit: self.limit,
            timeout: self.timeout,
        })
    }

    /// One round: build params, call `getUpdates`, fold the result.
    #[instrument(skip(self, bot))]
    pub async fn fetch(&self, bot: &Bot) -> Result<FetchedBatch> {
        let params = self.request_params().await?;
        debug!(offset = params.offset, limit = params.limit, timeout = params.timeout, "Fetching updates");
        let result = bot
            .call("getUpdates", serde_json::to_value(params)?)
            .await?;
        self.fold_result(&result).await
    }

    /// Folds a full `{ ok, result }` envelope. `ok: false` leaves the cursor untouched and
    /// yields an empty batch.
    pub async fn fold_response(&self, envelope: &Value) -> Result<FetchedBatch> {
        if !envelope.get("ok").and_then(|v| v.as_bool()).unwrap_or(false) {
            return Ok(FetchedBatch::default());
        }
        match envelope.get("result") {
            Some(result) => self.fold_result(result).await,
            None => Ok(FetchedBatch::default()),
        }
    }

    /// Folds the `result` array. Each element is parsed independently; the cursor is set to
    /// the maximum readable `update_id` in the batch (malformed elements included, so a poison
    /// payload is not re-fetched forever), and only if that is ahead of the stored value.
    pub async fn fold_result(&self, result: &Value) -> Result<FetchedBatch> {
        let items = match result {
            Value::Array(items) => items,
            Value::Null => return Ok(FetchedBatch::default()),
            _ => {
                return Err(CourierError::MalformedUpdate {
                    path: "result".to_string(),
                    reason: "expected an array of updates".to_string(),
                })
            }
        };
        if items.is_empty() {
            return Ok(FetchedBatch::default());
        }

        let mut batch = FetchedBatch::default();
        let mut max_id: Option<i64> = None;
        for item in items {
            if let Some(id) = item.get("update_id").and_then(|v| v.as_i64()) {
                max_id = Some(max_id.map_or(id, |m| m.max(id)));
            }
            match Update::from_value(item) {
                Ok(update) => batch.updates.push(update),
                Err(e) => batch.rejected.push(e),
            }
        }

        if let Some(max_id) = max_id {
            self.advance(max_id).await?;
        }
        Ok(batch)
    }

    async fn advance(&self, candidate: i64) -> Result<()> {
        let current = self
            .store
            .get_i64(LAST_UPDATE_ID_KEY, 0)
            .await
            .map_err(storage_error)?;
        if candidate > current {
            self.store
                .set(LAST_UPDATE_ID_KEY, Value::from(candidate))
                .await
                .map_err(storage_error)?;
            debug!(from = current, to = candidate, "Cursor advanced");
        }
        Ok(())
    }
}

fn storage_error(e: StoreError) -> CourierError {
    CourierError::Storage(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cursor_store::MemoryStore;
    use serde_json::json;

    fn update(id: i64) -> Value {
        json!({
            "update_id": id,
            "message": { "message_id": id, "date": 0, "chat": { "id": 1, "type": "private" }, "text": "t" }
        })
    }

    async fn fetcher_with_cursor(last: Option<i64>) -> (PullFetcher, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        if let Some(last) = last {
            store.set(LAST_UPDATE_ID_KEY, json!(last)).await.unwrap();
        }
        (PullFetcher::new(store.clone(), DEFAULT_LIMIT, 0), store)
    }

    #[tokio::test]
    async fn test_offset_zero_without_cursor() {
        let (f, _) = fetcher_with_cursor(None).await;
        let p = f.request_params().await.unwrap();
        assert_eq!(p, GetUpdatesParams { offset: 0, limit: 100, timeout: 0 });
    }

    #[tokio::test]
    async fn test_offset_zero_for_stored_zero() {
        let (f, _) = fetcher_with_cursor(Some(0)).await;
        assert_eq!(f.request_params().await.unwrap().offset, 0);
    }

    #[tokio::test]
    async fn test_offset_is_last_plus_one() {
        let (f, _) = fetcher_with_cursor(Some(100)).await;
        assert_eq!(f.request_params().await.unwrap().offset, 101);
    }

    #[tokio::test]
    async fn test_limit_is_clamped_and_timeout_kept() {
        let store = Arc::new(MemoryStore::new());
        let p = PullFetcher::new(store.clone(), 500, 30).request_params().await.unwrap();
        assert_eq!((p.limit, p.timeout), (100, 30));
        let p = PullFetcher::new(store, 0, 0).request_params().await.unwrap();
        assert_eq!(p.limit, 1);
    }

    #[tokio::test]
    async fn test_fold_sets_cursor_to_max_not_last() {
        let (f, store) = fetcher_with_cursor(None).await;
        let batch = f.fold_result(&json!([update(13), update(15), update(14)])).await.unwrap();
        assert_eq!(batch.updates.iter().map(|u| u.id).collect::<Vec<_>>(), vec![13, 15, 14]);
        assert_eq!(store.get_i64(LAST_UPDATE_ID_KEY, 0).await.unwrap(), 15);
    }

    #[tokio::test]
    async fn test_fold_never_moves_cursor_back() {
        let (f, store) = fetcher_with_cursor(Some(50)).await;
        f.fold_result(&json!([update(20)])).await.unwrap();
        assert_eq!(store.get_i64(LAST_UPDATE_ID_KEY, 0).await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_empty_or_failed_round_leaves_cursor_untouched() {
        let (f, store) = fetcher_with_cursor(None).await;
        assert!(f.fold_response(&json!({ "ok": true, "result": [] })).await.unwrap().is_empty());
        assert!(f
            .fold_response(&json!({ "ok": false, "result": [update(9)] }))
            .await
            .unwrap()
            .is_empty());
        assert!(!store.has(LAST_UPDATE_ID_KEY).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_element_is_rejected_but_cursor_passes_it() {
        let (f, store) = fetcher_with_cursor(None).await;
        let bad = json!({ "update_id": 31, "message": { "message_id": 1, "date": 0 } });
        let batch = f.fold_result(&json!([update(30), bad])).await.unwrap();
        assert_eq!(batch.updates.len(), 1);
        assert_eq!(batch.rejected.len(), 1);
        assert!(matches!(batch.rejected[0], CourierError::MalformedUpdate { .. }));
        assert_eq!(store.get_i64(LAST_UPDATE_ID_KEY, 0).await.unwrap(), 31);
    }

    #[tokio::test]
    async fn test_non_array_result_is_an_error() {
        let (f, store) = fetcher_with_cursor(Some(3)).await;
        assert!(f.fold_result(&json!({ "x": 1 })).await.is_err());
        assert_eq!(store.get_i64(LAST_UPDATE_ID_KEY, 0).await.unwrap(), 3);
    }
}
