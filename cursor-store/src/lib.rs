//! Cursor store crate: key-value persistence for the polling cursor.
//!
//! ## Modules
//!
//! - [`error`] – Store error types
//! - [`store`] – [`CursorStore`] trait and the reserved cursor key
//! - [`memory`] – [`MemoryStore`] (process-local)
//! - [`file`] – [`FileStore`] (JSON file, whole-file rewrite per write)
//! - [`sqlite`] – [`SqliteStore`] (sqlx)

mod error;
mod file;
mod memory;
mod sqlite;
mod store;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::{CursorStore, LAST_UPDATE_ID_KEY};
