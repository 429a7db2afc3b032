//! レコードストアモジュール

mod memory_store;
mod record_store;
mod sqlite_store;

pub use memory_store::MemoryRecordStore;
pub use record_store::{RecordStore, open_store};
pub use sqlite_store::SqliteRecordStore;
