//! レコードストアの契約

use std::sync::Arc;

use tracing::info;

use super::{MemoryRecordStore, SqliteRecordStore};
use crate::config::{StoreConfig, StoreKind};
use crate::errors::StrlensResult;
use crate::filter::RecordFilter;
use crate::models::{AnalysisRecord, RecordId};

/// 解析レコードの CRUD
///
/// 実装は書き込みを直列化し、同時の `create` が互いの途中状態を観測しないようにする。
/// レコードは作成順に返す。
pub trait RecordStore: Send + Sync {
  /// `original_string` を解析し、新しいレコードを保存して返す
  ///
  /// # Errors
  /// - 空文字列: `ValidationError::EmptyValue`（何も保存しない）
  /// - バックエンドの失敗: `StoreError`
  fn create(&self, original_string: &str) -> StrlensResult<AnalysisRecord>;

  /// レコードを1件取得する
  ///
  /// # Errors
  /// 該当 id のレコードがなければ `StoreError::NotFound`
  fn get(&self, id: &RecordId) -> StrlensResult<AnalysisRecord>;

  /// `filter` にマッチするレコード（`None` なら全件）を古い順に返す
  ///
  /// # Errors
  /// バックエンドの失敗: `StoreError`
  fn list(&self, filter: Option<&RecordFilter>) -> StrlensResult<Vec<AnalysisRecord>>;

  /// レコードを1件削除する
  ///
  /// # Errors
  /// 該当 id のレコードがなければ `StoreError::NotFound`（2回目の削除を含む）
  fn delete(&self, id: &RecordId) -> StrlensResult<()>;

  /// 保存されているレコード数
  ///
  /// # Errors
  /// バックエンドの失敗: `StoreError`
  fn len(&self) -> StrlensResult<usize>;

  /// レコードが1件もないか
  ///
  /// # Errors
  /// バックエンドの失敗: `StoreError`
  fn is_empty(&self) -> StrlensResult<bool> {
    Ok(self.len()? == 0)
  }
}

/// `config` で選択されたストアを開く
///
/// # Errors
/// - 設定が不正: `ConfigError`
/// - SQLite データベースを開けない: `StoreError`
pub fn open_store(config: &StoreConfig) -> StrlensResult<Arc<dyn RecordStore>> {
  config.validate()?;

  let store: Arc<dyn RecordStore> = match config.kind {
    StoreKind::Memory => Arc::new(MemoryRecordStore::new()),
    StoreKind::Sqlite => {
      let path = config.resolved_sqlite_path()?;
      Arc::new(SqliteRecordStore::open(&path, config.busy_timeout_ms)?)
    }
  };

  info!(kind = %config.kind, "レコードストアをオープン");
  Ok(store)
}
