//! プロセス内レコードストア

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::RecordStore;
use crate::errors::{StoreError, StrlensResult};
use crate::filter::RecordFilter;
use crate::models::{AnalysisRecord, RecordId};

#[derive(Default)]
struct Inner {
  /// 作成順序番号 → レコード（走査順が作成順になる）
  records: BTreeMap<u64, AnalysisRecord>,
  /// id → 作成順序番号
  index: HashMap<RecordId, u64>,
  next_seq: u64,
}

/// メモリ上に保持するレコードストア
///
/// 生成した側が所有し、プロセスグローバルな状態は持たない。
/// ストアを drop すると内容は失われる。
#[derive(Default)]
pub struct MemoryRecordStore {
  inner: RwLock<Inner>,
}

impl MemoryRecordStore {
  /// 空のストアを作成する
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
    self.inner.read().map_err(|_| StoreError::LockPoisoned)
  }

  fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
    self.inner.write().map_err(|_| StoreError::LockPoisoned)
  }
}

fn not_found(id: &RecordId) -> StoreError {
  StoreError::NotFound { id: id.to_string() }
}

impl RecordStore for MemoryRecordStore {
  fn create(&self, original_string: &str) -> StrlensResult<AnalysisRecord> {
    let record = AnalysisRecord::create(original_string)?;

    let mut inner = self.write()?;
    let seq = inner.next_seq;
    inner.next_seq += 1;
    inner.index.insert(record.id, seq);
    inner.records.insert(seq, record.clone());

    debug!(id = %record.id, seq, length = record.length, "レコードをメモリに保存");
    Ok(record)
  }

  fn get(&self, id: &RecordId) -> StrlensResult<AnalysisRecord> {
    let inner = self.read()?;
    let record = inner
      .index
      .get(id)
      .and_then(|seq| inner.records.get(seq))
      .cloned()
      .ok_or_else(|| not_found(id))?;
    Ok(record)
  }

  fn list(&self, filter: Option<&RecordFilter>) -> StrlensResult<Vec<AnalysisRecord>> {
    let inner = self.read()?;
    let records = inner
      .records
      .values()
      .filter(|record| filter.is_none_or(|f| f.matches(record)))
      .cloned()
      .collect();
    Ok(records)
  }

  fn delete(&self, id: &RecordId) -> StrlensResult<()> {
    let mut inner = self.write()?;
    let seq = inner.index.remove(id).ok_or_else(|| not_found(id))?;
    inner.records.remove(&seq);

    debug!(%id, "レコードをメモリから削除");
    Ok(())
  }

  fn len(&self) -> StrlensResult<usize> {
    Ok(self.read()?.records.len())
  }
}
