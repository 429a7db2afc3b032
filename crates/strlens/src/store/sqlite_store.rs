//! SQLite バックエンドのレコードストア
//!
//! # 不変条件
//! - 行は挿入順に返す（`seq` は `AUTOINCREMENT`）
//! - 派生カラムが `original_string` と一致しない行は返さず、破損として報告する

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, error, info};

use super::RecordStore;
use crate::analysis::CharacterFrequencyMap;
use crate::errors::{StoreError, StrlensResult};
use crate::filter::RecordFilter;
use crate::models::{AnalysisRecord, RecordId};

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS string_records (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    original_string TEXT NOT NULL,
    length INTEGER NOT NULL,
    is_palindrome INTEGER NOT NULL,
    unique_characters INTEGER NOT NULL,
    word_count INTEGER NOT NULL,
    sha256_hash TEXT NOT NULL,
    character_frequency_map TEXT NOT NULL,
    created_at TEXT NOT NULL
);";

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    original_string,
    length,
    is_palindrome,
    unique_characters,
    word_count,
    sha256_hash,
    character_frequency_map,
    created_at
FROM string_records";

/// 不変条件を検査する前の1行分のカラム値
struct RecordRow {
  id: String,
  original_string: String,
  length: i64,
  is_palindrome: i64,
  unique_characters: i64,
  word_count: i64,
  sha256_hash: String,
  character_frequency_map: String,
  created_at: String,
}

impl RecordRow {
  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id: row.get(0)?,
      original_string: row.get(1)?,
      length: row.get(2)?,
      is_palindrome: row.get(3)?,
      unique_characters: row.get(4)?,
      word_count: row.get(5)?,
      sha256_hash: row.get(6)?,
      character_frequency_map: row.get(7)?,
      created_at: row.get(8)?,
    })
  }

  fn into_record(self) -> Result<AnalysisRecord, StoreError> {
    let corrupt = |reason: String| StoreError::CorruptRecord { id: self.id.clone(), reason };

    let id: RecordId = self.id.parse().map_err(|e| corrupt(format!("id が不正です: {e}")))?;
    let created_at = DateTime::parse_from_rfc3339(&self.created_at)
      .map_err(|e| corrupt(format!("created_at が不正です: {e}")))?
      .with_timezone(&Utc);
    let character_frequency_map: CharacterFrequencyMap =
      serde_json::from_str(&self.character_frequency_map)
        .map_err(|e| corrupt(format!("character_frequency_map が不正です: {e}")))?;

    let stored = AnalysisRecord {
      id,
      original_string: self.original_string.clone(),
      length: to_usize(self.length).ok_or_else(|| corrupt("length が負の値です".to_string()))?,
      is_palindrome: self.is_palindrome != 0,
      unique_characters: to_usize(self.unique_characters)
        .ok_or_else(|| corrupt("unique_characters が負の値です".to_string()))?,
      word_count: to_usize(self.word_count)
        .ok_or_else(|| corrupt("word_count が負の値です".to_string()))?,
      sha256_hash: self.sha256_hash.clone(),
      character_frequency_map,
      created_at,
    };

    if !stored.is_consistent() {
      return Err(corrupt("派生フィールドが original_string と一致しません".to_string()));
    }

    Ok(stored)
  }
}

fn to_usize(value: i64) -> Option<usize> {
  usize::try_from(value).ok()
}

fn to_i64(value: usize) -> i64 {
  i64::try_from(value).unwrap_or(i64::MAX)
}

/// SQLite データベースに永続化するレコードストア
///
/// 接続は `Mutex` の内側にあり、すべての文はロックを保持したまま実行する。
/// プロセス内の書き込みは直列化され、他プロセスとの競合は `busy_timeout` で待つ。
pub struct SqliteRecordStore {
  conn: Mutex<Connection>,
}

impl SqliteRecordStore {
  /// `path` のデータベースファイルを開き（なければ作成し）、スキーマを用意する
  ///
  /// # Errors
  /// ファイルを開けない、またはスキーマ作成に失敗した場合は `StoreError::Sqlite`
  pub fn open(path: &Path, busy_timeout_ms: u64) -> Result<Self, StoreError> {
    let started_at = Instant::now();
    let conn = Connection::open(path).map_err(|e| {
      error!(path = %path.display(), error = %e, "sqlite データベースのオープンに失敗");
      StoreError::from(e)
    })?;

    let store = Self::bootstrap(conn, busy_timeout_ms)?;
    info!(
      path = %path.display(),
      duration_ms = started_at.elapsed().as_millis() as u64,
      "sqlite レコードストアをオープン"
    );
    Ok(store)
  }

  /// 専用のインメモリ SQLite データベースを開く
  ///
  /// # Errors
  /// スキーマを作成できない場合は `StoreError::Sqlite`
  pub fn open_in_memory() -> Result<Self, StoreError> {
    let conn = Connection::open_in_memory()?;
    Self::bootstrap(conn, crate::config::DEFAULT_BUSY_TIMEOUT_MS)
  }

  fn bootstrap(conn: Connection, busy_timeout_ms: u64) -> Result<Self, StoreError> {
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(Self { conn: Mutex::new(conn) })
  }

  fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
    self.conn.lock().map_err(|_| StoreError::LockPoisoned)
  }
}

impl RecordStore for SqliteRecordStore {
  fn create(&self, original_string: &str) -> StrlensResult<AnalysisRecord> {
    let record = AnalysisRecord::create(original_string)?;
    let frequency_json = serde_json::to_string(&record.character_frequency_map).map_err(|e| {
      StoreError::FrequencyMapEncoding { id: record.id.to_string(), source: e.into() }
    })?;

    let conn = self.conn()?;
    conn
      .execute(
        "INSERT INTO string_records (
            id,
            original_string,
            length,
            is_palindrome,
            unique_characters,
            word_count,
            sha256_hash,
            character_frequency_map,
            created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
        params![
          record.id.to_string(),
          record.original_string.as_str(),
          to_i64(record.length),
          i64::from(record.is_palindrome),
          to_i64(record.unique_characters),
          to_i64(record.word_count),
          record.sha256_hash.as_str(),
          frequency_json,
          record.created_at.to_rfc3339(),
        ],
      )
      .map_err(StoreError::from)?;

    debug!(id = %record.id, length = record.length, "レコードを sqlite に保存");
    Ok(record)
  }

  fn get(&self, id: &RecordId) -> StrlensResult<AnalysisRecord> {
    let conn = self.conn()?;
    let row = conn
      .query_row(
        &format!("{RECORD_SELECT_SQL} WHERE id = ?1;"),
        params![id.to_string()],
        RecordRow::from_row,
      )
      .optional()
      .map_err(StoreError::from)?
      .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

    Ok(row.into_record()?)
  }

  fn list(&self, filter: Option<&RecordFilter>) -> StrlensResult<Vec<AnalysisRecord>> {
    let conn = self.conn()?;
    let mut stmt =
      conn.prepare(&format!("{RECORD_SELECT_SQL} ORDER BY seq ASC;")).map_err(StoreError::from)?;
    let rows = stmt.query_map([], RecordRow::from_row).map_err(StoreError::from)?;

    let mut records = Vec::new();
    for row in rows {
      let record = row.map_err(StoreError::from)?.into_record()?;
      if filter.is_none_or(|f| f.matches(&record)) {
        records.push(record);
      }
    }
    Ok(records)
  }

  fn delete(&self, id: &RecordId) -> StrlensResult<()> {
    let conn = self.conn()?;
    let changed = conn
      .execute("DELETE FROM string_records WHERE id = ?1;", params![id.to_string()])
      .map_err(StoreError::from)?;

    if changed == 0 {
      return Err(StoreError::NotFound { id: id.to_string() }.into());
    }

    debug!(%id, "レコードを sqlite から削除");
    Ok(())
  }

  fn len(&self) -> StrlensResult<usize> {
    let conn = self.conn()?;
    let count: i64 = conn
      .query_row("SELECT COUNT(*) FROM string_records;", [], |row| row.get(0))
      .map_err(StoreError::from)?;
    Ok(to_usize(count).unwrap_or(0))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn create_then_get_round_trips_all_fields() {
    let store = SqliteRecordStore::open_in_memory().unwrap();
    let created = store.create("Never odd or even").unwrap();
    let fetched = store.get(&created.id).unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.created_at, created.created_at);
  }

  #[test]
  fn delete_twice_is_not_found() {
    let store = SqliteRecordStore::open_in_memory().unwrap();
    let record = store.create("hello").unwrap();

    store.delete(&record.id).unwrap();
    assert!(store.get(&record.id).unwrap_err().is_not_found());
    assert!(store.delete(&record.id).unwrap_err().is_not_found());
  }

  #[test]
  fn list_orders_by_insertion() {
    let store = SqliteRecordStore::open_in_memory().unwrap();
    for value in ["one", "two", "three"] {
      store.create(value).unwrap();
    }

    let values: Vec<String> =
      store.list(None).unwrap().into_iter().map(|r| r.original_string).collect();
    assert_eq!(values, ["one", "two", "three"]);
    assert_eq!(store.len().unwrap(), 3);
  }

  #[test]
  fn tampered_row_is_reported_corrupt() {
    let store = SqliteRecordStore::open_in_memory().unwrap();
    let record = store.create("hello").unwrap();

    store
      .conn()
      .unwrap()
      .execute("UPDATE string_records SET length = 42 WHERE id = ?1;", params![record.id.to_string()])
      .unwrap();

    let err = store.get(&record.id).unwrap_err();
    assert!(err.to_string().contains("破損しています"));
  }
}
