// crates/strlens/src/service.rs

//! StringAnalyzerService: strlens クレートの統合ファサード。
//!
//! - レコードストア (メモリ / SQLite)
//! - フィルタエンジン (構造化パラメータ / 自然言語クエリ)
//!
//! HTTP 層などの外部からは、この構造体だけを意識すればよい。

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::errors::{StoreError, StrlensResult, ValidationError};
use crate::filter::{RecordFilter, parse_natural_language};
use crate::models::{AnalysisRecord, RecordId};
use crate::store::{RecordStore, open_store};

/// 自然言語検索の結果
#[derive(Debug, Clone)]
pub struct InterpretedSearch {
  /// 受信したクエリ
  pub original: String,
  /// クエリから導出したフィルタ
  pub filter: RecordFilter,
  /// マッチしたレコード（作成順）
  pub records: Vec<AnalysisRecord>,
}

/// レコードストアとフィルタエンジンのファサード。
///
/// ストアを明示的に保持する。clone したインスタンス同士は同じストアを共有する。
#[derive(Clone)]
pub struct StringAnalyzerService {
  store: Arc<dyn RecordStore>,
  max_value_length: Option<usize>,
}

impl StringAnalyzerService {
  /// 設定されたストアを開く。
  ///
  /// # Errors
  /// - 設定が不正
  /// - SQLite データベースを開けない
  pub fn init(config: &StoreConfig) -> StrlensResult<Self> {
    let store = open_store(config)?;
    info!(records = store.len()?, "文字列解析サービスを初期化");
    Ok(Self::with_store(store))
  }

  /// オープン済みのストアをラップする
  pub fn with_store(store: Arc<dyn RecordStore>) -> Self {
    Self { store, max_value_length: None }
  }

  /// 解析する値の最大バイト数を設定する
  #[must_use]
  pub fn with_max_value_length(mut self, max: usize) -> Self {
    self.max_value_length = Some(max);
    self
  }

  /// `value` を解析して保存する。
  ///
  /// # Errors
  /// - 値が空: `ValidationError::EmptyValue`
  /// - 値が最大バイト数を超える: `ValidationError::ValueTooLong`
  /// - ストアの失敗
  pub fn analyze(&self, value: &str) -> StrlensResult<AnalysisRecord> {
    if let Some(max) = self.max_value_length
      && value.len() > max
    {
      return Err(ValidationError::ValueTooLong { actual: value.len(), max }.into());
    }

    let record = self.store.create(value)?;
    info!(id = %record.id, length = record.length, "文字列を解析");
    Ok(record)
  }

  /// 文字列の id でレコードを取得する。
  ///
  /// UUID として不正な id は存在し得ないため、見つからないものとして扱う。
  ///
  /// # Errors
  /// レコードが存在しなければ `StoreError::NotFound`
  pub fn get(&self, id: &str) -> StrlensResult<AnalysisRecord> {
    let id = parse_id(id)?;
    self.store.get(&id)
  }

  /// `filter` にマッチするレコードを返す。
  ///
  /// # Errors
  /// ストアの失敗
  pub fn list(&self, filter: &RecordFilter) -> StrlensResult<Vec<AnalysisRecord>> {
    let records = self.store.list(Some(filter).filter(|f| !f.is_empty()))?;
    debug!(clauses = filter.clauses().len(), matched = records.len(), "レコード一覧を取得");
    Ok(records)
  }

  /// URL クエリのペア（`min_length=5&q=...`）にマッチするレコードを返す。
  ///
  /// # Errors
  /// - 未知・重複・不正なパラメータ: `ValidationError`
  /// - `q` を解析できない: `QueryError`
  /// - ストアの失敗
  pub fn list_by_params<I, K, V>(&self, pairs: I) -> StrlensResult<Vec<AnalysisRecord>>
  where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
  {
    let filter = RecordFilter::from_query_pairs(pairs)?;
    self.list(&filter)
  }

  /// 自然言語検索を実行する。
  ///
  /// # Errors
  /// - `query` から何も導出できない: `QueryError`
  /// - ストアの失敗
  pub fn search(&self, query: &str) -> StrlensResult<InterpretedSearch> {
    let filter = parse_natural_language(query)?;
    let records = self.list(&filter)?;
    Ok(InterpretedSearch { original: query.to_string(), filter, records })
  }

  /// 文字列の id でレコードを削除する。
  ///
  /// # Errors
  /// レコードが存在しなければ `StoreError::NotFound`
  pub fn delete(&self, id: &str) -> StrlensResult<()> {
    let id = parse_id(id)?;
    self.store.delete(&id)?;
    info!(%id, "文字列レコードを削除");
    Ok(())
  }

  /// 保存されているレコード数
  ///
  /// # Errors
  /// ストアの失敗
  pub fn count(&self) -> StrlensResult<usize> {
    self.store.len()
  }
}

fn parse_id(id: &str) -> Result<RecordId, StoreError> {
  id.parse().map_err(|_| StoreError::NotFound { id: id.to_string() })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::errors::StrlensError;
  use crate::filter::FilterClause;
  use crate::store::MemoryRecordStore;

  fn service() -> StringAnalyzerService {
    StringAnalyzerService::with_store(Arc::new(MemoryRecordStore::new()))
  }

  #[test]
  fn analyze_get_delete_flow() {
    let service = service();
    let record = service.analyze("level").unwrap();

    let fetched = service.get(&record.id.to_string()).unwrap();
    assert_eq!(fetched.properties(), record.properties());

    service.delete(&record.id.to_string()).unwrap();
    assert!(service.get(&record.id.to_string()).unwrap_err().is_not_found());
  }

  #[test]
  fn malformed_id_is_not_found() {
    let service = service();
    assert!(service.get("definitely-not-an-id").unwrap_err().is_not_found());
    assert!(service.delete("42").unwrap_err().is_not_found());
  }

  #[test]
  fn value_over_limit_is_rejected_and_not_stored() {
    let service = service().with_max_value_length(4);

    let err = service.analyze("hello").unwrap_err();
    assert!(matches!(
      err,
      StrlensError::Validation(ValidationError::ValueTooLong { actual: 5, max: 4 })
    ));
    assert_eq!(service.count().unwrap(), 0);

    // 上限ちょうどは受け付ける
    assert!(service.analyze("abcd").is_ok());
  }

  #[test]
  fn limit_counts_bytes() {
    let service = service().with_max_value_length(4);
    // 2文字だが6バイト
    assert!(service.analyze("東京").is_err());
  }

  #[test]
  fn search_reports_interpretation() {
    let service = service();
    for value in ["kayak", "hello", "a toyota"] {
      service.analyze(value).unwrap();
    }

    let result = service.search("single word palindromes").unwrap();
    assert_eq!(result.original, "single word palindromes");
    assert_eq!(
      result.filter.clauses(),
      [FilterClause::IsPalindrome(true), FilterClause::WordCount(1)]
    );
    let values: Vec<&str> = result.records.iter().map(|r| r.original_string.as_str()).collect();
    assert_eq!(values, ["kayak"]);
  }

  #[test]
  fn list_by_params_validates_keys() {
    let service = service();
    let err = service.list_by_params([("sort", "asc")]).unwrap_err();
    assert!(matches!(err, StrlensError::Validation(_)));
  }
}
