//! crates/strlens/tests/integration_test.rs
//!
//! エンドツーエンドの統合テスト
//! ストアのオープン → 文字列解析 → フィルタ → 自然言語検索 → 削除 →
//! 再オープンして永続化を確認、という一連の流れを検証する。

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use strlens::StringAnalyzerService;
use strlens::config::StoreConfig;
use strlens::errors::{QueryError, StrlensError, ValidationError};

/// 回文・複数単語・記号を含むサンプル入力
fn sample_values() -> Vec<&'static str> {
  vec![
    "A man a plan a canal Panama",
    "hello",
    "racecar",
    "The quick brown fox jumps over the lazy dog",
    "noon",
    "zebra",
  ]
}

fn sqlite_service(dir: &TempDir) -> StringAnalyzerService {
  let config = StoreConfig::sqlite(dir.path().join("records.db"));
  StringAnalyzerService::init(&config).expect("sqlite store should open")
}

fn originals(records: &[strlens::AnalysisRecord]) -> Vec<&str> {
  records.iter().map(|r| r.original_string.as_str()).collect()
}

#[test]
fn analyze_and_filter_flow_on_sqlite() {
  let dir = TempDir::new().unwrap();
  let service = sqlite_service(&dir);

  for value in sample_values() {
    service.analyze(value).unwrap();
  }
  assert_eq!(service.count().unwrap(), 6);

  let long = service.list_by_params([("min_length", "5")]).unwrap();
  assert!(long.iter().all(|r| r.length >= 5));
  assert_eq!(long.len(), 5);

  let none = service.list_by_params([("min_length", "10"), ("max_length", "5")]).unwrap();
  assert!(none.is_empty());

  let palindromes = service.list_by_params([("is_palindrome", "true")]).unwrap();
  assert_eq!(originals(&palindromes), ["A man a plan a canal Panama", "racecar", "noon"]);

  let search = service.search("strings containing the letter z").unwrap();
  assert_eq!(originals(&search.records), ["The quick brown fox jumps over the lazy dog", "zebra"]);
}

#[test]
fn records_survive_reopen() {
  let dir = TempDir::new().unwrap();

  let (kept, removed) = {
    let service = sqlite_service(&dir);
    let kept = service.analyze("persistent").unwrap();
    let removed = service.analyze("temporary").unwrap();
    service.delete(&removed.id.to_string()).unwrap();
    (kept, removed)
  };

  let reopened = sqlite_service(&dir);
  let fetched = reopened.get(&kept.id.to_string()).unwrap();
  assert_eq!(fetched, kept);
  assert!(reopened.get(&removed.id.to_string()).unwrap_err().is_not_found());
  assert_eq!(reopened.count().unwrap(), 1);
}

#[test]
fn empty_value_is_a_validation_error() {
  let service = StringAnalyzerService::init(&StoreConfig::memory()).unwrap();
  let err = service.analyze("").unwrap_err();
  assert!(matches!(err, StrlensError::Validation(ValidationError::EmptyValue)));
  assert_eq!(service.count().unwrap(), 0);
}

#[test]
fn unparseable_search_is_rejected() {
  let service = StringAnalyzerService::init(&StoreConfig::memory()).unwrap();
  let err = service.search("whatever you think is best").unwrap_err();
  assert!(matches!(err, StrlensError::Query(QueryError::Unparseable { .. })));
}

#[test]
fn concurrent_creates_on_sqlite_never_collide() {
  let dir = TempDir::new().unwrap();
  let service = Arc::new(sqlite_service(&dir));

  let handles: Vec<_> = (0..4)
    .map(|t| {
      let service = Arc::clone(&service);
      thread::spawn(move || {
        (0..10)
          .map(|i| service.analyze(&format!("thread {t} value {i}")).unwrap().id)
          .collect::<Vec<_>>()
      })
    })
    .collect();

  let ids: HashSet<_> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
  assert_eq!(ids.len(), 40);
  assert_eq!(service.count().unwrap(), 40);
}
