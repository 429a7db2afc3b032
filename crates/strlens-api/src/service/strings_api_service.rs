//! 文字列解析サービス

use strlens::StringAnalyzerService;

use crate::config::Config;
use crate::errors::Result;
use crate::models::{CreateStringRequest, NaturalLanguageResponse, RecordResponse};

/// 文字列解析サービスの共通インターフェース
///
/// 本番実装（`StringsApiServiceFull`）とテスト用スタブを差し替えられるようにする。
pub trait StringsApiService: Send + Sync {
  /// 値を解析して保存する
  ///
  /// # Errors
  /// - 入力エラー（空の値、長すぎる値）
  /// - 内部エラー
  fn create(&self, request: CreateStringRequest) -> Result<RecordResponse>;

  /// レコードを1件取得する
  ///
  /// # Errors
  /// 未検出、内部エラー
  fn get(&self, id: &str) -> Result<RecordResponse>;

  /// クエリ文字列のペアにマッチするレコードを返す
  ///
  /// # Errors
  /// 不正なパラメータ、解析できない `q`、内部エラー
  fn list(&self, params: Vec<(String, String)>) -> Result<Vec<RecordResponse>>;

  /// 自然言語クエリにマッチするレコードを解釈結果とともに返す
  ///
  /// # Errors
  /// 解析できないクエリ、内部エラー
  fn filter_natural_language(&self, query: &str) -> Result<NaturalLanguageResponse>;

  /// レコードを1件削除する
  ///
  /// # Errors
  /// 未検出、内部エラー
  fn delete(&self, id: &str) -> Result<()>;
}

/// strlens ライブラリを使う文字列解析サービス
#[derive(Clone)]
pub struct StringsApiServiceFull {
  inner: StringAnalyzerService,
}

impl StringsApiServiceFull {
  /// 設定されたストアを開いてサービスを初期化する
  ///
  /// 値の最大バイト数は `config.max_value_length` をライブラリ側に渡して検証させる。
  ///
  /// # Errors
  /// ストア設定が不正、またはストアを開けない場合にエラーを返す
  pub fn new(config: &Config) -> Result<Self> {
    let inner =
      StringAnalyzerService::init(&config.store)?.with_max_value_length(config.max_value_length);
    Ok(Self::with_analyzer(inner))
  }

  /// 既存の解析サービスをラップする
  #[must_use]
  pub fn with_analyzer(inner: StringAnalyzerService) -> Self {
    Self { inner }
  }
}

impl StringsApiService for StringsApiServiceFull {
  fn create(&self, request: CreateStringRequest) -> Result<RecordResponse> {
    let record = self.inner.analyze(&request.value)?;
    Ok(record.into())
  }

  fn get(&self, id: &str) -> Result<RecordResponse> {
    Ok(self.inner.get(id)?.into())
  }

  fn list(&self, params: Vec<(String, String)>) -> Result<Vec<RecordResponse>> {
    let records = self.inner.list_by_params(params)?;
    Ok(records.into_iter().map(RecordResponse::from).collect())
  }

  fn filter_natural_language(&self, query: &str) -> Result<NaturalLanguageResponse> {
    Ok(self.inner.search(query)?.into())
  }

  fn delete(&self, id: &str) -> Result<()> {
    Ok(self.inner.delete(id)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn create_test_service(max_value_length: usize) -> StringsApiServiceFull {
    let config = Config { max_value_length, ..Config::default() };
    StringsApiServiceFull::new(&config).expect("memory store should open")
  }

  fn request(value: &str) -> CreateStringRequest {
    CreateStringRequest { value: value.to_string() }
  }

  #[test]
  fn create_and_get() {
    let service = create_test_service(64);
    let created = service.create(request("Madam")).unwrap();
    assert!(created.is_palindrome);

    let fetched = service.get(&created.id).unwrap();
    assert_eq!(fetched, created);
  }

  #[test]
  fn empty_value_error() {
    let service = create_test_service(64);
    let err = service.create(request("")).unwrap_err();
    assert_eq!(err.code(), "invalid_input");
  }

  #[test]
  fn value_too_long_error() {
    let service = create_test_service(8);
    let err = service.create(request("way too long for this")).unwrap_err();
    assert_eq!(err.code(), "value_too_long");
    assert!(err.to_string().contains("21"));

    // 拒否した値は保存されない
    assert!(service.list(Vec::new()).unwrap().is_empty());
  }

  #[test]
  fn list_rejects_unknown_param() {
    let service = create_test_service(64);
    let err = service.list(vec![("limit".to_string(), "3".to_string())]).unwrap_err();
    assert_eq!(err.code(), "invalid_input");
  }

  #[test]
  fn delete_unknown_is_not_found() {
    let service = create_test_service(64);
    let err = service.delete("00000000-0000-0000-0000-000000000000").unwrap_err();
    assert_eq!(err.code(), "not_found");
  }
}
