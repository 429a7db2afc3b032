//! リクエストモデル定義

use serde::Deserialize;

/// `POST /strings` のボディ
#[derive(Debug, Deserialize)]
pub struct CreateStringRequest {
  /// 解析対象のテキスト
  pub value: String,
}

/// `GET /strings/filter-by-natural-language` のクエリ文字列
#[derive(Debug, Deserialize)]
pub struct NaturalLanguageParams {
  /// 自由記述のフィルタ
  pub query: Option<String>,
}
