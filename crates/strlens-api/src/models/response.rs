//! レスポンスモデル定義

use std::collections::BTreeMap;

use chrono::SecondsFormat;
use serde::Serialize;

use strlens::AnalysisRecord;
use strlens::filter::RecordFilter;
use strlens::service::InterpretedSearch;

/// APIが返す解析レコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordResponse {
  /// レコードID（UUID）
  pub id: String,
  /// 入力テキスト
  pub original_string: String,
  /// 文字数
  pub length: usize,
  /// 回文かどうか
  pub is_palindrome: bool,
  /// 異なる文字の数
  pub unique_characters: usize,
  /// 空白区切りの単語数
  pub word_count: usize,
  /// SHA-256（16進数）
  pub sha256_hash: String,
  /// 文字ごとの出現回数
  pub character_frequency_map: BTreeMap<String, usize>,
  /// ISO-8601 UTC タイムスタンプ（ミリ秒精度）
  pub created_at: String,
}

impl From<AnalysisRecord> for RecordResponse {
  fn from(record: AnalysisRecord) -> Self {
    Self {
      id: record.id.to_string(),
      created_at: record.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
      original_string: record.original_string,
      length: record.length,
      is_palindrome: record.is_palindrome,
      unique_characters: record.unique_characters,
      word_count: record.word_count,
      sha256_hash: record.sha256_hash,
      character_frequency_map: record.character_frequency_map,
    }
  }
}

/// 自然言語クエリの解釈結果
#[derive(Debug, Clone, Serialize)]
pub struct InterpretedQuery {
  /// 受信したクエリ
  pub original: String,
  /// クエリから導出したフィルタパラメータ
  pub parsed_filters: RecordFilter,
}

/// `GET /strings/filter-by-natural-language` のレスポンス
#[derive(Debug, Clone, Serialize)]
pub struct NaturalLanguageResponse {
  /// マッチしたレコード
  pub data: Vec<RecordResponse>,
  /// マッチしたレコード数
  pub count: usize,
  /// クエリの解釈
  pub interpreted_query: InterpretedQuery,
}

impl From<InterpretedSearch> for NaturalLanguageResponse {
  fn from(search: InterpretedSearch) -> Self {
    let data: Vec<RecordResponse> = search.records.into_iter().map(RecordResponse::from).collect();
    Self {
      count: data.len(),
      data,
      interpreted_query: InterpretedQuery {
        original: search.original,
        parsed_filters: search.filter,
      },
    }
  }
}
