//! データモデル定義

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{CharacterFrequencyMap, StringProperties};
use crate::errors::ValidationError;

/// 解析レコードの識別子
///
/// ランダムな UUID (v4)。同時に生成しても衝突しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
  /// 新しい id を生成する
  #[must_use]
  pub fn new_random() -> Self {
    Self(Uuid::new_v4())
  }

  /// 既存の UUID をラップする
  #[must_use]
  pub fn from_uuid(uuid: Uuid) -> Self {
    Self(uuid)
  }

  /// 内部の UUID
  #[must_use]
  pub fn as_uuid(&self) -> &Uuid {
    &self.0
  }
}

impl fmt::Display for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl FromStr for RecordId {
  type Err = uuid::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Uuid::parse_str(s).map(Self)
  }
}

/// 1つの入力文字列に対する解析結果（永続化単位）
///
/// 派生フィールドは [`AnalysisRecord::create`] で一度だけ計算され、以後変更されない。
/// 更新操作は存在しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
  /// 一意な id
  pub id: RecordId,
  /// 送信されたままの入力テキスト
  pub original_string: String,
  /// 文字数
  pub length: usize,
  /// 回文かどうか
  pub is_palindrome: bool,
  /// 異なる文字の数
  pub unique_characters: usize,
  /// 空白区切りのトークン数
  pub word_count: usize,
  /// SHA-256 ダイジェスト（16進）
  pub sha256_hash: String,
  /// 文字ごとの出現回数
  pub character_frequency_map: CharacterFrequencyMap,
  /// 作成日時 (UTC)
  pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
  /// `value` を検証し、新しい id でレコードを作成する
  ///
  /// # Errors
  /// `value` が空の場合は `ValidationError::EmptyValue`
  pub fn create(value: &str) -> Result<Self, ValidationError> {
    validate_value(value)?;
    Ok(Self::from_parts(RecordId::new_random(), value.to_string(), Utc::now()))
  }

  /// 識別フィールドからレコードを組み立てる（派生フィールドはここで計算）
  #[must_use]
  pub fn from_parts(id: RecordId, original_string: String, created_at: DateTime<Utc>) -> Self {
    let StringProperties {
      length,
      is_palindrome,
      unique_characters,
      word_count,
      sha256_hash,
      character_frequency_map,
    } = StringProperties::compute(&original_string);

    Self {
      id,
      original_string,
      length,
      is_palindrome,
      unique_characters,
      word_count,
      sha256_hash,
      character_frequency_map,
      created_at,
    }
  }

  /// このレコードの派生フィールド
  #[must_use]
  pub fn properties(&self) -> StringProperties {
    StringProperties {
      length: self.length,
      is_palindrome: self.is_palindrome,
      unique_characters: self.unique_characters,
      word_count: self.word_count,
      sha256_hash: self.sha256_hash.clone(),
      character_frequency_map: self.character_frequency_map.clone(),
    }
  }

  /// 派生フィールドが `original_string` と一致しているか
  #[must_use]
  pub fn is_consistent(&self) -> bool {
    self.properties() == StringProperties::compute(&self.original_string)
  }
}

/// プロパティ計算に渡してはならない入力を拒否する
///
/// # Errors
/// `value` が空の場合は `ValidationError::EmptyValue`
pub fn validate_value(value: &str) -> Result<(), ValidationError> {
  if value.is_empty() {
    return Err(ValidationError::EmptyValue);
  }
  Ok(())
}
