//! プロパティ計算
//!
//! 文字列から派生フィールドを求める純粋関数群。
//! ストレージへのアクセスや入力検証は行わない（検証は呼び出し側で先に行う）。

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 文字 → 出現回数（文字順）
pub type CharacterFrequencyMap = BTreeMap<String, usize>;

/// 1つの文字列の派生プロパティ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringProperties {
  /// 文字数（Unicode スカラー値、空白を含む）
  pub length: usize,
  /// 回文判定（大文字小文字を区別せず、英数字以外を無視）
  pub is_palindrome: bool,
  /// 異なる文字の数（大文字小文字を区別、空白を含む）
  pub unique_characters: usize,
  /// 非空白文字の連続の数
  pub word_count: usize,
  /// UTF-8 バイト列の SHA-256（小文字16進）
  pub sha256_hash: String,
  /// 文字ごとの出現回数
  pub character_frequency_map: CharacterFrequencyMap,
}

impl StringProperties {
  /// `value` の全プロパティを計算する
  #[must_use]
  pub fn compute(value: &str) -> Self {
    Self {
      length: char_length(value),
      is_palindrome: is_palindrome(value),
      unique_characters: unique_characters(value),
      word_count: word_count(value),
      sha256_hash: sha256_hex(value),
      character_frequency_map: character_frequencies(value),
    }
  }
}

/// 文字数
#[must_use]
pub fn char_length(value: &str) -> usize {
  value.chars().count()
}

/// 小文字化して英数字以外を除いた後の回文判定
///
/// 英数字を含まない文字列は正規化すると空になり、回文とみなす。
#[must_use]
pub fn is_palindrome(value: &str) -> bool {
  let normalized: Vec<char> =
    value.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect();

  normalized.iter().eq(normalized.iter().rev())
}

/// 異なる文字の数
#[must_use]
pub fn unique_characters(value: &str) -> usize {
  value.chars().collect::<HashSet<char>>().len()
}

/// 空白区切りのトークン数
#[must_use]
pub fn word_count(value: &str) -> usize {
  value.split_whitespace().count()
}

/// SHA-256 ダイジェスト（小文字16進）
#[must_use]
pub fn sha256_hex(value: &str) -> String {
  format!("{:x}", Sha256::digest(value.as_bytes()))
}

/// 文字ごとの出現回数
#[must_use]
pub fn character_frequencies(value: &str) -> CharacterFrequencyMap {
  let mut map = CharacterFrequencyMap::new();
  for c in value.chars() {
    *map.entry(c.to_string()).or_insert(0) += 1;
  }
  map
}
