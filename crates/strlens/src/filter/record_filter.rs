//! 構造化レコードフィルタ
//!
//! [`RecordFilter`] は [`FilterClause`] の論理積。クエリ文字列のペア（構造化モード）
//! または自然言語クエリから構築し、ストアが返すレコードに対して評価する。

use std::collections::{BTreeMap, HashSet};

use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use super::natural_language::parse_natural_language;
use crate::errors::{StrlensResult, ValidationError};
use crate::models::AnalysisRecord;

/// [`RecordFilter::from_query_pairs`] が受け付けるパラメータ名（長さの下限）
pub const PARAM_MIN_LENGTH: &str = "min_length";
/// 長さの上限
pub const PARAM_MAX_LENGTH: &str = "max_length";
/// 回文フラグ
pub const PARAM_IS_PALINDROME: &str = "is_palindrome";
/// 部分文字列
pub const PARAM_CONTAINS: &str = "contains";
/// 単語数（完全一致）
pub const PARAM_WORD_COUNT: &str = "word_count";
/// 1文字
pub const PARAM_CONTAINS_CHARACTER: &str = "contains_character";
/// 自然言語クエリ
pub const PARAM_QUERY: &str = "q";

/// レコードに対する1つの条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterClause {
  /// `length >= n`
  MinLength(usize),
  /// `length <= n`
  MaxLength(usize),
  /// `is_palindrome == flag`
  IsPalindrome(bool),
  /// `word_count == n`
  WordCount(usize),
  /// `original_string` が部分文字列を含む（大文字小文字を区別）
  Contains(String),
  /// `original_string` が文字を含む（大文字小文字を区別）
  ContainsCharacter(char),
}

impl FilterClause {
  /// `record` に対してこの条件を評価する
  #[must_use]
  pub fn matches(&self, record: &AnalysisRecord) -> bool {
    match self {
      Self::MinLength(n) => record.length >= *n,
      Self::MaxLength(n) => record.length <= *n,
      Self::IsPalindrome(flag) => record.is_palindrome == *flag,
      Self::WordCount(n) => record.word_count == *n,
      Self::Contains(needle) => record.original_string.contains(needle.as_str()),
      Self::ContainsCharacter(c) => record.original_string.contains(*c),
    }
  }

  /// この条件に対応するパラメータ名
  #[must_use]
  pub fn name(&self) -> &'static str {
    match self {
      Self::MinLength(_) => PARAM_MIN_LENGTH,
      Self::MaxLength(_) => PARAM_MAX_LENGTH,
      Self::IsPalindrome(_) => PARAM_IS_PALINDROME,
      Self::WordCount(_) => PARAM_WORD_COUNT,
      Self::Contains(_) => PARAM_CONTAINS,
      Self::ContainsCharacter(_) => PARAM_CONTAINS_CHARACTER,
    }
  }

  fn value(&self) -> JsonValue {
    match self {
      Self::MinLength(n) | Self::MaxLength(n) | Self::WordCount(n) => JsonValue::from(*n),
      Self::IsPalindrome(flag) => JsonValue::Bool(*flag),
      Self::Contains(s) => JsonValue::String(s.clone()),
      Self::ContainsCharacter(c) => JsonValue::String(c.to_string()),
    }
  }
}

/// 条件の論理積。空のフィルタはすべてのレコードにマッチする
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
  clauses: Vec<FilterClause>,
}

impl RecordFilter {
  /// すべてのレコードにマッチするフィルタ
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// 条件を1つ追加するビルダー
  #[must_use]
  pub fn with(mut self, clause: FilterClause) -> Self {
    self.clauses.push(clause);
    self
  }

  /// 条件をその場で1つ追加する
  pub fn push(&mut self, clause: FilterClause) {
    self.clauses.push(clause);
  }

  /// 2つのフィルタを AND で結合する
  #[must_use]
  pub fn and(mut self, other: RecordFilter) -> Self {
    self.clauses.extend(other.clauses);
    self
  }

  /// 追加順の条件一覧
  #[must_use]
  pub fn clauses(&self) -> &[FilterClause] {
    &self.clauses
  }

  /// 条件が1つもなければ true
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.clauses.is_empty()
  }

  /// `record` がすべての条件を満たすか
  #[must_use]
  pub fn matches(&self, record: &AnalysisRecord) -> bool {
    self.clauses.iter().all(|clause| clause.matches(record))
  }

  /// URL クエリのペアからフィルタを構築する
  ///
  /// 受け付けるキーは `PARAM_*` 定数。`q` は自然言語クエリとして解析し、
  /// 構造化パラメータの条件と AND で結合する。
  ///
  /// # Errors
  /// - 未知のキー、重複したキー、不正な値: `ValidationError`
  /// - `q` を解析できない: `QueryError`
  pub fn from_query_pairs<I, K, V>(pairs: I) -> StrlensResult<Self>
  where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
  {
    let mut filter = Self::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (key, value) in pairs {
      let (key, value) = (key.as_ref(), value.as_ref());

      if !seen.insert(key.to_string()) {
        return Err(ValidationError::DuplicateParameter { name: key.to_string() }.into());
      }

      let clause = match key {
        PARAM_MIN_LENGTH => FilterClause::MinLength(parse_count(key, value)?),
        PARAM_MAX_LENGTH => FilterClause::MaxLength(parse_count(key, value)?),
        PARAM_WORD_COUNT => FilterClause::WordCount(parse_count(key, value)?),
        PARAM_IS_PALINDROME => FilterClause::IsPalindrome(parse_flag(key, value)?),
        PARAM_CONTAINS => {
          if value.is_empty() {
            return Err(invalid(key, value, "空にできません").into());
          }
          FilterClause::Contains(value.to_string())
        }
        PARAM_CONTAINS_CHARACTER => FilterClause::ContainsCharacter(parse_single_char(key, value)?),
        PARAM_QUERY => {
          filter = filter.and(parse_natural_language(value)?);
          continue;
        }
        _ => return Err(ValidationError::UnknownParameter { name: key.to_string() }.into()),
      };

      filter.push(clause);
    }

    Ok(filter)
  }

  /// このフィルタにマッチするレコードを順序を保ったまま選ぶ
  #[must_use]
  pub fn apply(&self, records: Vec<AnalysisRecord>) -> Vec<AnalysisRecord> {
    records.into_iter().filter(|record| self.matches(record)).collect()
  }
}

/// `{ "<param>": value }` 形式でシリアライズする。
/// 同じ種類の条件が複数あれば配列になる。
impl Serialize for RecordFilter {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut grouped: BTreeMap<&'static str, Vec<JsonValue>> = BTreeMap::new();
    for clause in &self.clauses {
      grouped.entry(clause.name()).or_default().push(clause.value());
    }

    let map: BTreeMap<&'static str, JsonValue> = grouped
      .into_iter()
      .map(|(name, mut values)| {
        let value =
          if values.len() == 1 { values.remove(0) } else { JsonValue::Array(values) };
        (name, value)
      })
      .collect();

    map.serialize(serializer)
  }
}

fn invalid(name: &str, value: &str, reason: &str) -> ValidationError {
  ValidationError::InvalidParameter {
    name: name.to_string(),
    value: value.to_string(),
    reason: reason.to_string(),
  }
}

fn parse_count(name: &str, value: &str) -> Result<usize, ValidationError> {
  value.trim().parse::<usize>().map_err(|_| invalid(name, value, "0 以上の整数が必要です"))
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ValidationError> {
  match value.trim().to_ascii_lowercase().as_str() {
    "true" => Ok(true),
    "false" => Ok(false),
    _ => Err(invalid(name, value, "true または false が必要です")),
  }
}

fn parse_single_char(name: &str, value: &str) -> Result<char, ValidationError> {
  let mut chars = value.chars();
  match (chars.next(), chars.next()) {
    (Some(c), None) => Ok(c),
    _ => Err(invalid(name, value, "ちょうど1文字が必要です")),
  }
}
