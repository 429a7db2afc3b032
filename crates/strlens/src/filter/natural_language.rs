//! 自然言語フィルタクエリ
//!
//! "single word palindromic strings" や "strings longer than 10 characters"
//! のような英語フレーズを、キーワードとパターンの照合で [`RecordFilter`] に変換する。
//! 句が1つも得られないクエリは拒否する（ベストエフォートのフォールバックはしない）。
//!
//! # 照合の順序
//!
//! 各パターンは照合した範囲を「消費済み」としてマスクする。
//! 1つの数値や単語が2つの句に使われることはない。
//! (例: "longer than 3 words" は `MinLength(4)` のみ、
//! "containing 3 words" は `WordCount(3)` のみ)

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::record_filter::{FilterClause, RecordFilter};
use crate::errors::QueryError;

/// 消費済み範囲を埋める文字（`\S` にはマッチし、単語文字ではない）
const CONSUMED: char = '\u{1}';

/// "contains" の直後に来ても引数にならない語
const CONTAIN_FILLER_WORDS: [&str; 7] =
  ["the", "letter", "letters", "character", "characters", "word", "text"];

static CONTAIN_QUOTED: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?i)\bcontain(?:s|ing)?\s+(?:the\s+)?(?:text\s+|word\s+)?(?:"([^"]+)"|'([^']+)')"#)
    .expect("Invalid regex: contain quoted pattern")
});

static PALINDROME: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\b(?:(not|non)[\s-]?(?:an?\s+)?)?palindrom(?:e|es|ic)\b")
    .expect("Invalid regex: palindrome pattern")
});

static LONGER_KEYWORD: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\blonger\s+than\b").expect("Invalid regex: longer keyword"));

static LONGER_THAN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\blonger\s+than\s+(\d+)\b").expect("Invalid regex: longer than pattern")
});

static SHORTER_KEYWORD: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\bshorter\s+than\b").expect("Invalid regex: shorter keyword"));

static SHORTER_THAN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\bshorter\s+than\s+(\d+)\b").expect("Invalid regex: shorter than pattern")
});

static AT_LEAST: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\bat\s+least\s+(\d+)\s+(?:characters?|chars?|letters?)\b")
    .expect("Invalid regex: at least pattern")
});

static AT_MOST: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\bat\s+most\s+(\d+)\s+(?:characters?|chars?|letters?)\b")
    .expect("Invalid regex: at most pattern")
});

static WORD_COUNT: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\b(single|one|two|three|four|five|six|seven|eight|nine|ten|\d+)[\s-]words?\b")
    .expect("Invalid regex: word count pattern")
});

static CONTAIN_KEYWORD: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\bcontain(?:s|ing)?\b").expect("Invalid regex: contain keyword"));

static CONTAIN_FIRST_VOWEL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\bcontain(?:s|ing)?\s+(?:the\s+)?first\s+vowel\b")
    .expect("Invalid regex: first vowel pattern")
});

static CONTAIN_LETTER: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\bcontain(?:s|ing)?\s+(?:the\s+|a\s+|an\s+)?(?:letter|character)\s+(\S)")
    .expect("Invalid regex: contain letter pattern")
});

static CONTAIN_WORD: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\bcontain(?:s|ing)?\s+(?:the\s+)?(?:word\s+)?(\S+)")
    .expect("Invalid regex: contain word pattern")
});

/// "contains" の引数の解釈結果
enum ContainArgument {
  /// 引数から得られた句
  Clause(FilterClause),
  /// 引数が他の句に消費済み（"containing 3 words" など）
  Claimed,
  /// 引数がない
  Missing,
}

/// 自由記述のクエリを [`RecordFilter`] に変換する
///
/// 認識するフレーズ（大文字小文字を区別しない）:
/// - `palindromic` / `palindrome(s)`。直前の `not` / `non` で否定
/// - `single word`, `N words`
/// - `longer than N`, `shorter than N`
/// - `at least N characters`, `at most N characters`
/// - `containing the letter X`, `containing the first vowel`,
///   `containing "text"`, `containing X`
///
/// 1文字の引数は小文字化する。複数文字の単語と引用符内のテキストは大文字小文字を保持する。
///
/// 結果の句の順序は上の一覧の順（引用符付きの contains は末尾）。
///
/// # Errors
/// 次の場合に `QueryError::Unparseable`:
/// - クエリが空白のみ
/// - 認識したフレーズに引数がない（"longer than", 末尾の "contains the letter" など）
/// - フレーズを1つも認識できない
pub fn parse_natural_language(query: &str) -> Result<RecordFilter, QueryError> {
  let unparseable = |reason: &str| QueryError::Unparseable {
    query: query.to_string(),
    reason: reason.to_string(),
  };

  if query.trim().is_empty() {
    return Err(unparseable("クエリが空です"));
  }

  let mut text = query.to_string();

  // 引用符内の語が他のパターンに拾われないよう最初に消費する
  let quoted = take(&CONTAIN_QUOTED, &mut text).map(|groups| {
    let quoted_text = groups.into_iter().flatten().next().unwrap_or_default();
    FilterClause::Contains(quoted_text)
  });

  let is_palindrome = take(&PALINDROME, &mut text).map(|groups| groups[0].is_none());

  let longer = if LONGER_KEYWORD.is_match(&text) {
    let n = take_number(&LONGER_THAN, &mut text)
      .ok_or_else(|| unparseable("'longer than' の後に数値が必要です"))?;
    Some(n.saturating_add(1))
  } else {
    None
  };

  let shorter = if SHORTER_KEYWORD.is_match(&text) {
    let n = take_number(&SHORTER_THAN, &mut text)
      .ok_or_else(|| unparseable("'shorter than' の後に数値が必要です"))?;
    Some(n.saturating_sub(1))
  } else {
    None
  };

  let at_least = match take(&AT_LEAST, &mut text) {
    Some(groups) => Some(parse_group(&groups).ok_or_else(|| unparseable("長さが範囲外です"))?),
    None => None,
  };

  let at_most = match take(&AT_MOST, &mut text) {
    Some(groups) => Some(parse_group(&groups).ok_or_else(|| unparseable("長さが範囲外です"))?),
    None => None,
  };

  let word_count = match take(&WORD_COUNT, &mut text) {
    Some(groups) => {
      let word = groups[0].as_deref().unwrap_or_default();
      Some(word_number(word).ok_or_else(|| unparseable("単語数が範囲外です"))?)
    }
    None => None,
  };

  let contains = if CONTAIN_KEYWORD.is_match(&text) {
    match contain_argument(&text) {
      ContainArgument::Clause(clause) => Some(clause),
      ContainArgument::Claimed => None,
      ContainArgument::Missing => {
        return Err(unparseable("'contains' の後に文字またはテキストが必要です"));
      }
    }
  } else {
    None
  };

  let mut filter = RecordFilter::new();
  if let Some(flag) = is_palindrome {
    filter.push(FilterClause::IsPalindrome(flag));
  }
  if let Some(n) = word_count {
    filter.push(FilterClause::WordCount(n));
  }
  if let Some(n) = longer {
    filter.push(FilterClause::MinLength(n));
  }
  if let Some(n) = shorter {
    filter.push(FilterClause::MaxLength(n));
  }
  if let Some(n) = at_least {
    filter.push(FilterClause::MinLength(n));
  }
  if let Some(n) = at_most {
    filter.push(FilterClause::MaxLength(n));
  }
  for clause in contains.into_iter().chain(quoted) {
    filter.push(clause);
  }

  if filter.is_empty() {
    return Err(unparseable("認識できるフィルタがありません"));
  }

  debug!(query, clauses = filter.clauses().len(), "自然言語クエリを解析");
  Ok(filter)
}

/// `pattern` の最初の一致を消費し、キャプチャグループ（1番目以降）を返す
fn take(pattern: &Regex, text: &mut String) -> Option<Vec<Option<String>>> {
  let (range, groups) = {
    let caps = pattern.captures(text.as_str())?;
    let whole = caps.get(0)?;
    let groups: Vec<Option<String>> =
      caps.iter().skip(1).map(|m| m.map(|m| m.as_str().to_string())).collect();
    (whole.range(), groups)
  };
  consume(text, range);
  Some(groups)
}

fn take_number(pattern: &Regex, text: &mut String) -> Option<usize> {
  parse_group(&take(pattern, text)?)
}

fn parse_group(groups: &[Option<String>]) -> Option<usize> {
  groups.first()?.as_deref()?.parse().ok()
}

fn consume(text: &mut String, range: Range<usize>) {
  let filler: String = std::iter::repeat_n(CONSUMED, range.len()).collect();
  text.replace_range(range, &filler);
}

fn word_number(word: &str) -> Option<usize> {
  let n = match word.to_lowercase().as_str() {
    "single" | "one" => 1,
    "two" => 2,
    "three" => 3,
    "four" => 4,
    "five" => 5,
    "six" => 6,
    "seven" => 7,
    "eight" => 8,
    "nine" => 9,
    "ten" => 10,
    digits => return digits.parse().ok(),
  };
  Some(n)
}

fn contain_argument(text: &str) -> ContainArgument {
  if CONTAIN_FIRST_VOWEL.is_match(text) {
    return ContainArgument::Clause(FilterClause::ContainsCharacter('a'));
  }

  if let Some(letter) =
    CONTAIN_LETTER.captures(text).and_then(|caps| caps.get(1)?.as_str().chars().next())
  {
    if letter == CONSUMED {
      return ContainArgument::Claimed;
    }
    return ContainArgument::Clause(FilterClause::ContainsCharacter(lowercase_char(letter)));
  }

  let Some(raw) = CONTAIN_WORD.captures(text).and_then(|caps| caps.get(1)) else {
    return ContainArgument::Missing;
  };
  let raw = raw.as_str();
  if raw.starts_with(CONSUMED) {
    return ContainArgument::Claimed;
  }

  let trimmed = raw.trim_end_matches(|c: char| c.is_ascii_punctuation() || c == CONSUMED);
  let word = if trimmed.is_empty() { raw } else { trimmed };
  if CONTAIN_FILLER_WORDS.iter().any(|filler| word.eq_ignore_ascii_case(filler)) {
    return ContainArgument::Missing;
  }

  let mut chars = word.chars();
  match (chars.next(), chars.next()) {
    (Some(c), None) => ContainArgument::Clause(FilterClause::ContainsCharacter(lowercase_char(c))),
    _ => ContainArgument::Clause(FilterClause::Contains(word.to_string())),
  }
}

fn lowercase_char(c: char) -> char {
  let mut lower = c.to_lowercase();
  match (lower.next(), lower.next()) {
    (Some(l), None) => l,
    _ => c,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn clauses(query: &str) -> Vec<FilterClause> {
    parse_natural_language(query).unwrap().clauses().to_vec()
  }

  #[test]
  fn single_word_palindromes() {
    assert_eq!(
      clauses("all single word palindromic strings"),
      [FilterClause::IsPalindrome(true), FilterClause::WordCount(1)]
    );
  }

  #[test]
  fn longer_than_is_exclusive() {
    assert_eq!(clauses("strings longer than 10 characters"), [FilterClause::MinLength(11)]);
  }

  #[test]
  fn shorter_than_is_exclusive_and_saturates() {
    assert_eq!(clauses("strings shorter than 5"), [FilterClause::MaxLength(4)]);
    assert_eq!(clauses("strings shorter than 0"), [FilterClause::MaxLength(0)]);
  }

  #[test]
  fn inclusive_bounds() {
    assert_eq!(
      clauses("at least 3 characters and at most 8 chars"),
      [FilterClause::MinLength(3), FilterClause::MaxLength(8)]
    );
  }

  #[test]
  fn first_vowel_means_a() {
    assert_eq!(
      clauses("palindromic strings that contain the first vowel"),
      [FilterClause::IsPalindrome(true), FilterClause::ContainsCharacter('a')]
    );
  }

  #[test]
  fn letter_is_extracted() {
    assert_eq!(
      clauses("strings containing the letter Z"),
      [FilterClause::ContainsCharacter('z')]
    );
  }

  #[test]
  fn bare_single_character() {
    assert_eq!(clauses("strings that contain x."), [FilterClause::ContainsCharacter('x')]);
    assert_eq!(clauses("strings that contain Q"), [FilterClause::ContainsCharacter('q')]);
  }

  #[test]
  fn quoted_text_keeps_case() {
    assert_eq!(
      clauses(r#"strings containing "Hello W""#),
      [FilterClause::Contains("Hello W".to_string())]
    );
  }

  #[test]
  fn quoted_text_is_not_read_as_other_phrases() {
    assert_eq!(
      clauses(r#"palindromes containing "two words""#),
      [FilterClause::IsPalindrome(true), FilterClause::Contains("two words".to_string())]
    );
  }

  #[test]
  fn bare_word_keeps_case() {
    assert_eq!(clauses("contains world"), [FilterClause::Contains("world".to_string())]);
    assert_eq!(clauses("contains World!"), [FilterClause::Contains("World".to_string())]);
  }

  #[test]
  fn negated_palindrome() {
    assert_eq!(clauses("non-palindromic strings"), [FilterClause::IsPalindrome(false)]);
    assert_eq!(clauses("strings that are not palindromes"), [FilterClause::IsPalindrome(false)]);
    assert_eq!(clauses("words that are not a palindrome"), [FilterClause::IsPalindrome(false)]);
  }

  #[test]
  fn counted_words() {
    assert_eq!(clauses("two words"), [FilterClause::WordCount(2)]);
    assert_eq!(clauses("strings with 3 words"), [FilterClause::WordCount(3)]);
  }

  #[test]
  fn word_count_after_contains_is_not_a_character() {
    assert_eq!(clauses("strings containing 3 words"), [FilterClause::WordCount(3)]);
    assert_eq!(clauses("strings that contain two words"), [FilterClause::WordCount(2)]);
  }

  #[test]
  fn length_number_is_not_a_word_count() {
    assert_eq!(clauses("strings longer than 3 words"), [FilterClause::MinLength(4)]);
    assert_eq!(clauses("strings shorter than 4 words"), [FilterClause::MaxLength(3)]);
  }

  #[test]
  fn case_insensitive_keywords() {
    assert_eq!(clauses("PALINDROMES Longer Than 2"), [
      FilterClause::IsPalindrome(true),
      FilterClause::MinLength(3)
    ]);
  }

  #[test]
  fn gibberish_is_rejected() {
    let err = parse_natural_language("show me the good ones").unwrap_err();
    let QueryError::Unparseable { reason, .. } = err;
    assert!(reason.contains("認識できるフィルタがありません"));
  }

  #[test]
  fn blank_is_rejected() {
    assert!(parse_natural_language("   ").is_err());
  }

  #[test]
  fn missing_number_is_rejected() {
    assert!(parse_natural_language("strings longer than ten").is_err());
    assert!(parse_natural_language("shorter than").is_err());
  }

  #[test]
  fn dangling_contains_is_rejected() {
    for query in [
      "palindromes that contain",
      "strings that contain the letter",
      "strings that contain the character",
      "strings that contain the word",
      "strings that contain the text",
      "strings that contain the",
    ] {
      let err = parse_natural_language(query).unwrap_err();
      let QueryError::Unparseable { reason, .. } = err;
      assert!(reason.contains("contains"), "query {query:?}: {reason}");
    }
  }
}
