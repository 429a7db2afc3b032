//! エラー定義

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// ストア設定 (`StoreConfig`) 関連のエラー
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum ConfigError {
  /// 未知のストア種別
  #[error("未知のストア種別です: {value}。有効な値: memory, sqlite")]
  UnknownStoreKind {
    /// 拒否された値
    value: String,
  },

  /// `sqlite` が選択されたがデータベースパスを決定できない
  #[error("sqlite ストアにはデータベースパスが必要ですが、データディレクトリーが見つかりません")]
  MissingSqlitePath,

  /// データベースパスがディレクトリーを指している
  #[error("sqlite データベースパスがディレクトリーです: path={path:?}")]
  SqlitePathIsDirectory {
    /// 問題のパス
    path: PathBuf,
  },

  /// データベースの親ディレクトリー作成に失敗
  #[error("データベースディレクトリーの作成に失敗しました: path={path:?}, error={source}")]
  DirectoryCreationFailed {
    /// 作成できなかったディレクトリー
    path: PathBuf,
    /// 元のIOエラー
    #[source]
    source: Arc<io::Error>,
  },

  /// busy_timeout は正の値である必要がある
  #[error("busy_timeout_ms は 1 以上である必要があります: actual={actual}")]
  InvalidBusyTimeout {
    /// 指定された値
    actual: u64,
  },
}

/// 入力検証エラー
///
/// 文字列がプロパティ計算に渡る前、およびフィルタエンジンが不正な構造化パラメータを
/// 受け取ったときに発生する。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
  /// 解析対象の値が空
  #[error("value は空でない文字列である必要があります")]
  EmptyValue,

  /// 値が許容サイズを超えている
  #[error("value が長すぎます: {actual} バイト（最大: {max} バイト）")]
  ValueTooLong {
    /// 拒否された値のバイト数
    actual: usize,
    /// 許容される最大バイト数
    max: usize,
  },

  /// 未知のフィルタパラメータ
  #[error("未知のフィルタパラメータです: {name}")]
  UnknownParameter {
    /// パラメータ名
    name: String,
  },

  /// 同じフィルタパラメータが複数回指定された
  #[error("フィルタパラメータが複数回指定されています: {name}")]
  DuplicateParameter {
    /// パラメータ名
    name: String,
  },

  /// フィルタパラメータの値を解釈できない
  #[error("{name} の値が不正です: {value:?} ({reason})")]
  InvalidParameter {
    /// パラメータ名
    name: String,
    /// 元の値
    value: String,
    /// 拒否の理由
    reason: String,
  },
}

/// 自然言語クエリのエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QueryError {
  /// クエリからフィルタを導出できない
  #[error("自然言語クエリを解析できません {query:?}: {reason}")]
  Unparseable {
    /// 受信したクエリ
    query: String,
    /// 失敗の内容
    reason: String,
  },
}

/// レコードストアのエラー
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum StoreError {
  /// 該当 id のレコードが存在しない
  #[error("文字列レコードが見つかりません: {id}")]
  NotFound {
    /// 呼び出し元が指定した id
    id: String,
  },

  /// SQLite のエラー
  #[error("sqlite エラー: {0}")]
  Sqlite(Arc<rusqlite::Error>),

  /// 永続化された行がレコードの不変条件を満たしていない
  #[error("ストア内のレコードが破損しています: id={id}, reason={reason}")]
  CorruptRecord {
    /// 行の id
    id: String,
    /// 満たされなかった不変条件
    reason: String,
  },

  /// 書き込み中の panic によりストアのロックが poisoned 状態
  #[error("レコードストアのロックが poisoned 状態です")]
  LockPoisoned,

  /// 文字頻度マップの (デ)シリアライズに失敗
  #[error("文字頻度マップのエンコードに失敗しました: id={id}, error={source}")]
  FrequencyMapEncoding {
    /// レコードの id
    id: String,
    /// 元のJSONエラー
    #[source]
    source: Arc<serde_json::Error>,
  },
}

impl From<rusqlite::Error> for StoreError {
  fn from(err: rusqlite::Error) -> Self {
    Self::Sqlite(Arc::new(err))
  }
}

/// 統合エラー型
///
/// このクレートの公開APIは `StrlensResult<T>` でこのエラーを返す。
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum StrlensError {
  /// 入力検証エラー
  #[error(transparent)]
  Validation(#[from] ValidationError),

  /// 自然言語クエリエラー
  #[error(transparent)]
  Query(#[from] QueryError),

  /// ストアエラー
  #[error(transparent)]
  Store(#[from] StoreError),

  /// 設定エラー
  #[error(transparent)]
  Config(#[from] ConfigError),
}

impl StrlensError {
  /// 要求されたレコードが存在しないことを表すエラーか
  #[must_use]
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::Store(StoreError::NotFound { .. }))
  }
}

/// strlens クレート標準の Result 型
pub type StrlensResult<T> = Result<T, StrlensError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn not_found_is_detected() {
    let err: StrlensError = StoreError::NotFound { id: "abc".to_string() }.into();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("abc"));
  }

  #[test]
  fn validation_is_not_not_found() {
    let err: StrlensError = ValidationError::EmptyValue.into();
    assert!(!err.is_not_found());
  }

  #[test]
  fn value_too_long_message_has_sizes() {
    let err = ValidationError::ValueTooLong { actual: 100, max: 50 };
    let message = err.to_string();
    assert!(message.contains("100"));
    assert!(message.contains("50"));
  }
}
