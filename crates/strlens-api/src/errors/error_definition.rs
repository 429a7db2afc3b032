//! APIエラー定義

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

// strlens クレートのエラー型をインポート
use strlens::errors::{QueryError, StoreError, StrlensError, ValidationError};

/// エラーの種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
  /// 入力値またはフィルタパラメータが無効
  InvalidInput,
  /// 値が最大サイズを超えている
  ValueTooLong,
  /// 自然言語クエリを解釈できない
  UnparseableQuery,
  /// リソースが存在しない（レコード・ルート）
  NotFound,
  /// ルートは存在するがメソッドが許可されていない
  MethodNotAllowed,
  /// リクエストがタイムアウトした
  Timeout,
  /// 内部エラー
  Internal,
  /// 設定エラー
  Config,
}

impl ApiErrorKind {
  /// エラーコードを取得
  #[must_use]
  pub fn code(&self) -> &'static str {
    match self {
      Self::InvalidInput => "invalid_input",
      Self::ValueTooLong => "value_too_long",
      Self::UnparseableQuery => "unparseable_query",
      Self::NotFound => "not_found",
      Self::MethodNotAllowed => "method_not_allowed",
      Self::Timeout => "request_timeout",
      Self::Internal => "internal_error",
      Self::Config => "config_error",
    }
  }

  /// HTTPステータスコードを取得
  #[must_use]
  pub fn status(&self) -> StatusCode {
    match self {
      Self::InvalidInput | Self::ValueTooLong | Self::UnparseableQuery => StatusCode::BAD_REQUEST,
      Self::NotFound => StatusCode::NOT_FOUND,
      Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
      Self::Timeout => StatusCode::REQUEST_TIMEOUT,
      Self::Internal | Self::Config => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

/// APIエラー
#[derive(Debug, Error)]
pub enum ApiError {
  /// 入力値が無効
  #[error("入力値が無効です: {0}")]
  InvalidInput(String),

  /// 値が長すぎる
  #[error("value が長すぎます: {0} バイト（最大: {1} バイト）")]
  ValueTooLong(usize, usize),

  /// 自然言語クエリを解析できない
  #[error("{0}")]
  UnparseableQuery(String),

  /// 見つからない
  #[error("{0}")]
  NotFound(String),

  /// メソッドが許可されていない
  #[error("{0}")]
  MethodNotAllowed(String),

  /// タイムアウト
  #[error("リクエストがタイムアウトしました: {0}")]
  Timeout(String),

  /// 内部エラー
  #[error("内部エラー: {0}")]
  Internal(String),

  /// 設定エラー
  #[error("設定エラー: {0}")]
  Config(String),
}

impl ApiError {
  /// エラーの種類を取得
  #[must_use]
  pub fn kind(&self) -> ApiErrorKind {
    match self {
      Self::InvalidInput(_) => ApiErrorKind::InvalidInput,
      Self::ValueTooLong(_, _) => ApiErrorKind::ValueTooLong,
      Self::UnparseableQuery(_) => ApiErrorKind::UnparseableQuery,
      Self::NotFound(_) => ApiErrorKind::NotFound,
      Self::MethodNotAllowed(_) => ApiErrorKind::MethodNotAllowed,
      Self::Timeout(_) => ApiErrorKind::Timeout,
      Self::Internal(_) => ApiErrorKind::Internal,
      Self::Config(_) => ApiErrorKind::Config,
    }
  }

  /// エラーコードを取得
  #[must_use]
  pub fn code(&self) -> &'static str {
    self.kind().code()
  }

  /// HTTPステータスコードを取得
  #[must_use]
  pub fn status(&self) -> StatusCode {
    self.kind().status()
  }

  /// 入力エラーを作成
  #[must_use]
  pub fn invalid_input(message: impl Into<String>) -> Self {
    Self::InvalidInput(message.into())
  }

  /// 値長超過エラーを作成
  #[must_use]
  pub fn value_too_long(actual: usize, max: usize) -> Self {
    Self::ValueTooLong(actual, max)
  }

  /// クエリ解析エラーを作成
  #[must_use]
  pub fn unparseable_query(message: impl Into<String>) -> Self {
    Self::UnparseableQuery(message.into())
  }

  /// 未検出エラーを作成
  #[must_use]
  pub fn not_found(message: impl Into<String>) -> Self {
    Self::NotFound(message.into())
  }

  /// メソッド不許可エラーを作成
  #[must_use]
  pub fn method_not_allowed(message: impl Into<String>) -> Self {
    Self::MethodNotAllowed(message.into())
  }

  /// タイムアウトエラーを作成
  #[must_use]
  pub fn timeout(message: impl Into<String>) -> Self {
    Self::Timeout(message.into())
  }

  /// 内部エラーを作成
  #[must_use]
  pub fn internal(message: impl Into<String>) -> Self {
    Self::Internal(message.into())
  }

  /// 設定エラーを作成
  #[must_use]
  pub fn config(message: impl Into<String>) -> Self {
    Self::Config(message.into())
  }
}

/// エラーレスポンスのJSONボディ
#[derive(Serialize)]
struct ErrorResponse {
  detail: String,
  code: &'static str,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(code = self.code(), error = %self, "リクエスト処理に失敗");
    } else {
      tracing::debug!(code = self.code(), error = %self, "リクエストを拒否");
    }

    let body = ErrorResponse {
      detail: self.to_string(),
      code: self.code(),
    };

    (status, Json(body)).into_response()
  }
}

/// StrlensError から ApiError への変換
///
/// ドメインエラーをAPIエラーにマッピングする。
impl From<StrlensError> for ApiError {
  fn from(err: StrlensError) -> Self {
    match err {
      StrlensError::Validation(ValidationError::ValueTooLong { actual, max }) => {
        ApiError::value_too_long(actual, max)
      }
      StrlensError::Validation(err) => ApiError::invalid_input(err.to_string()),
      StrlensError::Query(err @ QueryError::Unparseable { .. }) => {
        ApiError::unparseable_query(err.to_string())
      }
      StrlensError::Store(err @ StoreError::NotFound { .. }) => ApiError::not_found(err.to_string()),
      StrlensError::Config(err) => ApiError::config(err.to_string()),
      StrlensError::Store(_) => ApiError::internal(format!("ストアエラー: {err}")),
      // StrlensError と内部の enum は #[non_exhaustive]
      _ => ApiError::internal(format!("不明なエラー: {err}")),
    }
  }
}

/// JSON ボディの不正・型違いはクライアントの入力エラー
impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::invalid_input(rejection.body_text())
  }
}

/// クエリ文字列の不正はクライアントの入力エラー
impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    ApiError::invalid_input(rejection.body_text())
  }
}

/// パスパラメータの不正（不正な UTF-8 など）はクライアントの入力エラー
impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    ApiError::invalid_input(rejection.body_text())
  }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, ApiError>;
