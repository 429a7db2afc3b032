//! errors モジュール
pub mod error_definition;

/// 主要なエラー型を再エクスポート
pub use error_definition::{
  ConfigError, QueryError, StoreError, StrlensError, StrlensResult, ValidationError,
};
