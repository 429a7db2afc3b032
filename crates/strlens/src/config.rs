// crates/strlens/src/config.rs

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::errors::ConfigError;

/// SQLite の busy timeout 既定値（ミリ秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// プラットフォームのデータディレクトリー配下のディレクトリー名
const DATA_DIR_NAME: &str = "strlens";

/// 既定のデータベースファイル名
const DB_FILE_NAME: &str = "records.db";

/// レコードストアのバックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
  /// プロセス内ストア（終了時に消える）
  #[default]
  Memory,
  /// SQLite データベースファイル
  Sqlite,
}

impl StoreKind {
  /// 設定値で使う名前
  pub fn name(&self) -> &'static str {
    match self {
      StoreKind::Memory => "memory",
      StoreKind::Sqlite => "sqlite",
    }
  }
}

impl std::fmt::Display for StoreKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.name())
  }
}

impl FromStr for StoreKind {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "memory" => Ok(Self::Memory),
      "sqlite" => Ok(Self::Sqlite),
      _ => Err(ConfigError::UnknownStoreKind { value: s.to_string() }),
    }
  }
}

/// レコードストア設定
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  /// 使用するバックエンド
  #[serde(default)]
  pub kind: StoreKind,
  /// SQLite データベースファイル
  ///
  /// 省略時は `<data dir>/strlens/records.db` を使用する。
  #[serde(default)]
  pub sqlite_path: Option<PathBuf>,
  /// ロック中のデータベースを SQLite が待つ時間（ミリ秒）
  #[serde(default = "default_busy_timeout_ms")]
  pub busy_timeout_ms: u64,
}

fn default_busy_timeout_ms() -> u64 {
  DEFAULT_BUSY_TIMEOUT_MS
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      kind: StoreKind::Memory,
      sqlite_path: None,
      busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
    }
  }
}

impl StoreConfig {
  /// メモリストアの設定
  pub fn memory() -> Self {
    Self::default()
  }

  /// `path` の SQLite ストアの設定
  pub fn sqlite(path: impl Into<PathBuf>) -> Self {
    Self {
      kind: StoreKind::Sqlite,
      sqlite_path: Some(path.into()),
      ..Self::default()
    }
  }

  /// SQLite バックエンドが実際に使うデータベースパス
  ///
  /// `sqlite_path` が未設定ならプラットフォームのデータディレクトリーを使う。
  pub fn resolved_sqlite_path(&self) -> Result<PathBuf, ConfigError> {
    match &self.sqlite_path {
      Some(path) => Ok(path.clone()),
      None => dirs::data_dir()
        .map(|dir| dir.join(DATA_DIR_NAME).join(DB_FILE_NAME))
        .ok_or(ConfigError::MissingSqlitePath),
    }
  }

  /// 設定を検証し、データベースディレクトリーを準備する
  ///
  /// # Errors
  /// - busy timeout が 0
  /// - SQLite パスがディレクトリー、または親ディレクトリーを作成できない
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.busy_timeout_ms == 0 {
      return Err(ConfigError::InvalidBusyTimeout { actual: self.busy_timeout_ms });
    }

    if self.kind == StoreKind::Memory {
      return Ok(());
    }

    let path = self.resolved_sqlite_path()?;
    if path.is_dir() {
      return Err(ConfigError::SqlitePathIsDirectory { path });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent).map_err(|e| ConfigError::DirectoryCreationFailed {
        path: parent.to_path_buf(),
        source: Arc::new(e),
      })?;
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn store_kind_from_str() {
    assert_eq!(StoreKind::from_str("memory").unwrap(), StoreKind::Memory);
    assert_eq!(StoreKind::from_str("SQLite").unwrap(), StoreKind::Sqlite);
    assert!(matches!(
      StoreKind::from_str("redis"),
      Err(ConfigError::UnknownStoreKind { .. })
    ));
  }

  #[test]
  fn store_config_deserializes_with_defaults() {
    let config: StoreConfig = serde_json::from_str(r#"{ "kind": "sqlite" }"#).unwrap();
    assert_eq!(config.kind, StoreKind::Sqlite);
    assert!(config.sqlite_path.is_none());
    assert_eq!(config.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
  }

  #[test]
  fn memory_config_is_valid() {
    assert!(StoreConfig::memory().validate().is_ok());
  }

  #[test]
  fn zero_busy_timeout_is_invalid() {
    let config = StoreConfig { busy_timeout_ms: 0, ..StoreConfig::memory() };
    assert!(matches!(config.validate(), Err(ConfigError::InvalidBusyTimeout { actual: 0 })));
  }

  #[test]
  fn sqlite_path_creates_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("records.db");
    let config = StoreConfig::sqlite(&path);

    config.validate().unwrap();
    assert!(path.parent().unwrap().is_dir());
    assert_eq!(config.resolved_sqlite_path().unwrap(), path);
  }

  #[test]
  fn sqlite_path_pointing_to_directory_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::sqlite(dir.path());
    assert!(matches!(config.validate(), Err(ConfigError::SqlitePathIsDirectory { .. })));
  }
}
