//! 環境変数からの設定読み込み

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use strlens::config::{DEFAULT_BUSY_TIMEOUT_MS, StoreConfig, StoreKind};

use super::constants::{
  DEFAULT_BIND_ADDR, DEFAULT_MAX_VALUE_LENGTH, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_STORE_KIND,
};
use crate::errors::ApiError;

/// 環境変数名
const ENV_BIND_ADDR: &str = "STRLENS_API_BIND_ADDR";
const ENV_STORE: &str = "STRLENS_STORE";
const ENV_DB_PATH: &str = "STRLENS_DB_PATH";
const ENV_DB_BUSY_TIMEOUT_MS: &str = "STRLENS_DB_BUSY_TIMEOUT_MS";
const ENV_REQUEST_TIMEOUT_SECS: &str = "STRLENS_REQUEST_TIMEOUT_SECS";
const ENV_MAX_VALUE_LENGTH: &str = "STRLENS_MAX_VALUE_LENGTH";

/// APIサーバー設定
#[derive(Debug, Clone)]
pub struct Config {
  /// バインドアドレス (例: "127.0.0.1:5540")
  pub bind_addr: String,
  /// レコードストア設定
  pub store: StoreConfig,
  /// 受け付ける `value` の最大バイト数
  pub max_value_length: usize,
  /// ルーターが適用するリクエストごとのタイムアウト
  pub request_timeout: Duration,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      bind_addr: DEFAULT_BIND_ADDR.to_string(),
      store: StoreConfig::memory(),
      max_value_length: DEFAULT_MAX_VALUE_LENGTH,
      request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
    }
  }
}

impl Config {
  /// 環境変数から設定を読み込む
  ///
  /// # Errors
  /// 環境変数の値が不正な場合にエラーを返す
  pub fn from_env() -> crate::errors::Result<Self> {
    let bind_addr = std::env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    let store_kind_str =
      std::env::var(ENV_STORE).unwrap_or_else(|_| DEFAULT_STORE_KIND.to_string());
    let kind = StoreKind::from_str(&store_kind_str).map_err(|e| ApiError::config(e.to_string()))?;

    let store = StoreConfig {
      kind,
      sqlite_path: std::env::var_os(ENV_DB_PATH).map(PathBuf::from),
      busy_timeout_ms: env_number(ENV_DB_BUSY_TIMEOUT_MS, DEFAULT_BUSY_TIMEOUT_MS)?,
    };

    let max_value_length = env_number(ENV_MAX_VALUE_LENGTH, DEFAULT_MAX_VALUE_LENGTH)?;
    let timeout_secs = env_number(ENV_REQUEST_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS)?;
    if timeout_secs == 0 {
      return Err(ApiError::config(format!("{ENV_REQUEST_TIMEOUT_SECS} は 1 以上である必要があります")));
    }

    Ok(Self {
      bind_addr,
      store,
      max_value_length,
      request_timeout: Duration::from_secs(timeout_secs),
    })
  }
}

/// 数値の環境変数を読む（未設定なら `default`）
fn env_number<T>(name: &str, default: T) -> crate::errors::Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match std::env::var(name) {
    Ok(raw) => parse_number(name, &raw),
    Err(_) => Ok(default),
  }
}

fn parse_number<T>(name: &str, raw: &str) -> crate::errors::Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  raw.trim().parse::<T>().map_err(|e| ApiError::config(format!("{name}={raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_number_accepts_digits() {
    assert_eq!(parse_number::<u64>("X", " 15 ").unwrap(), 15);
  }

  #[test]
  fn parse_number_rejects_garbage() {
    let err = parse_number::<usize>("STRLENS_MAX_VALUE_LENGTH", "lots").unwrap_err();
    assert_eq!(err.code(), "config_error");
    assert!(err.to_string().contains("STRLENS_MAX_VALUE_LENGTH"));
  }

  #[test]
  fn default_config_uses_memory_store() {
    let config = Config::default();
    assert_eq!(config.store.kind, StoreKind::Memory);
    assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    assert_eq!(config.max_value_length, DEFAULT_MAX_VALUE_LENGTH);
  }

  #[test]
  fn config_from_env_defaults() {
    // edition 2024 では set_var/remove_var が unsafe のため、環境変数が未設定である前提
    let config = Config::from_env().unwrap();
    assert!(!config.bind_addr.is_empty());
    assert!(config.request_timeout.as_secs() >= 1);
  }
}
