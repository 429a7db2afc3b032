//! 設定モジュール

mod constants;
mod env;

pub use constants::{
  DEFAULT_BIND_ADDR, DEFAULT_LOG_FILTER, DEFAULT_MAX_VALUE_LENGTH, DEFAULT_REQUEST_TIMEOUT_SECS,
  DEFAULT_STORE_KIND,
};
pub use env::Config;
