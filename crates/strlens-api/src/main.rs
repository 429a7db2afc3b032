//! strlens-api サーバーのエントリーポイント

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use strlens_api::ApiError;
use strlens_api::api::AppState;
use strlens_api::api::run_server;
use strlens_api::config::{Config, DEFAULT_LOG_FILTER};
use strlens_api::service::StringsApiServiceFull;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
  // ロギング初期化（RUST_LOG がデフォルトのフィルタより優先）
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
  tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).init();

  let config = Config::from_env()?;
  tracing::info!(
    bind_addr = %config.bind_addr,
    store = %config.store.kind,
    max_value_length = config.max_value_length,
    "設定を読み込みました"
  );

  let service = Arc::new(StringsApiServiceFull::new(&config)?);
  tracing::info!("文字列解析サービスを初期化しました");

  let state = AppState::new(config, service);

  run_server(state).await
}
