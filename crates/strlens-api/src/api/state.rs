//! API状態定義

use std::sync::Arc;

use crate::config::Config;
use crate::service::StringsApiService;

/// アプリケーション状態
///
/// サーバーの稼働中、すべてのハンドラーで共有する。
/// 設定とサービスを保持し、サービスがレコードストアを所有する。
#[derive(Clone)]
pub struct AppState {
  /// 設定
  pub config: Config,
  /// 文字列解析サービス
  ///
  /// - 本番: `Arc::new(StringsApiServiceFull::new(&config)?)`
  /// - テスト: 新しいメモリストア上のサービス、またはスタブ
  pub service: Arc<dyn StringsApiService>,
}

impl AppState {
  /// 新しいAppStateを作成
  #[must_use]
  pub fn new(config: Config, service: Arc<dyn StringsApiService>) -> Self {
    Self { config, service }
  }
}
