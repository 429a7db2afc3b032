//! ルーター定義

use std::time::Duration;

use axum::{
  Router,
  http::StatusCode,
  middleware,
  response::{IntoResponse, Response},
  routing::get,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use super::handlers::{
  create_string, delete_string, filter_by_natural_language, get_string, health_check,
  list_strings, method_not_allowed, route_not_found,
};
use super::state::AppState;
use crate::errors::ApiError;

/// APIルーターを作成
///
/// 未知のルート（404）、許可されていないメソッド（405）、タイムアウト（408）も
/// ハンドラーのエラーと同じ `{detail, code}` 形式のJSONで返す。
///
/// # Arguments
/// * `state` - アプリケーション状態
///
/// # Returns
/// 設定済みのRouter
pub fn create_router(state: AppState) -> Router {
  let request_timeout = state.config.request_timeout;

  Router::new()
    .route("/strings", get(list_strings).post(create_string))
    .route("/strings/filter-by-natural-language", get(filter_by_natural_language))
    .route("/strings/{id}", get(get_string).delete(delete_string))
    .route("/health", get(health_check))
    .fallback(route_not_found)
    .method_not_allowed_fallback(method_not_allowed)
    .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
    .layer(middleware::map_response(move |response: Response| async move {
      timeout_as_json(response, request_timeout)
    }))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// TimeoutLayer が返す空ボディの 408 を JSON エラーに置き換える
fn timeout_as_json(response: Response, limit: Duration) -> Response {
  if response.status() != StatusCode::REQUEST_TIMEOUT {
    return response;
  }
  ApiError::timeout(format!("{} ms 以内に処理が完了しませんでした", limit.as_millis()))
    .into_response()
}

/// サーバーを起動
///
/// Ctrl+C を受け取るまで稼働し、処理中のリクエストを待ってから終了する。
///
/// # Errors
/// バインドまたはサーバー実行に失敗した場合にエラーを返す
pub async fn run_server(state: AppState) -> crate::errors::Result<()> {
  let addr = state.config.bind_addr.clone();
  let listener = tokio::net::TcpListener::bind(&addr)
    .await
    .map_err(|e| ApiError::config(format!("{addr} へのバインドに失敗しました: {e}")))?;

  tracing::info!("サーバー起動: http://{}", addr);

  let router = create_router(state);

  axum::serve(listener, router)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| ApiError::internal(format!("サーバーエラー: {e}")))?;

  tracing::info!("サーバー停止");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "シャットダウンシグナルの待機に失敗");
    std::future::pending::<()>().await;
  }
  tracing::info!("シャットダウンシグナルを受信");
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::config::Config;
  use crate::errors::Result as ApiResult;
  use crate::models::{CreateStringRequest, NaturalLanguageResponse, RecordResponse};
  use crate::service::StringsApiService;

  /// ストアに触れないスタブ
  #[derive(Clone)]
  struct DummyService;

  impl StringsApiService for DummyService {
    fn create(&self, _request: CreateStringRequest) -> ApiResult<RecordResponse> {
      Err(ApiError::internal("未使用"))
    }

    fn get(&self, id: &str) -> ApiResult<RecordResponse> {
      Err(ApiError::not_found(id.to_string()))
    }

    fn list(&self, _params: Vec<(String, String)>) -> ApiResult<Vec<RecordResponse>> {
      Ok(Vec::new())
    }

    fn filter_natural_language(&self, query: &str) -> ApiResult<NaturalLanguageResponse> {
      Err(ApiError::unparseable_query(query.to_string()))
    }

    fn delete(&self, id: &str) -> ApiResult<()> {
      Err(ApiError::not_found(id.to_string()))
    }
  }

  #[test]
  fn test_router_creation() {
    let service = Arc::new(DummyService) as Arc<dyn StringsApiService>;
    let _router = create_router(AppState::new(Config::default(), service));
  }

  #[tokio::test]
  async fn timeout_status_becomes_json() {
    let response = timeout_as_json(
      StatusCode::REQUEST_TIMEOUT.into_response(),
      Duration::from_millis(250),
    );
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["code"], "request_timeout");
    assert!(json["detail"].as_str().unwrap().contains("250"));
  }

  #[test]
  fn other_statuses_pass_through() {
    let response = timeout_as_json(StatusCode::OK.into_response(), Duration::from_secs(1));
    assert_eq!(response.status(), StatusCode::OK);
  }
}
