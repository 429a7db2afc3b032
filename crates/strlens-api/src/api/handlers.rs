//! HTTPハンドラー定義

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::{Method, StatusCode, Uri},
};
use tracing::{debug, error, info};

use crate::errors::{ApiError, Result};
use crate::models::{
  CreateStringRequest, NaturalLanguageParams, NaturalLanguageResponse, RecordResponse,
};

use super::state::AppState;

/// ストアを使う処理を blocking プールで実行する
///
/// SQLite バックエンドは同期IOを行うため、非同期ランタイムから切り離す。
async fn run_blocking<T, F>(task: F) -> Result<T>
where
  F: FnOnce() -> Result<T> + Send + 'static,
  T: Send + 'static,
{
  tokio::task::spawn_blocking(task).await.map_err(|e| {
    error!(error = %e, "spawn_blocking エラー");
    ApiError::internal("処理の実行に失敗しました")
  })?
}

/// POST /strings エンドポイント
///
/// 文字列を解析して結果を保存する。
///
/// # Request Body
/// ```json
/// { "value": "解析対象のテキスト" }
/// ```
///
/// # Response
/// - 201 Created: 保存したレコード
/// - 400 Bad Request: `value` が空・文字列以外・長すぎる・欠落
pub async fn create_string(
  State(state): State<AppState>,
  payload: std::result::Result<Json<CreateStringRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordResponse>)> {
  let Json(request) = payload?;
  debug!(value_len = request.value.len(), "解析リクエストを受信");

  let service = state.service.clone();
  let record = run_blocking(move || service.create(request)).await?;

  info!(id = %record.id, length = record.length, "文字列レコードを作成");
  Ok((StatusCode::CREATED, Json(record)))
}

/// GET /strings/{id} エンドポイント
///
/// # Response
/// - 200 OK: レコード
/// - 400 Bad Request: パスパラメータを読めない（不正な UTF-8 など）
/// - 404 Not Found: 未知の id
pub async fn get_string(
  State(state): State<AppState>,
  id: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<RecordResponse>> {
  let Path(id) = id?;
  let service = state.service.clone();
  let record = run_blocking(move || service.get(&id)).await?;
  Ok(Json(record))
}

/// GET /strings エンドポイント
///
/// クエリパラメータ: `min_length`, `max_length`, `is_palindrome`, `contains`,
/// `word_count`, `contains_character`, `q`（自然言語）
///
/// # Response
/// - 200 OK: マッチしたレコードの配列（空の場合あり）
/// - 400 Bad Request: 未知・重複・不正なパラメータ、解析できない `q`
pub async fn list_strings(
  State(state): State<AppState>,
  params: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<RecordResponse>>> {
  let Query(params) = params?;
  debug!(param_count = params.len(), "一覧リクエストを受信");

  let service = state.service.clone();
  let records = run_blocking(move || service.list(params)).await?;

  debug!(matched = records.len(), "一覧リクエスト完了");
  Ok(Json(records))
}

/// GET /strings/filter-by-natural-language?query=... エンドポイント
///
/// # Response
/// - 200 OK: `{ data, count, interpreted_query }`
/// - 400 Bad Request: `query` が欠落、または解析できない
pub async fn filter_by_natural_language(
  State(state): State<AppState>,
  params: std::result::Result<Query<NaturalLanguageParams>, QueryRejection>,
) -> Result<Json<NaturalLanguageResponse>> {
  let Query(params) = params?;
  let query = params
    .query
    .ok_or_else(|| ApiError::invalid_input("必須のクエリパラメータ query がありません"))?;

  let service = state.service.clone();
  let response = run_blocking(move || service.filter_natural_language(&query)).await?;

  info!(
    query = %response.interpreted_query.original,
    matched = response.count,
    "自然言語フィルタ完了"
  );
  Ok(Json(response))
}

/// DELETE /strings/{id} エンドポイント
///
/// # Response
/// - 204 No Content: 削除成功
/// - 400 Bad Request: パスパラメータを読めない
/// - 404 Not Found: 未知の id
pub async fn delete_string(
  State(state): State<AppState>,
  id: std::result::Result<Path<String>, PathRejection>,
) -> Result<StatusCode> {
  let Path(id) = id?;
  let service = state.service.clone();
  let deleted_id = id.clone();
  run_blocking(move || service.delete(&id)).await?;

  info!(id = %deleted_id, "文字列レコードを削除");
  Ok(StatusCode::NO_CONTENT)
}

/// ヘルスチェックエンドポイント
///
/// サーバーが稼働しているかを確認する。
pub async fn health_check() -> &'static str {
  "OK"
}

/// どのルートにも一致しないリクエスト
pub async fn route_not_found(method: Method, uri: Uri) -> ApiError {
  ApiError::not_found(format!("ルートが見つかりません: {method} {}", uri.path()))
}

/// ルートは一致したがメソッドが登録されていないリクエスト
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
  ApiError::method_not_allowed(format!("許可されていないメソッドです: {method} {}", uri.path()))
}
