//! strlens-api クレート
//!
//! strlens 文字列解析ライブラリを HTTP API として提供するWebサーバー。
//!
//! ## エンドポイント
//! - `POST /strings` - 文字列を解析して保存
//! - `GET /strings` - レコード一覧（構造化 / 自然言語フィルタ）
//! - `GET /strings/filter-by-natural-language` - 解釈結果付きの自然言語フィルタ
//! - `GET /strings/{id}` - レコードを1件取得
//! - `DELETE /strings/{id}` - レコードを1件削除
//! - `GET /health` - ヘルスチェック
//!
//! エラーはすべて `{"detail": "...", "code": "..."}` 形式のJSONで返す。
//!
//! ## 使用例
//! ```bash
//! curl -X POST http://127.0.0.1:5540/strings \
//!   -H "Content-Type: application/json" \
//!   -d '{"value": "A man a plan a canal Panama"}'
//!
//! curl 'http://127.0.0.1:5540/strings?is_palindrome=true&min_length=5'
//! curl 'http://127.0.0.1:5540/strings/filter-by-natural-language?query=single%20word%20palindromic%20strings'
//! ```

pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod service;

pub use api::AppState;
pub use config::Config;
pub use errors::{ApiError, ApiErrorKind};
pub use models::{CreateStringRequest, NaturalLanguageResponse, RecordResponse};
pub use service::StringsApiServiceFull;
