//! strlens 文字列解析ライブラリ
//!
//! 文字列の派生プロパティを計算して保存し、構造化パラメータまたは
//! 自然言語クエリで絞り込む。

/// 解析モジュール - 純粋なプロパティ計算
pub mod analysis;

/// 設定モジュール - StoreConfig, StoreKind
pub mod config;

/// エラーモジュール - StrlensError, StrlensResult と領域ごとのエラー型
pub mod errors;

/// フィルタモジュール - RecordFilter と自然言語クエリパーサー
pub mod filter;

/// データモデルモジュール - AnalysisRecord, RecordId
pub mod models;

/// サービスモジュール - StringAnalyzerService ファサード
pub mod service;

/// ストアモジュール - RecordStore トレイトとメモリ / SQLite バックエンド
pub mod store;

/// 再エクスポート
pub use config::{StoreConfig, StoreKind};
pub use errors::{StrlensError, StrlensResult};
pub use models::{AnalysisRecord, RecordId};
pub use service::StringAnalyzerService;
