//! フィルタエンジン - 構造化パラメータと自然言語クエリ

pub mod natural_language;
pub mod record_filter;

pub use natural_language::parse_natural_language;
pub use record_filter::{FilterClause, RecordFilter};
