//! データモデル

pub mod model_definition;

pub use model_definition::{AnalysisRecord, RecordId, validate_value};
