//! モデルモジュール

mod request;
mod response;

pub use request::{CreateStringRequest, NaturalLanguageParams};
pub use response::{InterpretedQuery, NaturalLanguageResponse, RecordResponse};
