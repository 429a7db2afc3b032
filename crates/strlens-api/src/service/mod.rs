//! サービスモジュール

mod strings_api_service;

pub use strings_api_service::{StringsApiService, StringsApiServiceFull};
