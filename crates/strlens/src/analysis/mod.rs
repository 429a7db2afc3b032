//! 解析モジュール

pub mod properties;

pub use properties::{CharacterFrequencyMap, StringProperties};
