//! API設定の定数

/// 送信される値の最大サイズ既定値（バイト）
///
/// 1 MiB。これを超える値は解析前に拒否する。
pub const DEFAULT_MAX_VALUE_LENGTH: usize = 1_048_576;

/// デフォルトのバインドアドレス
///
/// 開発用の localhost ポート。
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5540";

/// デフォルトのレコードストア
pub const DEFAULT_STORE_KIND: &str = "memory";

/// リクエストごとのタイムアウト既定値（秒）
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// `RUST_LOG` 未設定時に使うログフィルタ
pub const DEFAULT_LOG_FILTER: &str = "info,strlens=debug,strlens_api=debug,tower_http=debug";
