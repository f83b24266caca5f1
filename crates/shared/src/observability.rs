//! # ロギング初期化
//!
//! サービスのトレーシング購読者を組み立てる。設定は環境変数から読む。
//!
//! | 変数名 | 説明 |
//! |--------|------|
//! | `RUST_LOG` | フィルタ（未設定時は [`DEFAULT_FILTER`]） |
//! | `LOG_FORMAT` | `json` / `pretty`（未設定・不明な値は `pretty`） |
//! | `LOG_SPAN_TRACE` | `false` / `0` でエラーの `SpanTrace` 収集を無効化 |

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_FILTER: &str = "info,mailtrail=debug,tower_http=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 1 イベント 1 行の JSON
    Json,
    #[default]
    Pretty,
}

/// トレーシング初期化設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub service_name:       String,
    pub log_format:         LogFormat,
    /// `EnvFilter` のディレクティブ
    pub filter:             String,
    /// `tracing_error::ErrorLayer` を登録し、インフラ層のエラーに `SpanTrace` を持たせる
    pub span_traces:        bool,
    /// 解釈できなかった `LOG_FORMAT` の値（初期化後に警告として出力する）
    pub unknown_log_format: Option<String>,
}

impl TracingConfig {
    /// 環境変数から設定を読み取る
    pub fn from_env(service_name: impl Into<String>) -> Self {
        Self::from_lookup(service_name, |name| std::env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み取る
    pub fn from_lookup(
        service_name: impl Into<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let (log_format, unknown_log_format) = match lookup("LOG_FORMAT").as_deref() {
            None | Some("pretty") => (LogFormat::Pretty, None),
            Some("json") => (LogFormat::Json, None),
            Some(other) => (LogFormat::Pretty, Some(other.to_string())),
        };

        Self {
            service_name: service_name.into(),
            log_format,
            filter: lookup("RUST_LOG")
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FILTER.to_string()),
            span_traces: !matches!(lookup("LOG_SPAN_TRACE").as_deref(), Some("false" | "0")),
            unknown_log_format,
        }
    }
}

/// トレーシングを初期化する
///
/// 不正なフィルタは [`DEFAULT_FILTER`] に置き換える。
#[cfg(feature = "observability")]
pub fn init_tracing(config: TracingConfig) {
    use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };
    let error_layer = config.span_traces.then(tracing_error::ErrorLayer::default);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(error_layer)
        .init();

    if let Some(value) = &config.unknown_log_format {
        tracing::warn!(log_format = %value, "不明な LOG_FORMAT のため pretty で出力します");
    }
    tracing::debug!(
        service = %config.service_name,
        filter = %config.filter,
        span_traces = config.span_traces,
        "トレーシングを初期化しました"
    );
}
